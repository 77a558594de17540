//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed down the pipeline as immutable values
//! - exported to CSV/JSON next to the charts

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Reporting region attached to each observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Region {
    Northeast,
    Midwest,
    South,
    West,
}

impl Region {
    /// Round-robin order used by the sample generator.
    pub const ALL: [Region; 4] = [Region::Northeast, Region::Midwest, Region::South, Region::West];

    pub fn display_name(self) -> &'static str {
        match self {
            Region::Northeast => "Northeast",
            Region::Midwest => "Midwest",
            Region::South => "South",
            Region::West => "West",
        }
    }

    /// Case-insensitive label lookup.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.display_name().eq_ignore_ascii_case(label))
    }
}

/// A pre-cleaning row. Any field may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: Option<NaiveDate>,
    pub rate: Option<f64>,
    pub region: Option<Region>,
}

/// Rows as produced by a data provider, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub records: Vec<Record>,
    /// Whether the source carries a region column. When false, an absent
    /// region is not treated as a missing value.
    pub has_region: bool,
}

/// One cleaned monthly observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Always the first day of the month.
    pub date: NaiveDate,
    pub rate: f64,
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
    pub region: Option<Region>,
}

impl Observation {
    pub fn new(date: NaiveDate, rate: f64, region: Option<Region>) -> Self {
        let date = month_start(date);
        let month = date.month();
        Self {
            date,
            rate,
            year: date.year(),
            month,
            quarter: quarter_of(month),
            region,
        }
    }

    pub fn to_record(&self) -> Record {
        Record {
            date: Some(self.date),
            rate: Some(self.rate),
            region: self.region,
        }
    }
}

/// Cleaned series: ascending by date, one observation per date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    /// Wrap observations that are already sorted with unique dates.
    ///
    /// Only the cleaner and tests should construct a `Series` directly.
    pub(crate) fn from_sorted(observations: Vec<Observation>) -> Self {
        debug_assert!(observations.windows(2).all(|w| w[0].date < w[1].date));
        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn rates(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.rate).collect()
    }

    pub fn has_region(&self) -> bool {
        self.observations.iter().any(|o| o.region.is_some())
    }

    /// Convert back into provider rows so cleaning can be re-applied.
    pub fn to_raw(&self) -> RawSeries {
        RawSeries {
            records: self.observations.iter().map(Observation::to_record).collect(),
            has_region: self.has_region(),
        }
    }
}

/// Per-observation features derived by the cleaner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DerivedFeatures {
    /// Rate minus the rate in the same calendar month one year earlier.
    pub yoy_change: Option<f64>,
    /// Rate minus the rate in the immediately preceding calendar month.
    pub monthly_change: Option<f64>,
    pub rolling_3mo: Option<f64>,
    pub rolling_12mo: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedObservation {
    pub observation: Observation,
    pub features: DerivedFeatures,
}

/// Where the analysed data came from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Csv(PathBuf),
    /// Synthetic series; `fallback_from` is set when a CSV path was missing.
    Synthetic { fallback_from: Option<PathBuf> },
}

/// Calendar cutoffs for the crisis comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrisisWindows {
    /// Start of the baseline used for the pre-crisis average.
    pub baseline_start: NaiveDate,
    /// First month of the crisis window (inclusive).
    pub crisis_start: NaiveDate,
    /// Last month of the crisis window (inclusive).
    pub crisis_end: NaiveDate,
    /// Pre-crisis stability is measured on dates strictly before this.
    pub stability_end: NaiveDate,
    pub timeline_start: NaiveDate,
    pub timeline_end: NaiveDate,
}

impl Default for CrisisWindows {
    fn default() -> Self {
        Self {
            baseline_start: ymd(2019, 1),
            crisis_start: ymd(2020, 3),
            crisis_end: ymd(2021, 12),
            stability_end: ymd(2020, 1),
            timeline_start: ymd(2019, 1),
            timeline_end: ymd(2022, 12),
        }
    }
}

/// Parameters of the synthetic series generator.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub seed: u64,
    /// Trend level at the first month.
    pub trend_start: f64,
    /// Trend level at the last month.
    pub trend_end: f64,
    pub seasonal_amplitude: f64,
    /// Month index (from `start`) where the shock begins.
    pub shock_offset: usize,
    pub shock: Vec<f64>,
    pub noise_std: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            start: ymd(2010, 1),
            end: ymd(2024, 12),
            seed: 42,
            trend_start: 8.5,
            trend_end: 3.8,
            seasonal_amplitude: 0.5,
            shock_offset: 122,
            shock: vec![8.0, 12.0, 10.0, 6.0, 4.0, 2.0],
            noise_std: 0.2,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from environment variables (plus defaults).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub sample: SampleConfig,
    pub crisis: CrisisWindows,
    pub seasonal_period: usize,
    /// Soft bounds for the range warning.
    pub rate_bounds: (f64, f64),
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/unemployment_data.csv"),
            output_dir: PathBuf::from("output"),
            sample: SampleConfig::default(),
            crisis: CrisisWindows::default(),
            seasonal_period: 12,
            rate_bounds: (0.0, 50.0),
        }
    }
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn quarter_of(month: u32) -> u32 {
    (month.saturating_sub(1)) / 3 + 1
}

/// Full English month name for 1..=12.
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("?")
}

/// Fractional year used as the x coordinate of time charts (`2020-04` → `2020.25`).
pub fn decimal_year(date: NaiveDate) -> f64 {
    date.year() as f64 + (date.month0() as f64) / 12.0
}

/// Months between two first-of-month dates (`to - from`).
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
}

// Static calendar constants; day 1 of a valid month always exists.
fn ymd(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}
