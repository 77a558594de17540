//! Seasonal pattern analysis.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::domain::{Series, months_between};
use crate::error::AnalysisError;
use crate::math::{self, Decomposition, DecompositionModel, decompose};

/// Aggregates for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthStats {
    pub count: usize,
    pub mean: f64,
    /// `None` with fewer than two observations.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Calendar month (1..=12) → aggregates. Months without data are absent.
pub type MonthlyProfile = BTreeMap<u32, MonthStats>;

pub fn monthly_profile(series: &Series) -> MonthlyProfile {
    let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for o in series.observations() {
        groups.entry(o.month).or_default().push(o.rate);
    }
    groups
        .into_iter()
        .filter_map(|(month, v)| {
            Some((
                month,
                MonthStats {
                    count: v.len(),
                    mean: math::mean(&v)?,
                    std: math::sample_std(&v),
                    min: math::min(&v)?,
                    max: math::max(&v)?,
                },
            ))
        })
        .collect()
}

/// Month with the highest mean; ties go to the earliest month.
pub fn peak_month(profile: &MonthlyProfile) -> Option<u32> {
    // BTreeMap iterates in month order, and only a strictly greater mean replaces.
    profile
        .iter()
        .fold(None, |best: Option<(u32, f64)>, (&m, s)| match best {
            Some((_, b)) if s.mean <= b => best,
            _ => Some((m, s.mean)),
        })
        .map(|(m, _)| m)
}

/// Month with the lowest mean; ties go to the earliest month.
pub fn trough_month(profile: &MonthlyProfile) -> Option<u32> {
    profile
        .iter()
        .fold(None, |best: Option<(u32, f64)>, (&m, s)| match best {
            Some((_, b)) if s.mean >= b => best,
            _ => Some((m, s.mean)),
        })
        .map(|(m, _)| m)
}

/// `std(seasonal) / std(observed)`, or 0 when the observed series is flat.
pub fn seasonal_strength(result: &Decomposition) -> f64 {
    let observed = math::sample_std(&result.observed).unwrap_or(0.0);
    if observed <= f64::EPSILON {
        return 0.0;
    }
    let seasonal = math::sample_std(&result.seasonal).unwrap_or(0.0);
    seasonal / observed
}

/// Year → 12 monthly cells (index 0 = January) for the heatmap.
pub fn year_month_grid(series: &Series) -> BTreeMap<i32, [Option<f64>; 12]> {
    let mut grid: BTreeMap<i32, [Option<f64>; 12]> = BTreeMap::new();
    for o in series.observations() {
        let row = grid.entry(o.year).or_insert([None; 12]);
        row[(o.month - 1) as usize] = Some(o.rate);
    }
    grid
}

/// Everything the seasonal stage reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalAnalysis {
    pub decomposition: Decomposition,
    pub strength: f64,
    pub monthly: MonthlyProfile,
    pub peak_month: Option<u32>,
    pub trough_month: Option<u32>,
}

pub fn analyze_seasonal(series: &Series, period: usize) -> Result<SeasonalAnalysis, AnalysisError> {
    let gaps = series
        .observations()
        .windows(2)
        .filter(|w| months_between(w[0].date, w[1].date) != 1)
        .count();
    if gaps > 0 {
        // Decomposition works on positions, so gaps shift the seasonal phase.
        warn!(gaps, "series has gaps; seasonal positions may not match calendar months");
    }

    let decomposition = decompose(&series.rates(), period, DecompositionModel::Additive)?;
    let strength = seasonal_strength(&decomposition);
    let monthly = monthly_profile(series);

    Ok(SeasonalAnalysis {
        strength,
        peak_month: peak_month(&monthly),
        trough_month: trough_month(&monthly),
        monthly,
        decomposition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::clean::clean;
    use crate::domain::{RawSeries, Record};
    use chrono::{Months, NaiveDate};

    fn monthly(start_year: i32, rates: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(start_year, 1, 1).unwrap();
        let records = rates
            .iter()
            .enumerate()
            .map(|(i, &r)| Record {
                date: start.checked_add_months(Months::new(i as u32)),
                rate: Some(r),
                region: None,
            })
            .collect();
        clean(&RawSeries {
            records,
            has_region: false,
        })
        .series
    }

    #[test]
    fn profile_of_one_year_has_twelve_entries() {
        let rates: Vec<f64> = (1..=12).map(|m| m as f64 * 0.5).collect();
        let profile = monthly_profile(&monthly(2023, &rates));
        assert_eq!(profile.len(), 12);
        for (m, stats) in &profile {
            assert_eq!(stats.count, 1);
            assert!((stats.mean - *m as f64 * 0.5).abs() < 1e-12);
            assert_eq!(stats.std, None);
            assert_eq!(stats.min, stats.max);
        }
        assert_eq!(peak_month(&profile), Some(12));
        assert_eq!(trough_month(&profile), Some(1));
    }

    #[test]
    fn ties_break_to_lowest_month() {
        let mut rates = vec![5.0; 12];
        rates[2] = 9.0;
        rates[7] = 9.0;
        rates[4] = 1.0;
        rates[10] = 1.0;
        let profile = monthly_profile(&monthly(2023, &rates));
        assert_eq!(peak_month(&profile), Some(3));
        assert_eq!(trough_month(&profile), Some(5));

        let flat = monthly_profile(&monthly(2023, &[2.0; 12]));
        assert_eq!(peak_month(&flat), Some(1));
        assert_eq!(trough_month(&flat), Some(1));
    }

    #[test]
    fn constant_series_has_zero_strength() {
        let s = monthly(2020, &[4.0; 36]);
        let analysis = analyze_seasonal(&s, 12).unwrap();
        assert_eq!(analysis.strength, 0.0);
    }

    #[test]
    fn pure_seasonal_series_is_strongly_seasonal() {
        let rates: Vec<f64> = (0..48)
            .map(|i| 5.0 + (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
            .collect();
        let analysis = analyze_seasonal(&monthly(2018, &rates), 12).unwrap();
        assert!(analysis.strength > 0.95, "strength {}", analysis.strength);
        assert!(analysis.strength <= 1.0 + 1e-9);
        // sin peaks at i = 3 (April) and bottoms at i = 9 (October).
        assert_eq!(analysis.peak_month, Some(4));
        assert_eq!(analysis.trough_month, Some(10));
    }

    #[test]
    fn too_short_for_decomposition() {
        let s = monthly(2023, &[4.0; 12]);
        assert!(matches!(
            analyze_seasonal(&s, 12),
            Err(AnalysisError::InsufficientData { needed: 24, actual: 12 })
        ));
    }

    #[test]
    fn grid_places_cells_by_month() {
        let s = monthly(2022, &[1.0, 2.0, 3.0]);
        let grid = year_month_grid(&s);
        let row = grid.get(&2022).unwrap();
        assert_eq!(row[0], Some(1.0));
        assert_eq!(row[2], Some(3.0));
        assert_eq!(row[3], None);
    }
}
