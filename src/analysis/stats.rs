//! Descriptive statistics for the whole series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Region, Series};
use crate::error::AnalysisError;
use crate::math;

/// Global summary. `std` is the sample standard deviation (0 for one point);
/// quantiles use linear interpolation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p75: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub fn summarize(series: &Series) -> Result<SummaryStats, AnalysisError> {
    let (first, last) = match series.observations() {
        [] => return Err(AnalysisError::EmptySeries { context: "summary statistics" }),
        [only] => (only, only),
        [first, .., last] => (first, last),
    };

    let mut rates = series.rates();
    rates.sort_by(f64::total_cmp);

    Ok(SummaryStats {
        count: rates.len(),
        mean: rates.iter().sum::<f64>() / rates.len() as f64,
        median: math::quantile_sorted(&rates, 0.5),
        std: math::sample_std(&rates).unwrap_or(0.0),
        min: rates[0],
        max: rates[rates.len() - 1],
        p25: math::quantile_sorted(&rates, 0.25),
        p75: math::quantile_sorted(&rates, 0.75),
        start: first.date,
        end: last.date,
    })
}

/// Mean rate per calendar year.
pub fn yearly_averages(series: &Series) -> BTreeMap<i32, f64> {
    let mut groups: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for o in series.observations() {
        groups.entry(o.year).or_default().push(o.rate);
    }
    groups
        .into_iter()
        .filter_map(|(year, v)| math::mean(&v).map(|m| (year, m)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStats {
    pub region: Region,
    pub count: usize,
    pub mean: f64,
    /// `None` with fewer than two observations.
    pub std: Option<f64>,
}

/// Per-region mean and spread, ordered by region.
pub fn regional_summary(series: &Series) -> Vec<RegionStats> {
    let mut groups: BTreeMap<Region, Vec<f64>> = BTreeMap::new();
    for o in series.observations() {
        if let Some(region) = o.region {
            groups.entry(region).or_default().push(o.rate);
        }
    }
    groups
        .into_iter()
        .filter_map(|(region, v)| {
            Some(RegionStats {
                region,
                count: v.len(),
                mean: math::mean(&v)?,
                std: math::sample_std(&v),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::clean::clean;
    use crate::domain::{RawSeries, Record};

    fn series(values: &[(i32, u32, f64, Region)]) -> Series {
        let records = values
            .iter()
            .map(|&(y, m, r, g)| Record {
                date: NaiveDate::from_ymd_opt(y, m, 1),
                rate: Some(r),
                region: Some(g),
            })
            .collect();
        clean(&RawSeries {
            records,
            has_region: true,
        })
        .series
    }

    #[test]
    fn summary_of_small_series() {
        let s = series(&[
            (2020, 1, 4.0, Region::South),
            (2020, 2, 1.0, Region::West),
            (2020, 3, 3.0, Region::South),
            (2020, 4, 2.0, Region::West),
        ]);
        let stats = summarize(&s).unwrap();
        assert_eq!(stats.count, 4);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        assert!((stats.median - 2.5).abs() < 1e-12);
        assert!((stats.p25 - 1.75).abs() < 1e-12);
        assert!((stats.p75 - 3.25).abs() < 1e-12);
        assert!((stats.std - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(stats.end, NaiveDate::from_ymd_opt(2020, 4, 1).unwrap());
    }

    #[test]
    fn single_point_has_zero_std() {
        let s = series(&[(2020, 1, 4.0, Region::South)]);
        let stats = summarize(&s).unwrap();
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.start, stats.end);
    }

    #[test]
    fn empty_series_is_an_error() {
        let err = summarize(&Series::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptySeries { .. }));
    }

    #[test]
    fn yearly_and_regional_groupings() {
        let s = series(&[
            (2019, 12, 2.0, Region::South),
            (2020, 1, 4.0, Region::South),
            (2020, 2, 6.0, Region::West),
        ]);
        let yearly = yearly_averages(&s);
        assert_eq!(yearly.get(&2019), Some(&2.0));
        assert_eq!(yearly.get(&2020), Some(&5.0));

        let regions = regional_summary(&s);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].region, Region::South);
        assert!((regions[0].mean - 3.0).abs() < 1e-12);
        assert!(regions[0].std.is_some());
        assert_eq!(regions[1].std, None);
    }
}
