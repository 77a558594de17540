//! Synthetic monthly unemployment series.
//!
//! The generated rate for month index `i` (of `n`) is:
//!
//! ```text
//! rate_i = max(0, trend_i + A·sin(2π·i/12) + shock_i + ε_i)
//! trend_i = trend_start + (trend_end - trend_start) · i / (n - 1)
//! ε_i ~ Normal(0, noise_std)
//! ```
//!
//! `shock_i` is the configured crisis bump starting at `shock_offset`.
//! Noise comes from a `StdRng` seeded with `SampleConfig::seed`, so the same
//! configuration always yields the same series.

use std::f64::consts::PI;

use chrono::{Months, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::{RawSeries, Record, Region, SampleConfig, month_start, months_between};
use crate::error::AnalysisError;

/// Build one record per month in `[config.start, config.end]`.
pub fn generate_sample_series(config: &SampleConfig) -> Result<RawSeries, AnalysisError> {
    let start = month_start(config.start);
    let end = month_start(config.end);
    let span = months_between(start, end);
    if span < 0 {
        return Err(AnalysisError::InvalidConfig(format!(
            "sample end {end} is before start {start}"
        )));
    }
    if !(config.noise_std.is_finite() && config.noise_std >= 0.0) {
        return Err(AnalysisError::InvalidConfig(
            "sample noise std must be finite and >= 0".to_string(),
        ));
    }

    let n = span as usize + 1;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise_std)
        .map_err(|e| AnalysisError::InvalidConfig(format!("noise distribution error: {e}")))?;

    let mut records = Vec::with_capacity(n);
    for i in 0..n {
        let date = add_months(start, i)?;
        let rate = trend_at(config, i, n)
            + seasonal_at(config.seasonal_amplitude, i)
            + shock_at(config, i)
            + normal.sample(&mut rng);

        records.push(Record {
            date: Some(date),
            rate: Some(rate.max(0.0)),
            region: Some(Region::ALL[i % Region::ALL.len()]),
        });
    }

    Ok(RawSeries {
        records,
        has_region: true,
    })
}

/// Linear interpolation between the trend endpoints.
fn trend_at(config: &SampleConfig, i: usize, n: usize) -> f64 {
    if n < 2 {
        return config.trend_start;
    }
    let u = i as f64 / (n as f64 - 1.0);
    config.trend_start + u * (config.trend_end - config.trend_start)
}

fn seasonal_at(amplitude: f64, i: usize) -> f64 {
    amplitude * (2.0 * PI * i as f64 / 12.0).sin()
}

fn shock_at(config: &SampleConfig, i: usize) -> f64 {
    i.checked_sub(config.shock_offset)
        .and_then(|k| config.shock.get(k))
        .copied()
        .unwrap_or(0.0)
}

fn add_months(start: NaiveDate, months: usize) -> Result<NaiveDate, AnalysisError> {
    u32::try_from(months)
        .ok()
        .and_then(|m| start.checked_add_months(Months::new(m)))
        .ok_or_else(|| AnalysisError::InvalidConfig("sample date range overflows the calendar".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sample_covers_fifteen_years() {
        let raw = generate_sample_series(&SampleConfig::default()).unwrap();
        assert_eq!(raw.records.len(), 180);
        assert_eq!(raw.records[0].date, NaiveDate::from_ymd_opt(2010, 1, 1));
        assert_eq!(raw.records[179].date, NaiveDate::from_ymd_opt(2024, 12, 1));
        assert_eq!(raw.records[0].region, Some(Region::Northeast));
        assert_eq!(raw.records[5].region, Some(Region::Midwest));
        assert!(raw.records.iter().all(|r| r.rate.unwrap() >= 0.0));
    }

    #[test]
    fn same_seed_same_series() {
        let config = SampleConfig::default();
        let a = generate_sample_series(&config).unwrap();
        let b = generate_sample_series(&config).unwrap();
        assert_eq!(a, b);

        let other = SampleConfig {
            seed: 7,
            ..SampleConfig::default()
        };
        let c = generate_sample_series(&other).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn noiseless_components_match_formula() {
        let config = SampleConfig {
            noise_std: 0.0,
            ..SampleConfig::default()
        };
        let raw = generate_sample_series(&config).unwrap();

        // First month: trend start, sin(0) = 0.
        assert!((raw.records[0].rate.unwrap() - 8.5).abs() < 1e-12);
        // Last month: trend end + 0.5·sin(2π·179/12).
        let expected_last = 3.8 + 0.5 * (2.0 * PI * 179.0 / 12.0).sin();
        assert!((raw.records[179].rate.unwrap() - expected_last).abs() < 1e-9);

        // Shock peak (offset 122 + 1) lands in April 2020.
        let peak = &raw.records[123];
        assert_eq!(peak.date, NaiveDate::from_ymd_opt(2020, 4, 1));
        let trend = 8.5 + (123.0 / 179.0) * (3.8 - 8.5);
        let expected = trend + 0.5 * (2.0 * PI * 123.0 / 12.0).sin() + 12.0;
        assert!((peak.rate.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn shock_outside_range_is_zero() {
        let config = SampleConfig::default();
        assert_eq!(shock_at(&config, 121), 0.0);
        assert_eq!(shock_at(&config, 122), 8.0);
        assert_eq!(shock_at(&config, 127), 2.0);
        assert_eq!(shock_at(&config, 128), 0.0);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let config = SampleConfig {
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            ..SampleConfig::default()
        };
        assert!(matches!(
            generate_sample_series(&config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }
}
