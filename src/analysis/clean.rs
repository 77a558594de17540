//! Cleaning and feature derivation.
//!
//! `clean` turns provider rows into a `Series`:
//! 1. drop rows with any missing field; dates snap to the first of the month
//! 2. drop exact duplicates (first occurrence kept)
//! 3. range-check rates (warn only)
//! 4. stable sort by date
//! 5. keep the first row of any date that still appears twice
//!
//! Applying `clean` to its own output changes nothing.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{
    DerivedFeatures, EnrichedObservation, Observation, RawSeries, Record, Region, Series, month_start,
    months_between,
};
use crate::math::{max, min, rolling_mean};

/// Rates outside the configured soft bounds. Reported, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeWarning {
    pub min_rate: f64,
    pub max_rate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Cleaned series plus what was removed along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutput {
    pub series: Series,
    pub dropped_missing: usize,
    pub dropped_duplicates: usize,
    /// Rows whose date was already taken by a different row.
    pub dropped_conflicts: usize,
    pub range_warning: Option<RangeWarning>,
}

/// Clean with the default soft bounds `[0, 50]`.
pub fn clean(raw: &RawSeries) -> CleanOutput {
    clean_with_bounds(raw, (0.0, 50.0))
}

pub fn clean_with_bounds(raw: &RawSeries, bounds: (f64, f64)) -> CleanOutput {
    let total = raw.records.len();

    // 1) Missing fields.
    let complete: Vec<(NaiveDate, f64, Option<Region>)> = raw
        .records
        .iter()
        .filter_map(|r| complete_fields(r, raw.has_region))
        .collect();
    let dropped_missing = total - complete.len();
    if dropped_missing > 0 {
        info!(dropped_missing, "dropped rows with missing values");
    }

    // 2) Exact duplicates. Rates compare by bit pattern with -0.0 folded into 0.0.
    let mut seen = HashSet::new();
    let unique: Vec<_> = complete
        .into_iter()
        .filter(|(d, r, g)| seen.insert((*d, rate_key(*r), *g)))
        .collect();
    let dropped_duplicates = total - dropped_missing - unique.len();
    if dropped_duplicates > 0 {
        info!(dropped_duplicates, "dropped duplicate rows");
    }

    // 3) Soft range check.
    let rates: Vec<f64> = unique.iter().map(|(_, r, _)| *r).collect();
    let range_warning = match (min(&rates), max(&rates)) {
        (Some(lo), Some(hi)) if lo < bounds.0 || hi > bounds.1 => {
            warn!(
                min = lo,
                max = hi,
                "unemployment rates outside expected range ({}-{}%)",
                bounds.0,
                bounds.1
            );
            Some(RangeWarning {
                min_rate: lo,
                max_rate: hi,
                lower_bound: bounds.0,
                upper_bound: bounds.1,
            })
        }
        _ => None,
    };

    // 4) Stable sort keeps first-seen order within a date.
    let mut sorted = unique;
    sorted.sort_by_key(|(d, _, _)| *d);

    // 5) One observation per date.
    let before = sorted.len();
    sorted.dedup_by_key(|(d, _, _)| *d);
    let dropped_conflicts = before - sorted.len();
    if dropped_conflicts > 0 {
        warn!(dropped_conflicts, "rows with a repeated date but different values; kept the first");
    }

    let observations = sorted
        .into_iter()
        .map(|(date, rate, region)| Observation::new(date, rate, region))
        .collect();
    let series = Series::from_sorted(observations);
    debug!(rows = series.len(), "cleaning completed");

    CleanOutput {
        series,
        dropped_missing,
        dropped_duplicates,
        dropped_conflicts,
        range_warning,
    }
}

fn rate_key(rate: f64) -> u64 {
    if rate == 0.0 { 0.0f64.to_bits() } else { rate.to_bits() }
}

fn complete_fields(record: &Record, has_region: bool) -> Option<(NaiveDate, f64, Option<Region>)> {
    let date = month_start(record.date?);
    let rate = record.rate.filter(|r| r.is_finite())?;
    if has_region && record.region.is_none() {
        return None;
    }
    Some((date, rate, record.region))
}

/// Attach year-over-year, month-over-month and rolling-mean features.
///
/// Rolling windows are trailing windows over rows; the deltas look up the exact
/// calendar month one year / one month earlier and are `None` across gaps.
pub fn add_derived_features(series: &Series) -> Vec<EnrichedObservation> {
    let obs = series.observations();
    let rates = series.rates();
    let rolling_3 = rolling_mean(&rates, 3);
    let rolling_12 = rolling_mean(&rates, 12);

    obs.iter()
        .enumerate()
        .map(|(i, o)| {
            let monthly_change = i
                .checked_sub(1)
                .map(|j| &obs[j])
                .filter(|prev| months_between(prev.date, o.date) == 1)
                .map(|prev| o.rate - prev.rate);

            let yoy_change = o
                .date
                .with_year(o.date.year() - 1)
                .and_then(|target| rate_at(obs, target))
                .map(|prev| o.rate - prev);

            EnrichedObservation {
                observation: o.clone(),
                features: DerivedFeatures {
                    yoy_change,
                    monthly_change,
                    rolling_3mo: rolling_3[i],
                    rolling_12mo: rolling_12[i],
                },
            }
        })
        .collect()
}

fn rate_at(obs: &[Observation], date: NaiveDate) -> Option<f64> {
    obs.binary_search_by_key(&date, |o| o.date)
        .ok()
        .map(|idx| obs[idx].rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn rec(y: i32, m: u32, rate: Option<f64>) -> Record {
        Record {
            date: Some(ymd(y, m)),
            rate,
            region: Some(Region::West),
        }
    }

    fn raw(records: Vec<Record>) -> RawSeries {
        RawSeries {
            records,
            has_region: true,
        }
    }

    #[test]
    fn drops_one_duplicate_and_one_missing() {
        let input = raw(vec![
            rec(2020, 3, Some(4.4)),
            rec(2020, 1, Some(3.5)),
            rec(2020, 1, Some(3.5)),
            rec(2020, 2, None),
            rec(2020, 4, Some(14.7)),
        ]);
        let out = clean(&input);
        assert_eq!(out.dropped_missing, 1);
        assert_eq!(out.dropped_duplicates, 1);
        assert_eq!(out.series.len(), input.records.len() - 2);

        let dates: Vec<_> = out.series.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![ymd(2020, 1), ymd(2020, 3), ymd(2020, 4)]);
    }

    #[test]
    fn missing_region_only_counts_when_source_has_regions() {
        let mut r = rec(2020, 1, Some(3.5));
        r.region = None;

        let with_regions = clean(&raw(vec![r.clone()]));
        assert_eq!(with_regions.series.len(), 0);

        let without = clean(&RawSeries {
            records: vec![r],
            has_region: false,
        });
        assert_eq!(without.series.len(), 1);
    }

    #[test]
    fn conflicting_dates_keep_first_row() {
        let out = clean(&raw(vec![rec(2020, 1, Some(3.5)), rec(2020, 1, Some(3.6))]));
        assert_eq!(out.dropped_conflicts, 1);
        assert_eq!(out.series.observations()[0].rate, 3.5);
    }

    #[test]
    fn mid_month_dates_collapse_onto_the_month() {
        let mut late = rec(2020, 1, Some(3.5));
        late.date = NaiveDate::from_ymd_opt(2020, 1, 20);
        let mut early = rec(2020, 1, Some(3.5));
        early.date = NaiveDate::from_ymd_opt(2020, 1, 3);

        let out = clean(&raw(vec![late, early]));
        assert_eq!(out.dropped_duplicates, 1);
        assert_eq!(out.series.observations()[0].date, ymd(2020, 1));
    }

    #[test]
    fn signed_zero_rates_are_duplicates() {
        let out = clean(&raw(vec![rec(2020, 1, Some(0.0)), rec(2020, 1, Some(-0.0))]));
        assert_eq!(out.dropped_duplicates, 1);
        assert_eq!(out.dropped_conflicts, 0);
        assert_eq!(out.series.len(), 1);
    }

    #[test]
    fn out_of_range_rates_warn_but_stay() {
        let out = clean(&raw(vec![rec(2020, 1, Some(-1.0)), rec(2020, 2, Some(60.0))]));
        let w = out.range_warning.unwrap();
        assert_eq!(w.min_rate, -1.0);
        assert_eq!(w.max_rate, 60.0);
        assert_eq!(out.series.len(), 2);

        let ok = clean(&raw(vec![rec(2020, 1, Some(3.0))]));
        assert!(ok.range_warning.is_none());
    }

    #[test]
    fn clean_is_idempotent() {
        let input = raw(vec![
            rec(2021, 5, Some(5.8)),
            rec(2021, 4, Some(6.1)),
            rec(2021, 4, Some(6.1)),
            rec(2021, 6, None),
        ]);
        let once = clean(&input);
        let twice = clean(&once.series.to_raw());
        assert_eq!(once.series, twice.series);
        assert_eq!(twice.dropped_missing, 0);
        assert_eq!(twice.dropped_duplicates, 0);
    }

    #[test]
    fn derived_features_respect_history_and_gaps() {
        let mut records: Vec<Record> = (1..=12).map(|m| rec(2019, m, Some(m as f64))).collect();
        records.push(rec(2020, 1, Some(20.0)));
        // February 2020 missing; March follows a gap.
        records.push(rec(2020, 3, Some(30.0)));
        let series = clean(&raw(records)).series;
        let rows = add_derived_features(&series);

        assert_eq!(rows[0].features.rolling_3mo, None);
        assert_eq!(rows[1].features.rolling_3mo, None);
        assert_eq!(rows[2].features.rolling_3mo, Some(2.0));
        assert_eq!(rows[10].features.rolling_12mo, None);
        assert_eq!(rows[11].features.rolling_12mo, Some(6.5));

        assert_eq!(rows[0].features.monthly_change, None);
        assert_eq!(rows[1].features.monthly_change, Some(1.0));
        // January 2020 vs January 2019.
        assert_eq!(rows[12].features.yoy_change, Some(19.0));
        // March 2020: previous row is January, so no month-over-month delta.
        assert_eq!(rows[13].features.monthly_change, None);
        assert_eq!(rows[13].features.yoy_change, Some(27.0));
    }
}
