//! Crisis-window segmentation and impact metrics.
//!
//! Windows (all dates first-of-month):
//!
//! ```text
//! pre      = date <  crisis_start
//! during   = crisis_start <= date <= crisis_end
//! post     = date >  crisis_end
//! baseline = pre ∩ date >= baseline_start
//! ```
//!
//! The series is sorted, so every window is a contiguous slice.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{CrisisWindows, Observation, Series};
use crate::error::AnalysisError;
use crate::math;

/// Borrowed views of the three crisis partitions.
#[derive(Debug, Clone, Copy)]
pub struct CrisisSegments<'a> {
    pub pre: &'a [Observation],
    pub during: &'a [Observation],
    pub post: &'a [Observation],
    /// Tail of `pre` used for the baseline average.
    pub baseline: &'a [Observation],
}

pub fn segment_by_crisis<'a>(series: &'a Series, windows: &CrisisWindows) -> CrisisSegments<'a> {
    let obs = series.observations();
    let crisis_from = obs.partition_point(|o| o.date < windows.crisis_start);
    // Guard against a misconfigured end before the start.
    let crisis_to = obs.partition_point(|o| o.date <= windows.crisis_end).max(crisis_from);
    let (pre, rest) = obs.split_at(crisis_from);
    let (during, post) = rest.split_at(crisis_to - crisis_from);

    let baseline_from = pre.partition_point(|o| o.date < windows.baseline_start);
    CrisisSegments {
        pre,
        during,
        post,
        baseline: &pre[baseline_from..],
    }
}

/// Percent increase of `during_peak` over `pre_avg`.
pub fn compute_impact(pre_avg: f64, during_peak: f64) -> Result<f64, AnalysisError> {
    if !pre_avg.is_finite() || pre_avg == 0.0 {
        return Err(AnalysisError::EmptyBaseline);
    }
    Ok((during_peak - pre_avg) / pre_avg * 100.0)
}

/// Comparative crisis metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrisisImpact {
    /// Mean over the baseline window.
    pub pre_covid_avg: f64,
    pub peak_covid_rate: f64,
    pub peak_date: NaiveDate,
    pub covid_increase_pct: f64,
    /// Mean over the whole pre-crisis partition.
    pub pre_period_avg: f64,
    pub covid_period_avg: f64,
    /// `None` when the series ends inside the crisis window.
    pub post_covid_avg: Option<f64>,
}

impl CrisisImpact {
    /// Post-crisis average minus the baseline, when a post period exists.
    pub fn net_change(&self) -> Option<f64> {
        self.post_covid_avg.map(|p| p - self.pre_covid_avg)
    }
}

pub fn analyze_crisis(series: &Series, windows: &CrisisWindows) -> Result<CrisisImpact, AnalysisError> {
    let seg = segment_by_crisis(series, windows);

    let baseline: Vec<f64> = seg.baseline.iter().map(|o| o.rate).collect();
    let pre_covid_avg = math::mean(&baseline).ok_or(AnalysisError::EmptyBaseline)?;

    // First maximum wins on ties.
    let peak = seg
        .during
        .iter()
        .reduce(|best, o| if o.rate > best.rate { o } else { best })
        .ok_or(AnalysisError::EmptySeries { context: "crisis window" })?;

    let covid_increase_pct = compute_impact(pre_covid_avg, peak.rate)?;
    let rates = |s: &[Observation]| s.iter().map(|o| o.rate).collect::<Vec<_>>();

    Ok(CrisisImpact {
        pre_covid_avg,
        peak_covid_rate: peak.rate,
        peak_date: peak.date,
        covid_increase_pct,
        pre_period_avg: math::mean(&rates(seg.pre)).ok_or(AnalysisError::EmptyBaseline)?,
        covid_period_avg: math::mean(&rates(seg.during))
            .ok_or(AnalysisError::EmptySeries { context: "crisis window" })?,
        post_covid_avg: math::mean(&rates(seg.post)),
    })
}

/// Months on or after the crisis start with a rate above `baseline`.
pub fn months_above_baseline(series: &Series, windows: &CrisisWindows, baseline: f64) -> usize {
    series
        .observations()
        .iter()
        .filter(|o| o.date >= windows.crisis_start && o.rate > baseline)
        .count()
}

/// Observations inside the chart timeline window (inclusive).
pub fn timeline<'a>(series: &'a Series, windows: &CrisisWindows) -> &'a [Observation] {
    let obs = series.observations();
    let from = obs.partition_point(|o| o.date < windows.timeline_start);
    let to = obs.partition_point(|o| o.date <= windows.timeline_end).max(from);
    &obs[from..to]
}
