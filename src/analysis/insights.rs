//! Insight report: the fixed-shape summary behind the dashboard and the
//! recommendation text.
//!
//! Every metric whose inputs can be absent is an `Option`; nothing is
//! defaulted to zero.

use chrono::Datelike;
use serde::Serialize;

use crate::analysis::crisis::{CrisisImpact, months_above_baseline};
use crate::analysis::seasonal::{SeasonalAnalysis, monthly_profile};
use crate::analysis::stats::{SummaryStats, regional_summary, yearly_averages};
use crate::domain::{CrisisWindows, Region, Series};
use crate::math;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendInsights {
    /// Mean of the last calendar year minus mean of the first.
    pub long_term_change: Option<f64>,
    pub first_year: i32,
    pub last_year: i32,
    /// Sample std over the whole series.
    pub volatility: f64,
    /// Sample std of the months before the stability cutoff.
    pub pre_crisis_stability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrisisComparison {
    pub covid_peak: Option<f64>,
    pub historical_max: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalSummary {
    pub strength: Option<f64>,
    pub peak_month: Option<u32>,
    pub trough_month: Option<u32>,
    /// Mean rate per calendar month, January first.
    pub monthly_means: Vec<(u32, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionalVolatility {
    pub region: Region,
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightReport {
    pub trend: TrendInsights,
    /// Months on or after the crisis start spent above the pre-crisis baseline.
    pub recovery_months: Option<usize>,
    pub crisis: Option<CrisisImpact>,
    pub crisis_comparison: CrisisComparison,
    pub seasonal: SeasonalSummary,
    /// Ascending by std. Empty when the series carries no regions.
    pub regional_volatility: Vec<RegionalVolatility>,
}

impl InsightReport {
    /// Post-crisis average minus the baseline.
    pub fn net_change(&self) -> Option<f64> {
        self.crisis.as_ref().and_then(CrisisImpact::net_change)
    }
}

pub fn build_insights(
    series: &Series,
    summary: &SummaryStats,
    crisis: Option<&CrisisImpact>,
    seasonal: Option<&SeasonalAnalysis>,
    windows: &CrisisWindows,
) -> InsightReport {
    let yearly = yearly_averages(series);
    let (first_year, last_year) = (summary.start.year(), summary.end.year());
    let long_term_change = match (yearly.first_key_value(), yearly.last_key_value()) {
        (Some((fy, first)), Some((ly, last))) if fy != ly => Some(last - first),
        _ => None,
    };

    let pre_stability: Vec<f64> = series
        .observations()
        .iter()
        .filter(|o| o.date < windows.stability_end)
        .map(|o| o.rate)
        .collect();

    let mut rates = series.rates();
    rates.sort_by(f64::total_cmp);
    let p95 = if rates.is_empty() {
        summary.max
    } else {
        math::quantile_sorted(&rates, 0.95)
    };

    let monthly_means = match seasonal {
        Some(s) => s.monthly.iter().map(|(&m, stats)| (m, stats.mean)).collect(),
        None => monthly_profile(series)
            .into_iter()
            .map(|(m, stats)| (m, stats.mean))
            .collect(),
    };

    let mut regional_volatility: Vec<RegionalVolatility> = regional_summary(series)
        .into_iter()
        .filter_map(|r| r.std.map(|std| RegionalVolatility { region: r.region, std }))
        .collect();
    regional_volatility.sort_by(|a, b| a.std.total_cmp(&b.std));

    InsightReport {
        trend: TrendInsights {
            long_term_change,
            first_year,
            last_year,
            volatility: summary.std,
            pre_crisis_stability: math::sample_std(&pre_stability),
        },
        recovery_months: crisis.map(|c| months_above_baseline(series, windows, c.pre_covid_avg)),
        crisis: crisis.cloned(),
        crisis_comparison: CrisisComparison {
            covid_peak: crisis.map(|c| c.peak_covid_rate),
            historical_max: summary.max,
            p95,
        },
        seasonal: SeasonalSummary {
            strength: seasonal.map(|s| s.strength),
            peak_month: seasonal.and_then(|s| s.peak_month),
            trough_month: seasonal.and_then(|s| s.trough_month),
            monthly_means,
        },
        regional_volatility,
    }
}
