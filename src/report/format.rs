//! Formatted terminal output.
//!
//! Every section is built as a `String` so the binary only prints, and output
//! changes stay covered by tests.

use std::path::{Path, PathBuf};

use crate::analysis::clean::CleanOutput;
use crate::analysis::crisis::CrisisImpact;
use crate::analysis::insights::InsightReport;
use crate::analysis::seasonal::SeasonalAnalysis;
use crate::analysis::stats::SummaryStats;
use crate::domain::{DataSource, month_name};

const RULE_WIDTH: usize = 50;

/// Data source and cleaning outcome.
pub fn format_run_summary(source: &DataSource, cleaned: &CleanOutput) -> String {
    let mut out = String::new();

    out.push_str("=== ur - Unemployment Rate Analysis ===\n");
    match source {
        DataSource::Csv(path) => out.push_str(&format!("Source: {}\n", path.display())),
        DataSource::Synthetic {
            fallback_from: Some(path),
        } => out.push_str(&format!("Source: sample data ({} not found)\n", path.display())),
        DataSource::Synthetic { fallback_from: None } => out.push_str("Source: sample data\n"),
    }
    out.push_str(&format!(
        "Rows: {} kept | dropped: {} missing, {} duplicate, {} conflicting\n",
        cleaned.series.len(),
        cleaned.dropped_missing,
        cleaned.dropped_duplicates,
        cleaned.dropped_conflicts,
    ));
    if let Some(w) = &cleaned.range_warning {
        out.push_str(&format!(
            "Warning: rates outside expected range ({:.0}-{:.0}%): min={:.2} max={:.2}\n",
            w.lower_bound, w.upper_bound, w.min_rate, w.max_rate
        ));
    }

    out
}

pub fn format_basic_statistics(stats: &SummaryStats) -> String {
    let mut out = header("BASIC STATISTICS");

    out.push_str(&format!(
        "Total Period: {} to {}\n",
        stats.start.format("%Y-%m"),
        stats.end.format("%Y-%m")
    ));
    out.push_str(&format!("Observations: {}\n", stats.count));
    for (label, value) in [
        ("Mean Unemployment Rate", stats.mean),
        ("Median Unemployment Rate", stats.median),
        ("Standard Deviation", stats.std),
        ("Minimum Rate", stats.min),
        ("Maximum Rate", stats.max),
        ("25th Percentile", stats.p25),
        ("75th Percentile", stats.p75),
    ] {
        out.push_str(&format!("{label}: {value:.2}%\n"));
    }

    out
}

pub fn format_crisis_findings(impact: &CrisisImpact) -> String {
    let mut out = header("COVID-19 IMPACT FINDINGS");

    out.push_str(&format!("Pre-COVID Average: {:.2}%\n", impact.pre_covid_avg));
    out.push_str(&format!(
        "Peak COVID Rate: {:.2}% ({})\n",
        impact.peak_covid_rate,
        impact.peak_date.format("%Y-%m")
    ));
    out.push_str(&format!("Maximum Increase: {:.1}%\n", impact.covid_increase_pct));
    out.push_str(&format!("COVID Period Average: {:.2}%\n", impact.covid_period_avg));
    out.push_str(&format!("Post-COVID Average: {}\n", fmt_opt_pct(impact.post_covid_avg)));

    out
}

pub fn format_seasonal_findings(seasonal: &SeasonalAnalysis) -> String {
    let mut out = header("SEASONAL ANALYSIS FINDINGS");

    out.push_str(&format!("Seasonal Strength: {:.3}\n", seasonal.strength));
    out.push_str("\nMonthly Averages:\n");
    for (&month, stats) in &seasonal.monthly {
        out.push_str(&format!("  {:<10} {:.2}%\n", format!("{}:", month_name(month)), stats.mean));
    }
    if let Some(m) = seasonal.peak_month {
        out.push_str(&format!("\nHighest unemployment typically in: {}\n", month_name(m)));
    }
    if let Some(m) = seasonal.trough_month {
        out.push_str(&format!("Lowest unemployment typically in: {}\n", month_name(m)));
    }

    out
}

/// Key metrics followed by the fixed recommendation template.
pub fn format_policy_recommendations(report: &InsightReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "=".repeat(60)));
    out.push_str("ECONOMIC AND SOCIAL POLICY RECOMMENDATIONS\n");
    out.push_str(&format!("{}\n", "=".repeat(60)));

    out.push_str("\nKey metrics:\n");
    out.push_str(&format!(
        "- Long-term change ({}-{}): {}\n",
        report.trend.first_year,
        report.trend.last_year,
        fmt_opt_signed(report.trend.long_term_change, "pp"),
    ));
    out.push_str(&format!("- Volatility (std): {:.2}pp\n", report.trend.volatility));
    out.push_str(&format!(
        "- Pre-crisis stability (std): {}\n",
        fmt_opt(report.trend.pre_crisis_stability, "pp")
    ));
    out.push_str(&format!(
        "- Months above pre-crisis baseline: {}\n",
        report
            .recovery_months
            .map(|m| m.to_string())
            .unwrap_or_else(|| "n/a".to_string())
    ));
    out.push_str(&format!(
        "- Crisis peak vs historical max / p95: {} vs {:.1}% / {:.1}%\n",
        fmt_opt_pct(report.crisis_comparison.covid_peak),
        report.crisis_comparison.historical_max,
        report.crisis_comparison.p95,
    ));
    out.push_str(&format!("- Seasonal strength: {}\n", fmt_opt(report.seasonal.strength, "")));

    for (title, items) in RECOMMENDATIONS {
        out.push_str(&format!("\n{title}:\n"));
        for item in items {
            out.push_str(&format!("   - {item}\n"));
        }
    }

    out
}

/// Final listing of everything written to the output directory.
pub fn format_output_files(dir: &Path, files: &[PathBuf]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Output files saved in '{}':\n", dir.display()));
    for f in files {
        let name = f
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| f.display().to_string());
        out.push_str(&format!("   - {name}\n"));
    }
    out
}

const RECOMMENDATIONS: [(&str, [&str; 4]); 5] = [
    (
        "CRISIS PREPAREDNESS AND RESPONSE",
        [
            "Establish automatic unemployment benefit triggers during economic shocks",
            "Develop rapid-response job retraining programs",
            "Create digital infrastructure for remote job matching",
            "Build emergency employment programs for future crises",
        ],
    ),
    (
        "SEASONAL EMPLOYMENT STRATEGIES",
        [
            "Implement counter-cyclical public sector hiring",
            "Develop seasonal worker transition programs",
            "Offer tax incentives for off-season employment",
            "Create weather-adaptive employment policies",
        ],
    ),
    (
        "REGIONAL ECONOMIC DEVELOPMENT",
        [
            "Target economic development in high-unemployment regions",
            "Create region-specific job training programs",
            "Develop infrastructure projects in vulnerable areas",
            "Promote regional industry diversification",
        ],
    ),
    (
        "LONG-TERM WORKFORCE DEVELOPMENT",
        [
            "Invest in future-oriented education and training",
            "Promote entrepreneurship and small business development",
            "Strengthen apprenticeship and vocational programs",
            "Develop lifelong learning initiatives",
        ],
    ),
    (
        "MONITORING AND EVALUATION",
        [
            "Implement real-time labor market monitoring",
            "Regular policy impact assessments",
            "Data-driven workforce development planning",
            "Stakeholder engagement in policy design",
        ],
    ),
];

fn header(title: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("{rule}\n{title}\n{rule}\n")
}

fn fmt_opt(v: Option<f64>, unit: &str) -> String {
    v.map(|x| format!("{x:.2}{unit}")).unwrap_or_else(|| "n/a".to_string())
}

fn fmt_opt_signed(v: Option<f64>, unit: &str) -> String {
    v.map(|x| format!("{x:+.2}{unit}")).unwrap_or_else(|| "n/a".to_string())
}

fn fmt_opt_pct(v: Option<f64>) -> String {
    fmt_opt(v, "%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::analysis::insights::{CrisisComparison, SeasonalSummary, TrendInsights};
    use crate::domain::Series;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn basic_statistics_block() {
        let stats = SummaryStats {
            count: 4,
            mean: 2.5,
            median: 2.5,
            std: 1.29,
            min: 1.0,
            max: 4.0,
            p25: 1.75,
            p75: 3.25,
            start: ymd(2020, 1),
            end: ymd(2020, 4),
        };
        let txt = format_basic_statistics(&stats);
        assert!(txt.starts_with(&"=".repeat(50)));
        assert!(txt.contains("BASIC STATISTICS\n"));
        assert!(txt.contains("Total Period: 2020-01 to 2020-04\n"));
        assert!(txt.contains("Mean Unemployment Rate: 2.50%\n"));
        assert!(txt.contains("25th Percentile: 1.75%\n"));
    }

    #[test]
    fn crisis_block_marks_missing_post_period() {
        let impact = CrisisImpact {
            pre_covid_avg: 3.6,
            peak_covid_rate: 14.7,
            peak_date: ymd(2020, 4),
            covid_increase_pct: 308.33,
            pre_period_avg: 4.0,
            covid_period_avg: 8.1,
            post_covid_avg: None,
        };
        let txt = format_crisis_findings(&impact);
        assert!(txt.contains("Peak COVID Rate: 14.70% (2020-04)\n"));
        assert!(txt.contains("Maximum Increase: 308.3%\n"));
        assert!(txt.contains("Post-COVID Average: n/a\n"));
    }

    #[test]
    fn recommendations_render_every_section() {
        let report = InsightReport {
            trend: TrendInsights {
                long_term_change: Some(-4.25),
                first_year: 2010,
                last_year: 2024,
                volatility: 2.1,
                pre_crisis_stability: None,
            },
            recovery_months: None,
            crisis: None,
            crisis_comparison: CrisisComparison {
                covid_peak: None,
                historical_max: 17.8,
                p95: 11.2,
            },
            seasonal: SeasonalSummary {
                strength: None,
                peak_month: None,
                trough_month: None,
                monthly_means: Vec::new(),
            },
            regional_volatility: Vec::new(),
        };
        let txt = format_policy_recommendations(&report);
        assert!(txt.contains("- Long-term change (2010-2024): -4.25pp\n"));
        assert!(txt.contains("- Months above pre-crisis baseline: n/a\n"));
        assert!(txt.contains("- Crisis peak vs historical max / p95: n/a vs 17.8% / 11.2%\n"));
        for (title, items) in RECOMMENDATIONS {
            assert!(txt.contains(&format!("\n{title}:\n")));
            assert!(txt.contains(items[0]));
        }
    }

    #[test]
    fn run_summary_reports_fallback_and_drops() {
        let cleaned = CleanOutput {
            series: Series::default(),
            dropped_missing: 1,
            dropped_duplicates: 2,
            dropped_conflicts: 0,
            range_warning: None,
        };
        let source = DataSource::Synthetic {
            fallback_from: Some(PathBuf::from("data/missing.csv")),
        };
        let txt = format_run_summary(&source, &cleaned);
        assert!(txt.contains("Source: sample data (data/missing.csv not found)\n"));
        assert!(txt.contains("dropped: 1 missing, 2 duplicate, 0 conflicting\n"));
        assert!(!txt.contains("Warning"));
    }

    #[test]
    fn output_listing_uses_file_names() {
        let dir = Path::new("out");
        let files = vec![dir.join("overview_analysis.svg"), dir.join("insights.json")];
        let txt = format_output_files(dir, &files);
        assert_eq!(
            txt,
            "Output files saved in 'out':\n   - overview_analysis.svg\n   - insights.json\n"
        );
    }
}
