//! The analysis pipeline shared by the binary and the integration tests.
//!
//! load -> clean -> features -> summary -> crisis -> seasonal -> insights
//!
//! Load, clean and summary failures abort the run. Crisis and seasonal
//! failures are logged and recorded in `RunOutput::skipped`; the report then
//! carries `None` for them.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::analysis::clean::{CleanOutput, add_derived_features, clean_with_bounds};
use crate::analysis::crisis::{CrisisImpact, analyze_crisis};
use crate::analysis::insights::{InsightReport, build_insights};
use crate::analysis::seasonal::{SeasonalAnalysis, analyze_seasonal};
use crate::analysis::stats::{SummaryStats, summarize};
use crate::domain::{AnalysisConfig, DataSource, EnrichedObservation};
use crate::error::AnalysisError;
use crate::io::{ENHANCED_CSV_FILE, INSIGHTS_JSON_FILE, load_series, write_enhanced_csv, write_insights_json};
use crate::plot::charts;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub source: DataSource,
    pub cleaned: CleanOutput,
    pub enriched: Vec<EnrichedObservation>,
    pub summary: SummaryStats,
    pub crisis: Option<CrisisImpact>,
    pub seasonal: Option<SeasonalAnalysis>,
    pub insights: InsightReport,
    /// Stages that failed without aborting the run, with the reason.
    pub skipped: Vec<(&'static str, String)>,
}

/// Execute every analysis stage and return the computed outputs.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AnalysisError> {
    // 1) Load (falls back to sample data when the file is absent).
    let loaded = load_series(&config.data_path, config)?;

    // 2) Clean and derive features.
    let cleaned = clean_with_bounds(&loaded.raw, config.rate_bounds);
    let enriched = add_derived_features(&cleaned.series);
    info!(rows = cleaned.series.len(), "cleaned series");

    // 3) Descriptive statistics.
    let series = &cleaned.series;
    let summary = summarize(series)?;
    info!(mean = summary.mean, std = summary.std, "computed summary statistics");

    let mut skipped = Vec::new();

    // 4) Crisis comparison.
    let crisis = match analyze_crisis(series, &config.crisis) {
        Ok(impact) => {
            info!(
                peak = impact.peak_covid_rate,
                increase_pct = impact.covid_increase_pct,
                "analyzed crisis impact"
            );
            Some(impact)
        }
        Err(e) => {
            warn!(error = %e, "skipping crisis analysis");
            skipped.push(("crisis", e.to_string()));
            None
        }
    };

    // 5) Seasonal decomposition.
    let seasonal = match analyze_seasonal(series, config.seasonal_period) {
        Ok(s) => {
            info!(strength = s.strength, "analyzed seasonal pattern");
            Some(s)
        }
        Err(e) => {
            warn!(error = %e, "skipping seasonal analysis");
            skipped.push(("seasonal", e.to_string()));
            None
        }
    };

    // 6) Insights.
    let insights = build_insights(series, &summary, crisis.as_ref(), seasonal.as_ref(), &config.crisis);

    Ok(RunOutput {
        source: loaded.source,
        cleaned,
        enriched,
        summary,
        crisis,
        seasonal,
        insights,
        skipped,
    })
}

/// Render charts and write exports into `config.output_dir`.
///
/// Charts whose stage was skipped are not written. Returns the written paths.
pub fn write_outputs(run: &RunOutput, config: &AnalysisConfig) -> Result<Vec<PathBuf>, AnalysisError> {
    let dir = &config.output_dir;
    fs::create_dir_all(dir)
        .map_err(|e| AnalysisError::io(format!("failed to create output directory '{}'", dir.display()), e))?;

    let series = &run.cleaned.series;
    let mut written = Vec::new();

    written.push(charts::save_svg(
        dir,
        charts::OVERVIEW_FILE,
        &charts::overview_svg(series, &run.summary)?,
    )?);
    if let Some(impact) = &run.crisis {
        written.push(charts::save_svg(
            dir,
            charts::CRISIS_FILE,
            &charts::crisis_svg(series, impact, &config.crisis)?,
        )?);
    }
    if let Some(seasonal) = &run.seasonal {
        written.push(charts::save_svg(
            dir,
            charts::DECOMPOSITION_FILE,
            &charts::decomposition_svg(series, &seasonal.decomposition)?,
        )?);
        written.push(charts::save_svg(dir, charts::HEATMAP_FILE, &charts::heatmap_svg(series)?)?);
    }
    written.push(charts::save_svg(
        dir,
        charts::DASHBOARD_FILE,
        &charts::dashboard_svg(&run.insights)?,
    )?);

    let csv_path = dir.join(ENHANCED_CSV_FILE);
    write_enhanced_csv(&csv_path, &run.enriched)?;
    written.push(csv_path);

    let json_path = dir.join(INSIGHTS_JSON_FILE);
    write_insights_json(&json_path, &run.source, &run.summary, &run.insights)?;
    written.push(json_path);

    info!(files = written.len(), dir = %dir.display(), "wrote outputs");
    Ok(written)
}
