//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - builds the configuration from the environment (`.env` honoured)
//! - runs the analysis pipeline
//! - prints reports and the terminal plot
//! - writes charts and exports

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::domain::{AnalysisConfig, month_start};
use crate::error::{AnalysisError, AppError};

pub mod pipeline;

const PLOT_WIDTH: usize = 72;
const PLOT_HEIGHT: usize = 16;

/// Entry point for the `ur` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    let config = config_from_env()?;
    info!(
        data = %config.data_path.display(),
        output = %config.output_dir.display(),
        seed = config.sample.seed,
        "starting unemployment analysis"
    );

    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_run_summary(&run.source, &run.cleaned));
    println!("{}", crate::report::format_basic_statistics(&run.summary));
    println!(
        "{}",
        crate::plot::render_ascii_plot(&run.cleaned.series, PLOT_WIDTH, PLOT_HEIGHT)
    );
    if let Some(impact) = &run.crisis {
        println!("{}", crate::report::format_crisis_findings(impact));
    }
    if let Some(seasonal) = &run.seasonal {
        println!("{}", crate::report::format_seasonal_findings(seasonal));
    }
    for (stage, reason) in &run.skipped {
        println!("(skipped {stage} analysis) {reason}\n");
    }
    println!("{}", crate::report::format_policy_recommendations(&run.insights));

    let written = pipeline::write_outputs(&run, &config)?;
    println!("{}", crate::report::format_output_files(&config.output_dir, &written));

    Ok(())
}

/// Logs go to stderr so stdout only carries the report.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (e.g. when called from tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the run configuration from `UR_*` environment variables.
///
/// Unset variables keep their defaults; set but unparsable ones are an error.
pub fn config_from_env() -> Result<AnalysisConfig, AnalysisError> {
    dotenvy::dotenv().ok();
    config_from_lookup(|key| std::env::var(key).ok())
}

/// Same as `config_from_env`, reading variables through `lookup`.
pub fn config_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<AnalysisConfig, AnalysisError> {
    let mut config = AnalysisConfig::default();

    if let Some(v) = lookup("UR_DATA_PATH") {
        config.data_path = PathBuf::from(v);
    }
    if let Some(v) = lookup("UR_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(v);
    }
    if let Some(seed) = parse_var::<u64>(&lookup, "UR_SEED")? {
        config.sample.seed = seed;
    }
    if let Some(d) = parse_date_var(&lookup, "UR_SAMPLE_START")? {
        config.sample.start = d;
    }
    if let Some(d) = parse_date_var(&lookup, "UR_SAMPLE_END")? {
        config.sample.end = d;
    }
    if let Some(d) = parse_date_var(&lookup, "UR_BASELINE_START")? {
        config.crisis.baseline_start = d;
    }
    if let Some(d) = parse_date_var(&lookup, "UR_CRISIS_START")? {
        config.crisis.crisis_start = d;
    }
    if let Some(d) = parse_date_var(&lookup, "UR_CRISIS_END")? {
        config.crisis.crisis_end = d;
    }
    if let Some(period) = parse_var::<usize>(&lookup, "UR_PERIOD")? {
        config.seasonal_period = period;
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &AnalysisConfig) -> Result<(), AnalysisError> {
    if config.sample.end < config.sample.start {
        return Err(AnalysisError::InvalidConfig(format!(
            "UR_SAMPLE_END ({}) is before UR_SAMPLE_START ({})",
            config.sample.end, config.sample.start
        )));
    }
    if config.crisis.crisis_end < config.crisis.crisis_start {
        return Err(AnalysisError::InvalidConfig(format!(
            "UR_CRISIS_END ({}) is before UR_CRISIS_START ({})",
            config.crisis.crisis_end, config.crisis.crisis_start
        )));
    }
    if config.crisis.baseline_start > config.crisis.crisis_start {
        return Err(AnalysisError::InvalidConfig(
            "UR_BASELINE_START must not be after UR_CRISIS_START".to_string(),
        ));
    }
    if config.seasonal_period < 2 {
        return Err(AnalysisError::InvalidConfig(format!(
            "UR_PERIOD must be >= 2, got {}",
            config.seasonal_period
        )));
    }
    Ok(())
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AnalysisError> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| AnalysisError::InvalidConfig(format!("{key}: cannot parse '{raw}'")))
        })
        .transpose()
}

/// Accepts `YYYY-MM-DD` or `YYYY-MM`; the day is dropped.
fn parse_date_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<NaiveDate>, AnalysisError> {
    lookup(key)
        .map(|raw| {
            let s = raw.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
                .map(month_start)
                .map_err(|_| AnalysisError::InvalidConfig(format!("{key}: expected YYYY-MM-DD, got '{raw}'")))
        })
        .transpose()
}
