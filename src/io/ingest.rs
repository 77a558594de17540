//! CSV ingest.
//!
//! Turns a monthly unemployment CSV into provider rows (`RawSeries`). Missing
//! cells stay missing here; dropping them is the cleaner's job.
//!
//! Design goals:
//! - **Strict schema** for required columns (`date`, `unemployment_rate`)
//! - **Fail fast** on values that are present but unparsable
//! - **Fallback** to the synthetic generator only when the file does not exist

use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{info, warn};

use crate::data::generate_sample_series;
use crate::domain::{AnalysisConfig, DataSource, RawSeries, Record, Region, month_start};
use crate::error::AnalysisError;

/// Accepted header names, first match wins. FRED exports use
/// `observation_date` / `UNRATE`.
const DATE_COLUMNS: [&str; 2] = ["date", "observation_date"];
const RATE_COLUMNS: [&str; 3] = ["unemployment_rate", "unrate", "rate"];
const REGION_COLUMN: &str = "region";

/// Ingest output: provider rows plus where they came from.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub raw: RawSeries,
    pub source: DataSource,
}

/// Load the series at `path`, falling back to sample data if the file is absent.
pub fn load_series(path: &Path, config: &AnalysisConfig) -> Result<LoadedData, AnalysisError> {
    match read_csv(path) {
        Ok(raw) => {
            info!(path = %path.display(), rows = raw.records.len(), "loaded series from CSV");
            Ok(LoadedData {
                raw,
                source: DataSource::Csv(path.to_path_buf()),
            })
        }
        Err(AnalysisError::MissingInput { path }) => {
            warn!(path = %path.display(), "data file not found; using sample data");
            let raw = generate_sample_series(&config.sample)?;
            info!(rows = raw.records.len(), seed = config.sample.seed, "generated sample series");
            Ok(LoadedData {
                raw,
                source: DataSource::Synthetic {
                    fallback_from: Some(path),
                },
            })
        }
        Err(e) => Err(e),
    }
}

/// Read a CSV file into provider rows.
pub fn read_csv(path: &Path) -> Result<RawSeries, AnalysisError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AnalysisError::MissingInput {
            path: path.to_path_buf(),
        },
        _ => AnalysisError::io(format!("failed to open CSV '{}'", path.display()), e),
    })?;
    read_records(file)
}

/// Parse CSV content from any reader.
pub fn read_records<R: Read>(input: R) -> Result<RawSeries, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::malformed(Some(1), format!("failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = find_column(&header_map, &DATE_COLUMNS)
        .ok_or_else(|| AnalysisError::malformed(Some(1), "missing required column `date`"))?;
    let rate_idx = find_column(&header_map, &RATE_COLUMNS)
        .ok_or_else(|| AnalysisError::malformed(Some(1), "missing required column `unemployment_rate`"))?;
    let region_idx = header_map.get(REGION_COLUMN).copied();

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AnalysisError::malformed(Some(line), format!("CSV parse error: {e}")))?;

        let date = get_cell(&record, date_idx)
            .map(parse_date)
            .transpose()
            .map_err(|msg| AnalysisError::malformed(Some(line), msg))?;
        let rate = get_cell(&record, rate_idx)
            .map(parse_rate)
            .transpose()
            .map_err(|msg| AnalysisError::malformed(Some(line), msg))?;
        let region = region_idx
            .and_then(|i| get_cell(&record, i))
            .map(|s| Region::parse(s).ok_or_else(|| format!("unknown region '{s}'")))
            .transpose()
            .map_err(|msg| AnalysisError::malformed(Some(line), msg))?;

        records.push(Record { date, rate, region });
    }

    Ok(RawSeries {
        records,
        has_region: region_idx.is_some(),
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

/// A trimmed, non-empty cell. `.` is FRED's missing-value marker.
fn get_cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ".")
}

/// Parse a date and truncate it to the first of its month.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(month_start(d));
        }
    }
    // Month-only form (`YYYY-MM`).
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Ok(d);
    }
    Err(format!(
        "invalid date '{s}'; expected one of YYYY-MM-DD, YYYY-MM, YYYY/MM/DD, MM/DD/YYYY"
    ))
}

fn parse_rate(s: &str) -> Result<f64, String> {
    let v = s
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid unemployment rate '{s}'"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("non-finite unemployment rate '{s}'"))
    }
}
