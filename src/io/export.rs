//! Exports written next to the charts.
//!
//! - `enhanced_series.csv`: the cleaned series with its derived features, easy
//!   to consume in spreadsheets or downstream scripts
//! - `insights.json`: summary statistics plus the insight report

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::analysis::insights::InsightReport;
use crate::analysis::stats::SummaryStats;
use crate::domain::{DataSource, EnrichedObservation};
use crate::error::AnalysisError;

pub const ENHANCED_CSV_FILE: &str = "enhanced_series.csv";
pub const INSIGHTS_JSON_FILE: &str = "insights.json";

/// Write the enhanced series to a CSV file. Missing features are empty cells.
pub fn write_enhanced_csv(path: &Path, rows: &[EnrichedObservation]) -> Result<(), AnalysisError> {
    let file = File::create(path)
        .map_err(|e| AnalysisError::io(format!("failed to create export CSV '{}'", path.display()), e))?;
    let mut out = BufWriter::new(file);

    writeln!(
        out,
        "date,year,month,quarter,region,unemployment_rate,yoy_change,monthly_change,rolling_3mo,rolling_12mo"
    )
    .map_err(|e| AnalysisError::io("failed to write export CSV header", e))?;

    for row in rows {
        let o = &row.observation;
        let f = &row.features;
        writeln!(
            out,
            "{},{},{},{},{},{:.4},{},{},{},{}",
            o.date,
            o.year,
            o.month,
            o.quarter,
            o.region.map(|r| r.display_name()).unwrap_or(""),
            o.rate,
            fmt_cell(f.yoy_change),
            fmt_cell(f.monthly_change),
            fmt_cell(f.rolling_3mo),
            fmt_cell(f.rolling_12mo),
        )
        .map_err(|e| AnalysisError::io("failed to write export CSV row", e))?;
    }

    out.flush()
        .map_err(|e| AnalysisError::io(format!("failed to flush export CSV '{}'", path.display()), e))
}

/// JSON document written to `insights.json`.
#[derive(Debug, Serialize)]
pub struct InsightsFile<'a> {
    pub tool: &'static str,
    /// `csv` or `sample`.
    pub source: &'static str,
    pub summary: &'a SummaryStats,
    pub insights: &'a InsightReport,
}

pub fn write_insights_json(
    path: &Path,
    source: &DataSource,
    summary: &SummaryStats,
    insights: &InsightReport,
) -> Result<(), AnalysisError> {
    let file = File::create(path)
        .map_err(|e| AnalysisError::io(format!("failed to create insights JSON '{}'", path.display()), e))?;

    let doc = InsightsFile {
        tool: "ur",
        source: match source {
            DataSource::Csv(_) => "csv",
            DataSource::Synthetic { .. } => "sample",
        },
        summary,
        insights,
    };

    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, &doc)
        .map_err(|e| AnalysisError::io("failed to write insights JSON", e.into()))?;
    out.flush()
        .map_err(|e| AnalysisError::io(format!("failed to flush insights JSON '{}'", path.display()), e))
}

fn fmt_cell(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::clean::{add_derived_features, clean};
    use crate::analysis::insights::build_insights;
    use crate::analysis::stats::summarize;
    use crate::domain::{CrisisWindows, RawSeries, Record, Region};
    use chrono::NaiveDate;

    fn series() -> crate::domain::Series {
        let records = (1..=3)
            .map(|m| Record {
                date: NaiveDate::from_ymd_opt(2021, m, 1),
                rate: Some(5.0 + m as f64),
                region: Some(Region::Midwest),
            })
            .collect();
        clean(&RawSeries {
            records,
            has_region: true,
        })
        .series
    }

    #[test]
    fn enhanced_csv_has_header_and_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ENHANCED_CSV_FILE);
        write_enhanced_csv(&path, &add_derived_features(&series())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("date,year,month"));
        assert_eq!(lines[1], "2021-01-01,2021,1,1,Midwest,6.0000,,,,");
        assert_eq!(lines[3], "2021-03-01,2021,3,1,Midwest,8.0000,,1.0000,7.0000,");
    }

    #[test]
    fn insights_json_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INSIGHTS_JSON_FILE);
        let s = series();
        let summary = summarize(&s).unwrap();
        let report = build_insights(&s, &summary, None, None, &CrisisWindows::default());
        write_insights_json(&path, &DataSource::Synthetic { fallback_from: None }, &summary, &report).unwrap();

        let value: serde_json::Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["tool"], "ur");
        assert_eq!(value["source"], "sample");
        assert_eq!(value["summary"]["count"], 3);
        assert!(value["insights"]["crisis"].is_null());
    }
}
