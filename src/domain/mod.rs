//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - provider rows and cleaned observations (`Record`, `Observation`, `Series`)
//! - derived per-month features (`DerivedFeatures`)
//! - run configuration (`AnalysisConfig`, `CrisisWindows`, `SampleConfig`)

pub mod types;

pub use types::*;
