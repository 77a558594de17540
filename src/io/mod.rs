//! Input/output helpers.
//!
//! - CSV ingest with sample-data fallback (`ingest`)
//! - enhanced-series CSV and insights JSON exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
