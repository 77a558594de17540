//! Data providers: the seeded synthetic series.
//!
//! CSV loading lives in `io::ingest`; it falls back to this generator when the
//! input file is absent.

pub mod sample;

pub use sample::*;
