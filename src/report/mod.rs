//! Reporting: formatted terminal output for each pipeline stage.
//!
//! Formatting lives apart from the analysis code so the numbers stay testable
//! on their own and output changes are localized.

pub mod format;

pub use format::*;
