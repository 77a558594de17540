//! Numerical building blocks: aggregate statistics and seasonal decomposition.

pub mod decompose;
pub mod stats;

pub use decompose::*;
pub use stats::*;
