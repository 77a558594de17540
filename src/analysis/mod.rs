//! Analysis stages, in pipeline order: clean → stats → crisis → seasonal → insights.

pub mod clean;
pub mod crisis;
pub mod insights;
pub mod seasonal;
pub mod stats;
