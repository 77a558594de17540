//! `ur-analysis` library crate.
//!
//! The binary (`ur`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - each analysis stage can be reused on its own
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
