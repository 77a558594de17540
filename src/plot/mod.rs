//! Rendering: SVG chart files and a terminal sketch of the series.

pub mod ascii;
pub mod charts;

pub use ascii::render_ascii_plot;
