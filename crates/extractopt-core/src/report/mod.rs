//! # Report Module
//!
//! Turns an [`OptimizationResult`](crate::workflows::optimize::OptimizationResult)
//! into human- and machine-readable output.
//!
//! - **Protocol** ([`protocol`]) - The step-by-step extraction protocol text
//! - **Heatmap** ([`heatmap`]) - Temperature x ethanol-percentage yield grid, as text or SVG
//! - **Results Table** ([`results`]) - The grid as CSV

pub mod heatmap;
pub mod protocol;
pub mod results;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV writing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

/// Formats a temperature without a trailing `.0` when it is a whole number.
pub(crate) fn format_temperature(t: f64) -> String {
    if t.fract() == 0.0 && t.abs() < 1e15 {
        format!("{t:.0}")
    } else {
        format!("{t}")
    }
}
