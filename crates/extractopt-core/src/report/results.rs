use super::ReportError;
use crate::engine::grid::{GridPoint, GridResults};
use serde::{Serialize, Serializer};
use std::io;
use std::path::Path;
use tracing::info;

pub const DEFAULT_RESULTS_FILE: &str = "optimized_extraction_results.csv";

#[derive(Debug, Serialize)]
struct ResultRow {
    #[serde(rename = "Temperature_C", serialize_with = "whole_as_integer")]
    temperature_c: f64,
    #[serde(rename = "Ethanol_Percent")]
    ethanol_percent: f64,
    #[serde(rename = "Water_Percent")]
    water_percent: f64,
    #[serde(rename = "Solvent_Polarity")]
    solvent_polarity: f64,
    #[serde(rename = "Predicted_Yield")]
    predicted_yield: f64,
}

impl From<&GridPoint> for ResultRow {
    fn from(p: &GridPoint) -> Self {
        Self {
            temperature_c: p.temperature_c,
            ethanol_percent: p.ethanol_percent(),
            water_percent: p.water_percent(),
            solvent_polarity: p.solvent_polarity,
            predicted_yield: p.predicted_yield,
        }
    }
}

fn whole_as_integer<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Writes one CSV row per grid point, in enumeration order, with a header row.
pub fn write_csv<W: io::Write>(grid: &GridResults, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in grid.points() {
        wtr.serialize(ResultRow::from(point))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_csv(grid: &GridResults, path: &Path) -> Result<(), ReportError> {
    let path_str = path.to_string_lossy().to_string();
    let file = std::fs::File::create(path).map_err(|e| ReportError::Io {
        path: path_str.clone(),
        source: e,
    })?;
    write_csv(grid, io::BufWriter::new(file)).map_err(|e| ReportError::Csv {
        path: path_str.clone(),
        source: e,
    })?;
    info!(path = %path_str, rows = grid.len(), "Results table written.");
    Ok(())
}
