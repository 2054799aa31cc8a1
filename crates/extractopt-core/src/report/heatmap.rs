//! Yield heatmap over the search grid.
//!
//! Rows are temperatures, columns are ethanol percentages, and each cell holds
//! the predicted yield with one decimal. The grid can be drawn as shaded text
//! for a terminal or as a standalone SVG document.

use super::{ReportError, format_temperature};
use crate::engine::grid::GridResults;
use std::path::Path;
use tracing::info;

pub const TITLE: &str = "Predicted Extraction Yield (%) vs. Temperature and Ethanol %";

/// Light to dark, indexed by the normalized cell value.
const SHADES: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Control points of the viridis colormap.
#[rustfmt::skip]
const VIRIDIS: [(f64, [u8; 3]); 5] = [
    (0.00, [68, 1, 84]),
    (0.25, [59, 82, 139]),
    (0.50, [33, 145, 140]),
    (0.75, [94, 201, 98]),
    (1.00, [253, 231, 37]),
];

const CELL_W: f64 = 80.0;
const CELL_H: f64 = 40.0;
const MARGIN_LEFT: f64 = 110.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    temperatures: Vec<f64>,
    ethanol_percents: Vec<f64>,
    cells: Vec<Vec<Option<f64>>>,
}

impl Heatmap {
    /// Pivots grid points into a temperature x ethanol-percentage table.
    pub fn from_grid(grid: &GridResults) -> Self {
        let temperatures = grid.temperatures();
        let ethanol_percents: Vec<f64> = grid
            .ethanol_fractions()
            .into_iter()
            .map(|f| f * 100.0)
            .collect();
        let mut cells = vec![vec![None; ethanol_percents.len()]; temperatures.len()];

        for point in grid.points() {
            let row = temperatures.iter().position(|&t| t == point.temperature_c);
            let col = ethanol_percents
                .iter()
                .position(|&e| e == point.ethanol_percent());
            if let (Some(r), Some(c)) = (row, col) {
                cells[r][c] = Some(point.predicted_yield);
            }
        }

        Self {
            temperatures,
            ethanol_percents,
            cells,
        }
    }

    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    pub fn ethanol_percents(&self) -> &[f64] {
        &self.ethanol_percents
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get(row)?.get(col).copied().flatten()
    }

    /// Smallest and largest cell values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    fn normalized(&self, value: f64) -> f64 {
        match self.value_range() {
            Some((lo, hi)) if hi > lo => ((value - lo) / (hi - lo)).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    fn shade(&self, value: f64) -> char {
        let idx = (self.normalized(value) * (SHADES.len() - 1) as f64).round() as usize;
        SHADES[idx.min(SHADES.len() - 1)]
    }

    pub fn render_text(&self) -> String {
        let mut lines = vec![TITLE.to_string(), String::new()];

        let mut header = format!("{:>14}", "T(°C) \\ EtOH%");
        for e in &self.ethanol_percents {
            header.push_str(&format!("{e:>9.1}"));
        }
        lines.push(header);

        for (r, &t) in self.temperatures.iter().enumerate() {
            let mut line = format!("{:>14}", format_temperature(t));
            for c in 0..self.ethanol_percents.len() {
                match self.cell(r, c) {
                    Some(v) => line.push_str(&format!("  {}{v:>6.1}", self.shade(v))),
                    None => line.push_str(&format!("{:>9}", "-")),
                }
            }
            lines.push(line);
        }

        if let Some((lo, hi)) = self.value_range() {
            lines.push(String::new());
            lines.push(format!(
                "Shading: '{}' = {lo:.1}  ...  '{}' = {hi:.1}",
                SHADES[0],
                SHADES[SHADES.len() - 1]
            ));
        }
        lines.join("\n")
    }

    pub fn render_svg(&self) -> String {
        let cols = self.ethanol_percents.len() as f64;
        let rows = self.temperatures.len() as f64;
        let width = MARGIN_LEFT + cols * CELL_W + MARGIN_RIGHT;
        let height = MARGIN_TOP + rows * CELL_H + MARGIN_BOTTOM;

        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
             viewBox=\"0 0 {width} {height}\" font-family=\"sans-serif\">\n"
        );
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"30\" text-anchor=\"middle\" font-size=\"15\">{}</text>\n",
            width / 2.0,
            escape(TITLE)
        ));

        for (r, &t) in self.temperatures.iter().enumerate() {
            let y = MARGIN_TOP + r as f64 * CELL_H;
            svg.push_str(&format!(
                "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"12\">{}</text>\n",
                MARGIN_LEFT - 8.0,
                y + CELL_H / 2.0 + 4.0,
                format_temperature(t)
            ));
            for c in 0..self.ethanol_percents.len() {
                let x = MARGIN_LEFT + c as f64 * CELL_W;
                let Some(v) = self.cell(r, c) else {
                    continue;
                };
                let level = self.normalized(v);
                let [red, green, blue] = viridis(level);
                let ink = if level < 0.5 { "#ffffff" } else { "#000000" };
                svg.push_str(&format!(
                    "  <rect x=\"{x}\" y=\"{y}\" width=\"{CELL_W}\" height=\"{CELL_H}\" \
                     fill=\"rgb({red},{green},{blue})\"/>\n"
                ));
                svg.push_str(&format!(
                    "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" \
                     fill=\"{ink}\">{v:.1}</text>\n",
                    x + CELL_W / 2.0,
                    y + CELL_H / 2.0 + 4.0
                ));
            }
        }

        let axis_y = MARGIN_TOP + rows * CELL_H;
        for (c, e) in self.ethanol_percents.iter().enumerate() {
            svg.push_str(&format!(
                "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\">{e:.1}</text>\n",
                MARGIN_LEFT + c as f64 * CELL_W + CELL_W / 2.0,
                axis_y + 18.0
            ));
        }
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"13\">Ethanol %</text>\n",
            MARGIN_LEFT + cols * CELL_W / 2.0,
            axis_y + 45.0
        ));
        let label_y = MARGIN_TOP + rows * CELL_H / 2.0;
        svg.push_str(&format!(
            "  <text x=\"25\" y=\"{label_y}\" text-anchor=\"middle\" font-size=\"13\" \
             transform=\"rotate(-90 25 {label_y})\">Temperature (°C)</text>\n"
        ));
        svg.push_str("</svg>\n");
        svg
    }

    pub fn save_svg(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.render_svg()).map_err(|e| ReportError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        info!(path = %path.display(), "Heatmap written.");
        Ok(())
    }
}

fn viridis(level: f64) -> [u8; 3] {
    let level = level.clamp(0.0, 1.0);
    for pair in VIRIDIS.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if level <= t1 {
            let f = (level - t0) / (t1 - t0);
            let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
            return [lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2])];
        }
    }
    VIRIDIS[VIRIDIS.len() - 1].1
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grid::GridPoint;
    use tempfile::tempdir;

    fn grid() -> GridResults {
        let mut points = Vec::new();
        for t in [30.0, 40.0] {
            for e in [0.0, 0.5, 1.0] {
                points.push(GridPoint {
                    temperature_c: t,
                    ethanol_fraction: e,
                    water_fraction: 1.0 - e,
                    solvent_polarity: 0.0,
                    predicted_yield: t + e * 10.0,
                });
            }
        }
        GridResults::from_points(points).unwrap()
    }

    #[test]
    fn pivot_places_each_point() {
        let map = Heatmap::from_grid(&grid());
        assert_eq!(map.temperatures(), &[30.0, 40.0]);
        assert_eq!(map.ethanol_percents(), &[0.0, 50.0, 100.0]);
        assert_eq!(map.cell(0, 0), Some(30.0));
        assert_eq!(map.cell(1, 2), Some(50.0));
        assert_eq!(map.cell(2, 0), None);
        assert_eq!(map.value_range(), Some((30.0, 50.0)));
    }

    #[test]
    fn text_rendering_shows_rows_columns_and_values() {
        let text = Heatmap::from_grid(&grid()).render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], TITLE);
        assert!(lines[2].contains("0.0") && lines[2].contains("100.0"));
        assert!(lines[3].trim_start().starts_with("30"));
        assert!(lines[3].contains(" 35.0"));
        assert!(lines[4].contains("@  50.0"));
        assert!(lines[3].contains("   30.0"));
    }

    #[test]
    fn constant_grid_uses_lightest_shade() {
        let points = vec![GridPoint {
            temperature_c: 50.0,
            ethanol_fraction: 0.5,
            water_fraction: 0.5,
            solvent_polarity: 52.2,
            predicted_yield: 80.0,
        }];
        let map = Heatmap::from_grid(&GridResults::from_points(points).unwrap());
        assert_eq!(map.shade(80.0), ' ');
    }

    #[test]
    fn colormap_endpoints_match_viridis() {
        assert_eq!(viridis(0.0), [68, 1, 84]);
        assert_eq!(viridis(1.0), [253, 231, 37]);
        assert_eq!(viridis(0.5), [33, 145, 140]);
    }

    #[test]
    fn svg_contains_one_rect_per_cell_and_annotations() {
        let svg = Heatmap::from_grid(&grid()).render_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 6);
        assert!(svg.contains(">45.0</text>"));
        assert!(svg.contains(">Temperature (°C)</text>"));
        assert!(svg.contains(">Ethanol %</text>"));
    }

    #[test]
    fn save_svg_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heatmap.svg");
        Heatmap::from_grid(&grid()).save_svg(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(TITLE));
    }
}
