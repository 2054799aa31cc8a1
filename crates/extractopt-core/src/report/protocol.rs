use super::format_temperature;
use crate::workflows::optimize::OptimizationResult;

const HEADER: &str = "Optimized Extraction Protocol";

/// Renders the extraction protocol for the optimal grid point.
pub fn render(result: &OptimizationResult) -> String {
    let best = result.grid.optimum();
    let temperature = format_temperature(best.temperature_c);

    let mut lines = vec![
        HEADER.to_string(),
        "-".repeat(HEADER.len()),
        format!(
            "Compound: {} (SMILES: {})",
            result.target.name, result.target.smiles
        ),
        format!("Optimal Temperature: {temperature}°C"),
        format!(
            "Optimal Solvent Mix: Ethanol {:.1}%, Water {:.1}%",
            best.ethanol_percent(),
            best.water_percent()
        ),
        format!("Predicted Yield: {:.1}%", best.predicted_yield),
        String::new(),
        "Steps:".to_string(),
    ];
    let steps = [
        "Prepare raw material (e.g., dried lavender flowers) and grind to increase surface area."
            .to_string(),
        "Mix with solvent (ethanol:water as above) at a 1:5 material:solvent ratio.".to_string(),
        format!("Heat to {temperature}°C in a reflux setup for 2–4 hours."),
        "Filter the extract and evaporate solvent under reduced pressure.".to_string(),
        "Store extract in a dark, airtight container at <10°C to preserve volatiles.".to_string(),
    ];
    lines.extend(
        steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {step}", i + 1)),
    );

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::Compound;
    use crate::core::descriptors::DescriptorSet;
    use crate::engine::grid::{GridPoint, GridResults};

    fn result_with_optimum(temperature_c: f64, ethanol_fraction: f64, yield_percent: f64) -> OptimizationResult {
        let point = GridPoint {
            temperature_c,
            ethanol_fraction,
            water_fraction: 1.0 - ethanol_fraction,
            solvent_polarity: 0.0,
            predicted_yield: yield_percent,
        };
        OptimizationResult {
            target: Compound::new("Linalool", "CC(C)=CCCC(C)(O)C=C"),
            formula: "C10H18O".into(),
            descriptors: DescriptorSet {
                molecular_weight: 154.25,
                log_p: 2.67,
                polarizability: 70.0,
                h_bond_donors: 1,
                h_bond_acceptors: 1,
            },
            training_rows: 9,
            dropped_rows: Vec::new(),
            grid: GridResults::from_points(vec![point]).unwrap(),
        }
    }

    #[test]
    fn protocol_lists_conditions_and_steps() {
        let text = render(&result_with_optimum(50.0, 0.75, 86.123));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Optimized Extraction Protocol");
        assert_eq!(lines[1], "-----------------------------");
        assert_eq!(lines[2], "Compound: Linalool (SMILES: CC(C)=CCCC(C)(O)C=C)");
        assert_eq!(lines[3], "Optimal Temperature: 50°C");
        assert_eq!(lines[4], "Optimal Solvent Mix: Ethanol 75.0%, Water 25.0%");
        assert_eq!(lines[5], "Predicted Yield: 86.1%");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "Steps:");
        assert_eq!(lines.len(), 13);
        assert_eq!(
            lines[10],
            "3. Heat to 50°C in a reflux setup for 2–4 hours."
        );
        assert!(lines[12].starts_with("5. Store extract"));
    }

    #[test]
    fn fractional_temperature_is_kept() {
        let text = render(&result_with_optimum(42.5, 0.0, 80.0));
        assert!(text.contains("Optimal Temperature: 42.5°C"));
        assert!(text.contains("Ethanol 0.0%, Water 100.0%"));
    }
}
