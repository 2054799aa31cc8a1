use crate::cli::DescriptorsArgs;
use crate::error::{CliError, Result};
use extractopt::core::descriptors::DescriptorSet;
use extractopt::core::io::smiles;
use extractopt::engine::error::EngineError;
use tracing::info;

pub fn run(args: DescriptorsArgs) -> Result<()> {
    for input in &args.smiles {
        println!("{}", describe(input)?);
    }
    Ok(())
}

/// Formula and descriptor block for one SMILES string.
fn describe(input: &str) -> Result<String> {
    let mol = smiles::parse(input).map_err(|source| CliError::InvalidSmiles {
        smiles: input.to_string(),
        source: EngineError::InvalidStructure {
            name: input.to_string(),
            smiles: input.to_string(),
            source,
        },
    })?;
    let descriptors = DescriptorSet::compute(&mol);
    info!("Computed descriptors for {}", input);

    let mut lines = vec![
        format!("SMILES: {}", input),
        format!("  Formula: {}", mol.formula()),
    ];
    for (name, value) in DescriptorSet::NAMES.iter().zip(descriptors.values()) {
        lines.push(format!("  {:<16} {:>10.4}", format!("{}:", name), value));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_ethanol() {
        let text = describe("CCO").unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "SMILES: CCO");
        assert_eq!(lines[1], "  Formula: C2H6O");
        assert_eq!(lines.len(), 7);
        assert!(lines[2].starts_with("  MolecularWeight:"));
        assert!(lines[5].trim_end().ends_with("1.0000"));
        assert!(lines[6].trim_end().ends_with("1.0000"));
    }

    #[test]
    fn invalid_smiles_fails_the_command() {
        let args = DescriptorsArgs {
            smiles: vec!["CCO".into(), "InvalidSMILES".into()],
        };
        let err = run(args).unwrap_err();
        assert!(matches!(err, CliError::InvalidSmiles { ref smiles, .. } if smiles == "InvalidSMILES"));
        assert_eq!(err.to_string(), "Invalid SMILES provided");
    }
}
