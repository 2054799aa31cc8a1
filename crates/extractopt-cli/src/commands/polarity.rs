use crate::cli::PolarityArgs;
use crate::error::{CliError, Result};
use extractopt::core::solvent::{SolventMixture, estimate_polarity};
use tracing::debug;

pub fn run(args: PolarityArgs) -> Result<()> {
    let mixtures = collect_mixtures(&args)?;
    for (label, mixture) in &mixtures {
        let polarity = estimate_polarity(mixture);
        debug!(?mixture, polarity, "Estimated solvent polarity.");
        println!("{:<28} polarity {:.2}", label, polarity);
    }
    Ok(())
}

/// Labelled mixtures in argument order, followed by the explicit-fraction
/// mixture when any fraction flag is given.
fn collect_mixtures(args: &PolarityArgs) -> Result<Vec<(String, SolventMixture)>> {
    let mut mixtures = args
        .labels
        .iter()
        .map(|label| {
            SolventMixture::from_label(label)
                .map(|m| (label.clone(), m))
                .map_err(|e| CliError::Argument(e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    if args.has_explicit_fractions() {
        let mixture = SolventMixture::new(
            args.ethanol.unwrap_or(0.0),
            args.water.unwrap_or(0.0),
            args.hexane.unwrap_or(0.0),
        );
        mixtures.push((mixture.label(), mixture));
    }

    if mixtures.is_empty() {
        return Err(CliError::Argument(
            "Provide a mixture label or at least one of --ethanol, --water, --hexane.".to_string(),
        ));
    }
    Ok(mixtures)
}
