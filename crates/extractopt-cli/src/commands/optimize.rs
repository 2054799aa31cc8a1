use crate::cli::OptimizeArgs;
use crate::config::{PartialRunConfig, RunSettings};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use extractopt::{
    core::data::Dataset,
    engine::{config::OptimizationConfigBuilder, error::EngineError, progress::ProgressReporter},
    report::{heatmap::Heatmap, protocol, results},
    workflows,
};
use tracing::{info, warn};

pub fn run(args: OptimizeArgs, show_progress: bool) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialRunConfig::from_file(path)?,
        None => PartialRunConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let settings = partial_config.merge_with_cli(&args)?;

    let dataset = load_dataset(&settings)?;
    let target = settings.target.resolve(&dataset)?;
    info!(
        "Target compound: {} ({}), {} experiment record(s) available.",
        target.name,
        target.smiles,
        dataset.experiments.len()
    );

    let config = OptimizationConfigBuilder::new()
        .target(&target)
        .grid(settings.grid.clone())
        .forest(settings.forest.clone())
        .build()?;

    let progress_handler = if show_progress {
        CliProgressHandler::new()
    } else {
        CliProgressHandler::hidden()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the optimization workflow...");
    let result = workflows::optimize::run(&dataset, &config, &reporter).map_err(|e| match e {
        EngineError::InvalidStructure { .. } => CliError::InvalidSmiles {
            smiles: target.smiles.clone(),
            source: e,
        },
        other => CliError::Engine(other),
    })?;
    if !result.dropped_rows.is_empty() {
        warn!(
            "{} experiment row(s) were excluded from training.",
            result.dropped_rows.len()
        );
    }

    println!();
    print!("{}", protocol::render(&result));

    let heatmap = Heatmap::from_grid(&result.grid);
    if settings.output.show_heatmap {
        println!();
        println!("{}", heatmap.render_text());
    }
    if let Some(svg_path) = &settings.output.heatmap_svg {
        heatmap.save_svg(svg_path)?;
        println!("\nHeatmap saved to '{}'", svg_path.display());
    }

    results::save_csv(&result.grid, &settings.output.csv_path)?;
    println!(
        "\nResults saved to '{}'",
        settings.output.csv_path.display()
    );

    Ok(())
}

fn load_dataset(settings: &RunSettings) -> Result<Dataset> {
    let Some(path) = &settings.dataset_path else {
        info!("Using the built-in reference dataset.");
        return Ok(Dataset::builtin());
    };
    info!("Loading dataset from {:?}", path);
    let dataset = Dataset::load(path).map_err(|e| CliError::FileParsing {
        path: path.clone(),
        source: e.into(),
    })?;
    if dataset.is_empty() {
        warn!("Dataset {:?} contains no experiment records.", path);
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args_in(dir: &std::path::Path) -> OptimizeArgs {
        OptimizeArgs {
            output: Some(dir.join("results.csv")),
            no_heatmap: true,
            trees: Some(10),
            ..OptimizeArgs::default()
        }
    }

    #[test]
    fn default_run_writes_twenty_five_rows() {
        let dir = tempdir().unwrap();
        let args = OptimizeArgs {
            heatmap_svg: Some(dir.path().join("heatmap.svg")),
            ..args_in(dir.path())
        };
        run(args, false).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join("results.csv")).unwrap();
        assert_eq!(
            reader.headers().unwrap().iter().collect::<Vec<_>>(),
            vec![
                "Temperature_C",
                "Ethanol_Percent",
                "Water_Percent",
                "Solvent_Polarity",
                "Predicted_Yield"
            ]
        );
        assert_eq!(reader.records().count(), 25);
        assert!(dir.path().join("heatmap.svg").exists());
    }

    #[test]
    fn invalid_target_smiles_is_reported_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let args = OptimizeArgs {
            smiles: Some("InvalidSMILES".into()),
            ..args_in(dir.path())
        };
        let err = run(args, false).unwrap_err();
        assert!(matches!(err, CliError::InvalidSmiles { .. }));
        assert_eq!(err.to_string(), "Invalid SMILES provided");
        assert!(!dir.path().join("results.csv").exists());
    }

    #[test]
    fn dataset_file_is_used_for_training() {
        let dir = tempdir().unwrap();
        let dataset_path = dir.path().join("isolates.toml");
        fs::write(
            &dataset_path,
            r#"
            [[compound]]
            name = "Ethanol"
            smiles = "CCO"

            [[experiment]]
            compound = "Ethanol"
            temperature_c = 40.0
            solvent_mix = "Water 100"
            solvent_polarity = 80.1
            yield_percent = 60.0

            [[experiment]]
            compound = "Ethanol"
            temperature_c = 60.0
            solvent_mix = "Water 100"
            solvent_polarity = 80.1
            yield_percent = 70.0
            "#,
        )
        .unwrap();

        let args = OptimizeArgs {
            dataset: Some(dataset_path),
            name: Some("Ethanol".into()),
            ..args_in(dir.path())
        };
        run(args, false).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join("results.csv")).unwrap();
        for record in reader.records() {
            let yield_value: f64 = record.unwrap()[4].parse().unwrap();
            assert!((60.0..=70.0).contains(&yield_value));
        }
    }

    #[test]
    fn unreadable_dataset_is_a_parsing_error() {
        let dir = tempdir().unwrap();
        let dataset_path = dir.path().join("broken.toml");
        fs::write(&dataset_path, "[[compound]]\nname = 3\n").unwrap();
        let args = OptimizeArgs {
            dataset: Some(dataset_path),
            ..args_in(dir.path())
        };
        assert!(matches!(
            run(args, false),
            Err(CliError::FileParsing { .. })
        ));
    }
}
