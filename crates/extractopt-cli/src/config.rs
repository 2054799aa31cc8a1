use crate::cli::OptimizeArgs;
use crate::error::{CliError, Result};
use extractopt::core::data::{Compound, Dataset, LINALOOL};
use extractopt::engine::config::{ForestParams, GridSpec};
use extractopt::report::results::DEFAULT_RESULTS_FILE;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Name given to a target that is only known by its SMILES.
pub const CUSTOM_TARGET_NAME: &str = "Target Compound";

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialTargetConfig {
    name: Option<String>,
    smiles: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialGridConfig {
    #[serde(rename = "temperature-start")]
    temperature_start: Option<f64>,
    #[serde(rename = "temperature-stop")]
    temperature_stop: Option<f64>,
    #[serde(rename = "temperature-step")]
    temperature_step: Option<f64>,
    #[serde(rename = "ethanol-points")]
    ethanol_points: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialModelConfig {
    trees: Option<usize>,
    seed: Option<u64>,
    #[serde(rename = "max-depth")]
    max_depth: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    results: Option<PathBuf>,
    #[serde(rename = "heatmap-svg")]
    heatmap_svg: Option<PathBuf>,
    #[serde(rename = "show-heatmap")]
    show_heatmap: Option<bool>,
}

/// The `optimize` settings as read from a TOML file. Every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    dataset: Option<PathBuf>,
    target: Option<PartialTargetConfig>,
    grid: Option<PartialGridConfig>,
    model: Option<PartialModelConfig>,
    output: Option<PartialOutputConfig>,
}

/// How the target compound was specified.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetSelection {
    /// Name and SMILES are both known.
    Explicit(Compound),
    /// Only a name; the SMILES comes from the dataset.
    Named(String),
}

impl TargetSelection {
    pub fn resolve(&self, dataset: &Dataset) -> Result<Compound> {
        match self {
            Self::Explicit(compound) => Ok(compound.clone()),
            Self::Named(name) => dataset.compound(name).cloned().ok_or_else(|| {
                CliError::Config(format!(
                    "Target compound '{}' is not in the dataset; pass --smiles to use an outside compound.",
                    name
                ))
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputOptions {
    pub csv_path: PathBuf,
    pub heatmap_svg: Option<PathBuf>,
    pub show_heatmap: bool,
}

/// Fully merged settings for one `optimize` run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// `None` selects the built-in dataset.
    pub dataset_path: Option<PathBuf>,
    pub target: TargetSelection,
    pub grid: GridSpec,
    pub forest: ForestParams,
    pub output: OutputOptions,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Layers command-line flags over file values over built-in defaults.
    /// `-S` overrides are applied to the file values first, so explicit flags
    /// still win over them.
    pub fn merge_with_cli(mut self, args: &OptimizeArgs) -> Result<RunSettings> {
        self.apply_set_values(&args.set_values)?;

        let target_file = self.target.take().unwrap_or_default();
        let grid_file = self.grid.take().unwrap_or_default();
        let model_file = self.model.take().unwrap_or_default();
        let output_file = self.output.take().unwrap_or_default();

        let name = args.name.clone().or(target_file.name);
        let smiles = args.smiles.clone().or(target_file.smiles);
        let target = match (name, smiles) {
            (Some(name), Some(smiles)) => TargetSelection::Explicit(Compound::new(name, smiles)),
            (None, Some(smiles)) => {
                TargetSelection::Explicit(Compound::new(CUSTOM_TARGET_NAME, smiles))
            }
            (Some(name), None) => TargetSelection::Named(name),
            (None, None) => TargetSelection::Named(LINALOOL.to_string()),
        };

        let grid_defaults = GridSpec::default();
        let grid = GridSpec {
            temperature_start: args
                .temp_start
                .or(grid_file.temperature_start)
                .unwrap_or(grid_defaults.temperature_start),
            temperature_stop: args
                .temp_stop
                .or(grid_file.temperature_stop)
                .unwrap_or(grid_defaults.temperature_stop),
            temperature_step: args
                .temp_step
                .or(grid_file.temperature_step)
                .unwrap_or(grid_defaults.temperature_step),
            ethanol_points: args
                .ethanol_points
                .or(grid_file.ethanol_points)
                .unwrap_or(grid_defaults.ethanol_points),
        };
        grid.validate()?;

        let forest_defaults = ForestParams::default();
        let forest = ForestParams {
            n_estimators: args
                .trees
                .or(model_file.trees)
                .unwrap_or(forest_defaults.n_estimators),
            seed: args.seed.or(model_file.seed).unwrap_or(forest_defaults.seed),
            max_depth: args.max_depth.or(model_file.max_depth),
            ..forest_defaults
        };
        forest.validate()?;

        let output = OutputOptions {
            csv_path: args
                .output
                .clone()
                .or(output_file.results)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_FILE)),
            heatmap_svg: args.heatmap_svg.clone().or(output_file.heatmap_svg),
            show_heatmap: !args.no_heatmap && output_file.show_heatmap.unwrap_or(true),
        };

        Ok(RunSettings {
            dataset_path: args.dataset.clone().or(self.dataset),
            target,
            grid,
            forest,
            output,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "dataset" => self.dataset = Some(PathBuf::from(value_str)),
                "target.name" => {
                    self.target.get_or_insert_with(Default::default).name =
                        Some(value_str.to_string());
                }
                "target.smiles" => {
                    self.target.get_or_insert_with(Default::default).smiles =
                        Some(value_str.to_string());
                }
                "grid.temperature-start" => {
                    self.grid
                        .get_or_insert_with(Default::default)
                        .temperature_start = Some(parse_value(key, value_str)?);
                }
                "grid.temperature-stop" => {
                    self.grid.get_or_insert_with(Default::default).temperature_stop =
                        Some(parse_value(key, value_str)?);
                }
                "grid.temperature-step" => {
                    self.grid.get_or_insert_with(Default::default).temperature_step =
                        Some(parse_value(key, value_str)?);
                }
                "grid.ethanol-points" => {
                    self.grid.get_or_insert_with(Default::default).ethanol_points =
                        Some(parse_value(key, value_str)?);
                }
                "model.trees" => {
                    self.model.get_or_insert_with(Default::default).trees =
                        Some(parse_value(key, value_str)?);
                }
                "model.seed" => {
                    self.model.get_or_insert_with(Default::default).seed =
                        Some(parse_value(key, value_str)?);
                }
                "model.max-depth" => {
                    self.model.get_or_insert_with(Default::default).max_depth =
                        Some(parse_value(key, value_str)?);
                }
                "output.results" => {
                    self.output.get_or_insert_with(Default::default).results =
                        Some(PathBuf::from(value_str));
                }
                "output.heatmap-svg" => {
                    self.output.get_or_insert_with(Default::default).heatmap_svg =
                        Some(PathBuf::from(value_str));
                }
                "output.show-heatmap" => {
                    self.output.get_or_insert_with(Default::default).show_heatmap =
                        Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.trim().parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value_str
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn optimize_args(extra: &[&str]) -> OptimizeArgs {
        let mut argv = vec!["extractopt", "optimize"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Some(Commands::Optimize(args)) => args,
            _ => panic!("Expected 'optimize' subcommand"),
        }
    }

    #[test]
    fn defaults_reproduce_the_reference_run() {
        let settings = PartialRunConfig::default()
            .merge_with_cli(&OptimizeArgs::default())
            .unwrap();

        assert_eq!(settings.dataset_path, None);
        assert_eq!(settings.target, TargetSelection::Named(LINALOOL.to_string()));
        assert_eq!(settings.grid, GridSpec::default());
        assert_eq!(settings.forest.n_estimators, 100);
        assert_eq!(settings.forest.seed, 42);
        assert_eq!(settings.forest.max_depth, None);
        assert_eq!(settings.output.csv_path, PathBuf::from(DEFAULT_RESULTS_FILE));
        assert!(settings.output.show_heatmap);
        assert_eq!(settings.output.heatmap_svg, None);
    }

    #[test]
    fn load_from_file_and_merge_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("run.toml");
        fs::write(
            &config_path,
            r#"
            dataset = "isolates.toml"

            [target]
            smiles = "CCOC(C)=O"
            name = "Ethyl acetate"

            [grid]
            temperature-step = 5.0

            [model]
            trees = 25

            [output]
            show-heatmap = false
            "#,
        )
        .unwrap();

        let partial = PartialRunConfig::from_file(&config_path).unwrap();
        let settings = partial.merge_with_cli(&optimize_args(&[])).unwrap();

        assert_eq!(settings.dataset_path, Some(PathBuf::from("isolates.toml")));
        assert_eq!(
            settings.target,
            TargetSelection::Explicit(Compound::new("Ethyl acetate", "CCOC(C)=O"))
        );
        assert_eq!(settings.grid.temperature_step, 5.0);
        assert_eq!(settings.grid.temperatures().len(), 9);
        assert_eq!(settings.forest.n_estimators, 25);
        assert_eq!(settings.forest.seed, 42);
        assert!(!settings.output.show_heatmap);
    }

    #[test]
    fn cli_args_override_file_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("run.toml");
        fs::write(
            &config_path,
            "[model]\ntrees = 25\nseed = 1\n\n[output]\nresults = \"from_file.csv\"\n",
        )
        .unwrap();

        let args = optimize_args(&["--trees", "7", "-o", "from_cli.csv", "--no-heatmap"]);
        let settings = PartialRunConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(settings.forest.n_estimators, 7);
        assert_eq!(settings.forest.seed, 1);
        assert_eq!(settings.output.csv_path, PathBuf::from("from_cli.csv"));
        assert!(!settings.output.show_heatmap);
    }

    #[test]
    fn set_values_override_file_but_not_flags() {
        let args = optimize_args(&[
            "-S",
            "model.trees=30",
            "-S",
            "grid.ethanol-points=3",
            "-S",
            "model.seed=9",
            "--seed",
            "11",
        ]);
        let settings = PartialRunConfig::default().merge_with_cli(&args).unwrap();

        assert_eq!(settings.forest.n_estimators, 30);
        assert_eq!(settings.forest.seed, 11);
        assert_eq!(settings.grid.ethanol_fractions(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn smiles_without_name_gets_a_placeholder_name() {
        let settings = PartialRunConfig::default()
            .merge_with_cli(&optimize_args(&["--smiles", "CCO"]))
            .unwrap();
        assert_eq!(
            settings.target,
            TargetSelection::Explicit(Compound::new(CUSTOM_TARGET_NAME, "CCO"))
        );
    }

    #[test]
    fn named_target_resolves_against_the_dataset() {
        let dataset = Dataset::builtin();
        let geraniol = TargetSelection::Named("Geraniol".into())
            .resolve(&dataset)
            .unwrap();
        assert_eq!(geraniol.smiles, "CC(C)=CCCC(C)=CCO");

        let missing = TargetSelection::Named("Vanillin".into()).resolve(&dataset);
        assert!(matches!(missing, Err(CliError::Config(msg)) if msg.contains("Vanillin")));
    }

    #[test]
    fn invalid_set_values_are_rejected() {
        let bad_format = optimize_args(&["-S", "model.trees"]);
        assert!(matches!(
            PartialRunConfig::default().merge_with_cli(&bad_format),
            Err(CliError::Config(_))
        ));

        let bad_key = optimize_args(&["-S", "model.depth=3"]);
        assert!(matches!(
            PartialRunConfig::default().merge_with_cli(&bad_key),
            Err(CliError::Config(msg)) if msg.contains("model.depth")
        ));

        let bad_value = optimize_args(&["-S", "model.trees=many"]);
        assert!(matches!(
            PartialRunConfig::default().merge_with_cli(&bad_value),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn invalid_grid_is_reported_as_config_error() {
        let args = optimize_args(&["--temp-step", "0"]);
        let result = PartialRunConfig::default().merge_with_cli(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("temperature-step")));
    }

    #[test]
    fn tiny_temperature_step_is_rejected() {
        let args = optimize_args(&["-S", "grid.temperature-step=1e-300"]);
        let result = PartialRunConfig::default().merge_with_cli(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("temperature-step")));

        let args = optimize_args(&["--temp-step", "0.000000001"]);
        assert!(PartialRunConfig::default().merge_with_cli(&args).is_err());
    }

    #[test]
    fn unknown_file_keys_fail_to_parse() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("bad.toml");
        fs::write(&config_path, "[model]\nleaves = 3\n").unwrap();
        assert!(matches!(
            PartialRunConfig::from_file(&config_path),
            Err(CliError::FileParsing { .. })
        ));
    }
}
