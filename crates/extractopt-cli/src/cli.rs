use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Extractopt Contributors",
    version,
    about = "Extractopt - predicts the extraction temperature and ethanol/water ratio that maximize the yield of a botanical aromatic compound.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to run. Defaults to `optimize` with built-in data and settings.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the yield model and search for the best extraction conditions.
    Optimize(OptimizeArgs),
    /// Print the molecular descriptors used as model features.
    Descriptors(DescriptorsArgs),
    /// Estimate the polarity of solvent mixtures.
    Polarity(PolarityArgs),
}

/// Arguments for the `optimize` subcommand.
#[derive(Args, Debug, Default)]
pub struct OptimizeArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Target ---
    /// SMILES of the compound to optimize for.
    #[arg(long, value_name = "SMILES")]
    pub smiles: Option<String>,

    /// Name of the target compound. Without --smiles it must name a compound in the dataset.
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Compound and experiment records in TOML format. Defaults to the built-in data.
    #[arg(short, long, value_name = "PATH")]
    pub dataset: Option<PathBuf>,

    // --- Model ---
    /// Number of trees in the ensemble.
    #[arg(long, value_name = "INT")]
    pub trees: Option<usize>,

    /// Seed for bootstrap resampling.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Maximum depth of each tree. Unlimited by default.
    #[arg(long, value_name = "INT")]
    pub max_depth: Option<usize>,

    // --- Grid ---
    /// Lowest temperature of the grid, in °C.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub temp_start: Option<f64>,

    /// Highest temperature of the grid, in °C (inclusive).
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub temp_stop: Option<f64>,

    /// Temperature increment, in °C.
    #[arg(long, value_name = "FLOAT")]
    pub temp_step: Option<f64>,

    /// Number of evenly spaced ethanol fractions between 0 and 1.
    #[arg(long, value_name = "INT")]
    pub ethanol_points: Option<usize>,

    // --- Output ---
    /// Path of the results CSV.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also write the heatmap as an SVG file.
    #[arg(long, value_name = "PATH")]
    pub heatmap_svg: Option<PathBuf>,

    /// Do not print the heatmap to the terminal.
    #[arg(long)]
    pub no_heatmap: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S model.trees=200
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `descriptors` subcommand.
#[derive(Args, Debug)]
pub struct DescriptorsArgs {
    /// One or more SMILES strings.
    #[arg(required = true, value_name = "SMILES")]
    pub smiles: Vec<String>,
}

/// Arguments for the `polarity` subcommand.
#[derive(Args, Debug)]
pub struct PolarityArgs {
    /// Mixture labels such as "Ethanol:Water 70:30" or "Hexane 100".
    #[arg(value_name = "LABEL")]
    pub labels: Vec<String>,

    /// Ethanol fraction of an explicit mixture.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub ethanol: Option<f64>,

    /// Water fraction of an explicit mixture.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub water: Option<f64>,

    /// Hexane fraction of an explicit mixture.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub hexane: Option<f64>,
}

impl PolarityArgs {
    pub fn has_explicit_fractions(&self) -> bool {
        self.ethanol.is_some() || self.water.is_some() || self.hexane.is_some()
    }
}
