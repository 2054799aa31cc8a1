use crate::core::data::Compound;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// Upper bound on the number of values along either grid axis.
pub const MAX_AXIS_POINTS: usize = 10_000;

/// Layout of the temperature x ethanol-fraction search grid.
///
/// Temperatures run from `temperature_start` up to and including
/// `temperature_stop` in increments of `temperature_step`. Ethanol fractions are
/// `ethanol_points` evenly spaced values over `[0, 1]`, both ends included.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    pub temperature_start: f64,
    pub temperature_stop: f64,
    pub temperature_step: f64,
    pub ethanol_points: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            temperature_start: 30.0,
            temperature_stop: 70.0,
            temperature_step: 10.0,
            ethanol_points: 5,
        }
    }
}

impl GridSpec {
    pub fn temperatures(&self) -> Vec<f64> {
        if self.validate().is_err() {
            return Vec::new();
        }
        let count = self.temperature_count() as usize;
        (0..count)
            .map(|i| self.temperature_start + i as f64 * self.temperature_step)
            .collect()
    }

    /// Number of temperatures, kept in floating point so that tiny steps cannot
    /// overflow before `validate` bounds it.
    fn temperature_count(&self) -> f64 {
        // Tolerance keeps the stop value when the step does not divide exactly in binary.
        let tolerance = self.temperature_step * 1e-9;
        ((self.temperature_stop - self.temperature_start + tolerance) / self.temperature_step)
            .floor()
            + 1.0
    }

    pub fn ethanol_fractions(&self) -> Vec<f64> {
        if self.validate().is_err() {
            return Vec::new();
        }
        linspace(0.0, 1.0, self.ethanol_points)
    }

    pub fn len(&self) -> usize {
        self.temperatures().len() * self.ethanol_points
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("grid.temperature-start", self.temperature_start),
            ("grid.temperature-stop", self.temperature_stop),
            ("grid.temperature-step", self.temperature_step),
        ] {
            if !value.is_finite() {
                return Err(invalid(name, format!("{value} is not a finite number")));
            }
        }
        if self.temperature_step <= 0.0 {
            return Err(invalid("grid.temperature-step", "must be positive"));
        }
        if self.temperature_stop < self.temperature_start {
            return Err(invalid(
                "grid.temperature-stop",
                format!(
                    "{} is below the start temperature {}",
                    self.temperature_stop, self.temperature_start
                ),
            ));
        }
        let count = self.temperature_count();
        if !count.is_finite() || count > MAX_AXIS_POINTS as f64 {
            return Err(invalid(
                "grid.temperature-step",
                format!(
                    "{} is too small: the grid would exceed {} temperatures",
                    self.temperature_step, MAX_AXIS_POINTS
                ),
            ));
        }
        if self.ethanol_points == 0 {
            return Err(invalid("grid.ethanol-points", "must be at least 1"));
        }
        if self.ethanol_points > MAX_AXIS_POINTS {
            return Err(invalid(
                "grid.ethanol-points",
                format!("must be at most {}", MAX_AXIS_POINTS),
            ));
        }
        Ok(())
    }
}

/// `n` evenly spaced samples over `[start, stop]`; a single sample is `start`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        stop
                    } else {
                        start + i as f64 * step
                    }
                })
                .collect()
        }
    }
}

/// Hyperparameters of the bagged regression-tree ensemble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub seed: u64,
    /// `None` grows every tree until its leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_estimators == 0 {
            return Err(invalid("model.trees", "must be at least 1"));
        }
        if self.max_depth == Some(0) {
            return Err(invalid("model.max-depth", "must be at least 1"));
        }
        if self.min_samples_split < 2 {
            return Err(invalid("model.min-samples-split", "must be at least 2"));
        }
        if self.min_samples_leaf == 0 {
            return Err(invalid("model.min-samples-leaf", "must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationConfig {
    pub target: Compound,
    pub grid: GridSpec,
    pub forest: ForestParams,
}

#[derive(Default)]
pub struct OptimizationConfigBuilder {
    target_name: Option<String>,
    target_smiles: Option<String>,
    grid: Option<GridSpec>,
    forest: Option<ForestParams>,
}

impl OptimizationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }
    pub fn target_smiles(mut self, smiles: impl Into<String>) -> Self {
        self.target_smiles = Some(smiles.into());
        self
    }
    pub fn target(self, compound: &Compound) -> Self {
        self.target_name(compound.name.clone())
            .target_smiles(compound.smiles.clone())
    }
    pub fn grid(mut self, grid: GridSpec) -> Self {
        self.grid = Some(grid);
        self
    }
    pub fn forest(mut self, params: ForestParams) -> Self {
        self.forest = Some(params);
        self
    }

    pub fn build(self) -> Result<OptimizationConfig, ConfigError> {
        let target = Compound {
            name: self
                .target_name
                .ok_or(ConfigError::MissingParameter("target_name"))?,
            smiles: self
                .target_smiles
                .ok_or(ConfigError::MissingParameter("target_smiles"))?,
        };
        let grid = self.grid.unwrap_or_default();
        grid.validate()?;
        let forest = self.forest.unwrap_or_default();
        forest.validate()?;

        Ok(OptimizationConfig {
            target,
            grid,
            forest,
        })
    }
}
