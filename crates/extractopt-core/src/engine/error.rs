use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::smiles::SmilesError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid SMILES provided for '{name}' ({smiles}): {source}")]
    InvalidStructure {
        name: String,
        smiles: String,
        source: SmilesError,
    },

    #[error("No training rows left after assembly ({dropped} of {total} experiment(s) dropped)")]
    EmptyTrainingSet { total: usize, dropped: usize },

    #[error("The search grid contains no points")]
    EmptyGrid,

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}
