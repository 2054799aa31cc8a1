use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Compound {
    pub name: String,
    pub smiles: String,
}

impl Compound {
    pub fn new(name: impl Into<String>, smiles: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            smiles: smiles.into(),
        }
    }
}

/// One observed extraction run.
///
/// `solvent_polarity` is recorded as measured and is not recomputed from
/// `solvent_mix`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentRecord {
    pub compound: String,
    pub temperature_c: f64,
    pub solvent_mix: String,
    pub solvent_polarity: f64,
    pub yield_percent: f64,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Compounds and the experiments run on them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    #[serde(default, rename = "compound")]
    pub compounds: Vec<Compound>,
    #[serde(default, rename = "experiment")]
    pub experiments: Vec<ExperimentRecord>,
}

pub const LINALOOL: &str = "Linalool";

#[rustfmt::skip]
const BUILTIN_COMPOUNDS: [(&str, &str); 3] = [
    (LINALOOL,   "CC(C)=CCCC(C)(O)C=C"),
    ("Limonene", "CC1=CC[C@@H](CC1)C(=C)C"),
    ("Geraniol", "CC(C)=CCCC(C)=CCO"),
];

const BUILTIN_TEMPERATURES: [f64; 3] = [40.0, 50.0, 60.0];
const BUILTIN_MIXES: [&str; 3] = ["Ethanol:Water 70:30", "Hexane 100", "Ethanol 100"];
const BUILTIN_POLARITIES: [f64; 3] = [32.7, 24.3, 24.3];
const BUILTIN_YIELDS: [f64; 9] = [85.0, 80.0, 88.0, 90.0, 85.0, 82.0, 78.0, 75.0, 80.0];

impl Dataset {
    /// The illustrative reference data: three terpenoids and nine runs.
    ///
    /// Runs are grouped in blocks of three per compound, in compound order. Within
    /// each block the temperature, mixture and polarity patterns repeat.
    pub fn builtin() -> Self {
        let compounds = BUILTIN_COMPOUNDS
            .iter()
            .map(|&(name, smiles)| Compound::new(name, smiles))
            .collect::<Vec<_>>();

        let experiments = BUILTIN_YIELDS
            .iter()
            .enumerate()
            .map(|(i, &yield_percent)| ExperimentRecord {
                compound: compounds[i / 3].name.clone(),
                temperature_c: BUILTIN_TEMPERATURES[i % 3],
                solvent_mix: BUILTIN_MIXES[i % 3].to_string(),
                solvent_polarity: BUILTIN_POLARITIES[i % 3],
                yield_percent,
            })
            .collect();

        Self {
            compounds,
            experiments,
        }
    }

    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, DatasetError> {
        toml::from_str(content).map_err(|e| DatasetError::Toml {
            path: origin.to_string(),
            source: e,
        })
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.to_string_lossy())
    }

    pub fn compound(&self, name: &str) -> Option<&Compound> {
        self.compounds.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }
}
