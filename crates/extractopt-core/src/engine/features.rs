use crate::core::descriptors::DescriptorSet;

pub const N_FEATURES: usize = 7;

/// Column order shared by training and prediction.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "MolecularWeight",
    "LogP",
    "Polarizability",
    "NumHDonors",
    "NumHAcceptors",
    "Temperature_C",
    "Solvent_Polarity",
];

pub const TEMPERATURE: usize = 5;
pub const SOLVENT_POLARITY: usize = 6;

/// Descriptors followed by the process conditions, in [`FEATURE_NAMES`] order.
///
/// The only constructor takes the named inputs, so a vector with a different
/// column order cannot be built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    pub fn new(descriptors: &DescriptorSet, temperature_c: f64, solvent_polarity: f64) -> Self {
        let [mw, log_p, polarizability, donors, acceptors] = descriptors.values();
        Self([
            mw,
            log_p,
            polarizability,
            donors,
            acceptors,
            temperature_c,
            solvent_polarity,
        ])
    }

    #[inline]
    pub fn get(&self, feature: usize) -> f64 {
        self.0[feature]
    }

    pub fn values(&self) -> &[f64; N_FEATURES] {
        &self.0
    }

    pub fn named(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| self.0[i])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub compound: String,
    pub features: FeatureVector,
    pub yield_percent: f64,
}

/// Feature matrix plus targets, one row per usable experiment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<TrainingRow>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: TrainingRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[TrainingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn features(&self) -> Vec<FeatureVector> {
        self.rows.iter().map(|r| r.features).collect()
    }

    pub fn targets(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.yield_percent).collect()
    }
}
