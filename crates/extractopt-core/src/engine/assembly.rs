use super::features::{FeatureTable, FeatureVector, TrainingRow};
use crate::core::data::Dataset;
use crate::core::descriptors::{self, DescriptorSet};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The experiment names a compound that is not in the compound list.
    UnknownCompound,
    /// The compound's SMILES could not be parsed.
    NoDescriptors,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCompound => f.write_str("unknown compound"),
            Self::NoDescriptors => f.write_str("no descriptors"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRow {
    /// Position of the experiment in the input list.
    pub index: usize,
    pub compound: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub table: FeatureTable,
    pub dropped: Vec<DroppedRow>,
}

/// Joins compound descriptors onto experiment rows.
///
/// Descriptors are computed once per compound name (the first entry wins when a
/// name repeats). Rows keep experiment order; rows whose compound has no
/// descriptors are dropped and listed in [`Assembly::dropped`].
pub fn assemble(dataset: &Dataset) -> Assembly {
    let mut by_name: HashMap<&str, Option<DescriptorSet>> = HashMap::new();
    for compound in &dataset.compounds {
        by_name
            .entry(compound.name.as_str())
            .or_insert_with(|| {
                let computed = descriptors::from_smiles(&compound.smiles);
                if computed.is_none() {
                    warn!(
                        compound = %compound.name,
                        smiles = %compound.smiles,
                        "Compound has an unparsable SMILES; its experiments will be dropped."
                    );
                }
                computed
            });
    }

    let mut table = FeatureTable::new();
    let mut dropped = Vec::new();
    for (index, record) in dataset.experiments.iter().enumerate() {
        let reason = match by_name.get(record.compound.as_str()) {
            Some(Some(descriptors)) => {
                table.push(TrainingRow {
                    compound: record.compound.clone(),
                    features: FeatureVector::new(
                        descriptors,
                        record.temperature_c,
                        record.solvent_polarity,
                    ),
                    yield_percent: record.yield_percent,
                });
                continue;
            }
            Some(None) => DropReason::NoDescriptors,
            None => DropReason::UnknownCompound,
        };
        debug!(index, compound = %record.compound, %reason, "Dropping experiment row.");
        dropped.push(DroppedRow {
            index,
            compound: record.compound.clone(),
            reason,
        });
    }

    if !dropped.is_empty() {
        warn!(
            dropped = dropped.len(),
            total = dataset.experiments.len(),
            "Some experiment rows have no usable descriptors."
        );
    }
    info!(rows = table.len(), "Training table assembled.");
    Assembly { table, dropped }
}
