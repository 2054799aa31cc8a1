//! # Extractopt Core Library
//!
//! Estimates extraction-protocol parameters (temperature and ethanol/water ratio)
//! that maximize the predicted yield of a botanical aromatic compound.
//!
//! ## Architectural Philosophy
//!
//! The library follows a layered architecture so that each stage of the pipeline
//! can be tested on its own:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Molecule`, `SolventMixture`,
//!   compound and experiment records), the SMILES reader and the descriptor calculator.
//!
//! - **[`engine`]: The Logic Core.** Feature assembly, the bagged regression-tree
//!   predictor and the grid search, plus configuration, errors and progress reporting.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together into the
//!   end-to-end optimization run.
//!
//! - **[`report`]: Output.** Protocol text, heatmap rendering and the results table.

pub mod core;
pub mod engine;
pub mod report;
pub mod workflows;
