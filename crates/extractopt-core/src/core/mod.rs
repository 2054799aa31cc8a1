//! # Core Module
//!
//! Fundamental building blocks of the extraction optimizer.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Element table and the molecular graph
//! - **File I/O** ([`io`]) - Reading linear structure notations (SMILES)
//! - **Descriptors** ([`descriptors`]) - Physicochemical descriptors derived from a graph
//! - **Solvents** ([`solvent`]) - Closed solvent vocabulary and the polarity estimate
//! - **Reference Data** ([`data`]) - Compound and experiment records
//!
//! Everything in this module is deterministic and free of global state.

pub mod data;
pub mod descriptors;
pub mod io;
pub mod models;
pub mod solvent;
