//! Readers for linear structure notations.

pub mod smiles;
