//! # Engine Module
//!
//! The computational pipeline between raw records and an optimized protocol.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Grid layout, ensemble parameters and the target compound
//! - **Features** ([`features`]) - The fixed-order feature vector shared by training and prediction
//! - **Assembly** ([`assembly`]) - Joining descriptors onto experiment records
//! - **Prediction** ([`forest`]) - Bagged regression trees behind the [`forest::YieldModel`] seam
//! - **Search** ([`grid`]) - Exhaustive evaluation of the temperature/ethanol grid
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! The trained model is an ordinary value passed to the search; nothing here keeps
//! global state.

pub mod assembly;
pub mod config;
pub mod error;
pub mod features;
pub mod forest;
pub mod grid;
pub mod progress;
