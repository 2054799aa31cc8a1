//! # Workflows Module
//!
//! High-level entry points that run the complete pipeline.
//!
//! - **Optimization Workflow** ([`optimize`]) - Descriptors for the target, training-table
//!   assembly, model fitting and the grid search, in that order.

pub mod optimize;
