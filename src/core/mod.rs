//! Core domain models shared across the validation and simulation layers.

pub mod domain;

pub use domain::{ObjectiveWeights, Resolution, TargetPoint};
