//! # Target Uploader Backend
//!
//! Validation and pointing-simulation core for astronomical target-list uploads.
//!
//! This crate implements the server-side engine behind a target uploader for a
//! fiber-fed spectroscopic survey. Proposers upload a tabular target list; the
//! engine validates it against the survey schema and physical-range rules,
//! filters the accepted targets by observability over a semester, and drives a
//! pointing-allocation simulation that estimates the observing time a program
//! would require.
//!
//! ## Architecture
//!
//! - [`schema`]: immutable survey schema (required/optional columns, datatypes,
//!   filter/flux band aliases)
//! - [`validation`]: the staged validation pipeline producing a structured
//!   [`validation::ValidationReport`]
//! - [`visibility`]: semester windows and the ephemeris-backed visibility filter
//! - [`simulation`]: the pointing-optimizer contract and the orchestration that
//!   reduces optimizer output into pointing lists and summary tables
//! - [`core`]: shared domain types (resolution mode, targets, objective weights)
//! - [`config`]: TOML/environment configuration
//! - [`archive`]: provenance metadata stamped onto archived submissions
//!
//! Loading CSV/ECSV uploads into a `polars` DataFrame, rendering reports, and
//! writing archive files are the responsibility of external collaborators; this
//! crate owns everything in between.

pub mod archive;
pub mod config;
pub mod core;
pub mod schema;
pub mod simulation;
pub mod validation;
pub mod visibility;

pub use crate::core::domain::{ObjectiveWeights, Resolution, TargetPoint};
pub use crate::schema::SchemaRegistry;
pub use crate::validation::{validate, ValidationOutcome, ValidationReport};
pub use crate::visibility::{compute_visibility, DateRange, Ephemeris, Semester};
pub use crate::simulation::{run_simulation, PointingOptimizer, SimulationResult};
