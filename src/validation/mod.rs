//! Target list validation.
//!
//! A staged pipeline over the uploaded frame: key presence, string sanity,
//! value ranges, flux normalization and `ob_code` uniqueness, with a per-stage
//! report suitable for echoing back to the submitter.

pub mod pipeline;
pub mod report;
pub mod stages;

pub use pipeline::{validate, ValidationOutcome};
pub use report::{
    ColumnMask, FluxStage, KeyCheck, KeyStage, OptionalKeyCheck, StageStatus, StringStage,
    UniqueStage, ValidationReport, ValueStage,
};
