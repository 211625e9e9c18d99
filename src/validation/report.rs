//! Per-stage validation report types.
//!
//! The report mirrors the pipeline: one sub-report per stage, each carrying a
//! tri-state status so callers can tell a stage that failed apart from one the
//! pipeline never reached. Everything serializes to JSON for archiving next to
//! the uploaded list.

use serde::{Deserialize, Serialize};

/// Outcome of a single validation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// An earlier stage failed before this one ran.
    #[default]
    NotReached,
    Pass,
    Fail,
}

impl StageStatus {
    pub fn is_pass(&self) -> bool {
        matches!(self, StageStatus::Pass)
    }
}

/// Presence check over the required key set, one description per key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyCheck {
    pub status: bool,
    pub desc_success: Vec<String>,
    pub desc_error: Vec<String>,
}

/// Presence check over the optional key set. Missing optional keys warn but
/// never fail the stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionalKeyCheck {
    pub status: bool,
    pub desc_success: Vec<String>,
    pub desc_warning: Vec<String>,
}

/// Stage 1: required and optional key presence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyStage {
    pub status: StageStatus,
    pub required: KeyCheck,
    pub optional: OptionalKeyCheck,
}

/// Per-row pass mask for one string-typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMask {
    pub column: String,
    pub all_ok: bool,
    pub success: Vec<bool>,
}

/// Stage 2: character-set sanity of string-typed columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StringStage {
    pub status: StageStatus,
    /// Whether every present optional string column passed.
    pub optional_ok: bool,
    pub per_column: Vec<ColumnMask>,
    /// Row-wise conjunction over required string columns.
    pub success_required: Vec<bool>,
    /// Row-wise conjunction over present optional string columns.
    pub success_optional: Vec<bool>,
}

/// Stage 3: numeric range and format checks on the required columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueStage {
    pub status: StageStatus,
    pub per_column: Vec<ColumnMask>,
    /// Row-wise conjunction over all checked columns.
    pub success: Vec<bool>,
}

/// Stage 3': flux column normalization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FluxStage {
    pub status: StageStatus,
    /// Per-row flag: at least one band flux was found.
    pub success: Vec<bool>,
    /// Input columns removed from the frame during normalization.
    pub dropped_columns: Vec<String>,
    /// Count of row/band slots where a later alias was ignored because an
    /// earlier one had already supplied the value.
    pub skipped_duplicates: usize,
}

/// Stage 4: `ob_code` uniqueness.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UniqueStage {
    pub status: StageStatus,
    /// Per-row violation flag, `true` on every occurrence of a duplicated
    /// code (all occurrences, not just the second and later ones).
    pub flags: Vec<bool>,
    pub description: String,
}

/// Aggregate report over the whole pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Overall verdict: every stage ran and passed.
    pub status: bool,
    pub keys: KeyStage,
    pub strings: StringStage,
    pub values: ValueStage,
    pub flux: FluxStage,
    pub unique: UniqueStage,
}
