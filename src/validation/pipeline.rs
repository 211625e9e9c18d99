//! Staged validation pipeline for uploaded target lists.

use polars::prelude::*;

use crate::schema::SchemaRegistry;
use crate::validation::report::ValidationReport;
use crate::validation::stages;

/// Frame and report produced by [`validate`].
///
/// The frame is the input rewritten by flux normalization; when validation
/// stops early the frame is returned as-is.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub frame: DataFrame,
    pub report: ValidationReport,
}

/// Run the full validation pipeline over an uploaded frame.
///
/// Stages run in a fixed order and the pipeline stops at the first failing
/// stage; sub-reports of unreached stages stay at their `NotReached` default.
pub fn validate(df: DataFrame, schema: &SchemaRegistry) -> PolarsResult<ValidationOutcome> {
    let mut report = ValidationReport::default();

    log::info!("[STAGE 1] checking column presence");
    report.keys = stages::check_keys(&df, schema);
    if !report.keys.status.is_pass() {
        return Ok(ValidationOutcome { frame: df, report });
    }

    log::info!("[STAGE 2] checking string columns");
    report.strings = stages::check_strings(&df, schema)?;
    if !report.strings.status.is_pass() {
        return Ok(ValidationOutcome { frame: df, report });
    }

    log::info!("[STAGE 3] checking value ranges");
    report.values = stages::check_values(&df)?;
    if !report.values.status.is_pass() {
        return Ok(ValidationOutcome { frame: df, report });
    }

    log::info!("[STAGE 3'] normalizing flux columns");
    let (frame, flux) = stages::normalize_fluxes(df, schema)?;
    report.flux = flux;
    if !report.flux.status.is_pass() {
        return Ok(ValidationOutcome { frame, report });
    }

    log::info!("[STAGE 4] checking ob_code uniqueness");
    report.unique = stages::check_unique(&frame)?;
    report.status = report.unique.status.is_pass();

    Ok(ValidationOutcome { frame, report })
}
