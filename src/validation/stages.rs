//! Individual validation stages.
//!
//! Each stage takes the uploaded frame (and the schema registry) and produces
//! its sub-report. The pipeline in [`super::pipeline`] decides ordering and
//! early termination; stages themselves are pure checks, except for flux
//! normalization which also rewrites the frame.

use polars::prelude::*;
use std::collections::HashMap;

use crate::schema::{Band, SchemaRegistry};
use crate::validation::report::{
    ColumnMask, FluxStage, KeyCheck, KeyStage, OptionalKeyCheck, StageStatus, StringStage,
    UniqueStage, ValueStage,
};

pub(crate) const EMPTY_DATA_MESSAGE: &str =
    "Empty data detected (maybe failure in loading the inputs)";

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_columns().iter().any(|c| c.name().as_str() == name)
}

fn float_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let cast = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

fn string_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let cast = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Whether a string is a non-empty token over `[A-Za-z0-9_+\-.]`.
pub(crate) fn is_clean_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '.'))
}

/// Whether an equinox string is a leading `J` or `B` followed by a float.
pub(crate) fn is_valid_equinox(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some('J') | Some('B') => chars.as_str().parse::<f64>().is_ok(),
        _ => false,
    }
}

/// Stage 1: required and optional key presence, one description per key.
pub fn check_keys(df: &DataFrame, schema: &SchemaRegistry) -> KeyStage {
    let mut required = KeyCheck {
        status: true,
        ..KeyCheck::default()
    };
    for key in schema.required_keys().iter().copied() {
        if has_column(df, key) {
            required
                .desc_success
                .push(format!("required column {key} is present"));
        } else {
            required.status = false;
            required
                .desc_error
                .push(format!("required column {key} is missing"));
        }
    }

    let mut optional = OptionalKeyCheck {
        status: true,
        ..OptionalKeyCheck::default()
    };
    for key in schema.optional_keys().iter().copied() {
        if has_column(df, key) {
            optional
                .desc_success
                .push(format!("optional column {key} is present"));
        } else {
            optional.status = false;
            optional
                .desc_warning
                .push(format!("optional column {key} is missing"));
        }
    }

    for warning in &optional.desc_warning {
        log::warn!("{warning}");
    }

    KeyStage {
        status: if required.status {
            StageStatus::Pass
        } else {
            StageStatus::Fail
        },
        required,
        optional,
    }
}

/// Stage 2: character-set sanity of every present string-typed column.
///
/// The stage verdict is driven by the required string columns; failures in
/// optional string columns are recorded and warned about, but do not fail the
/// upload.
pub fn check_strings(df: &DataFrame, schema: &SchemaRegistry) -> PolarsResult<StringStage> {
    let n = df.height();
    let mut per_column = Vec::new();
    let mut success_required = vec![true; n];
    let mut success_optional = vec![true; n];
    let mut optional_ok = true;

    let column_sets: [(&[&'static str], bool); 2] = [
        (schema.required_keys(), true),
        (schema.optional_keys(), false),
    ];

    for (keys, is_required) in column_sets {
        for key in keys.iter().copied() {
            if !schema.is_string_key(key) || !has_column(df, key) {
                continue;
            }
            let values = string_values(df, key)?;
            let mask: Vec<bool> = values
                .iter()
                .map(|v| v.as_deref().map(is_clean_token).unwrap_or(false))
                .collect();
            let all_ok = mask.iter().all(|&ok| ok);
            if is_required {
                for (acc, &ok) in success_required.iter_mut().zip(&mask) {
                    *acc &= ok;
                }
            } else {
                if !all_ok {
                    optional_ok = false;
                    log::warn!("string check failed for optional column {key}");
                }
                for (acc, &ok) in success_optional.iter_mut().zip(&mask) {
                    *acc &= ok;
                }
            }
            per_column.push(ColumnMask {
                column: key.to_string(),
                all_ok,
                success: mask,
            });
        }
    }

    let status = if success_required.iter().all(|&ok| ok) {
        StageStatus::Pass
    } else {
        StageStatus::Fail
    };

    Ok(StringStage {
        status,
        optional_ok,
        per_column,
        success_required,
        success_optional,
    })
}

/// Stage 3: value ranges and formats for the required columns.
pub fn check_values(df: &DataFrame) -> PolarsResult<ValueStage> {
    let n = df.height();
    let mut per_column = Vec::new();
    let mut success = vec![true; n];

    let mut push_mask = |column: &str, mask: Vec<bool>, success: &mut Vec<bool>| {
        for (acc, &ok) in success.iter_mut().zip(&mask) {
            *acc &= ok;
        }
        per_column.push(ColumnMask {
            column: column.to_string(),
            all_ok: mask.iter().all(|&ok| ok),
            success: mask,
        });
    };

    let in_range = |values: &[Option<f64>], lo: f64, hi: f64| -> Vec<bool> {
        values
            .iter()
            .map(|v| v.map(|x| x.is_finite() && x >= lo && x <= hi).unwrap_or(false))
            .collect()
    };

    let ra = float_values(df, "ra")?;
    push_mask("ra", in_range(&ra, 0.0, 360.0), &mut success);

    let dec = float_values(df, "dec")?;
    push_mask("dec", in_range(&dec, -90.0, 90.0), &mut success);

    let equinox = string_values(df, "equinox")?;
    let mask: Vec<bool> = equinox
        .iter()
        .map(|v| v.as_deref().map(is_valid_equinox).unwrap_or(false))
        .collect();
    push_mask("equinox", mask, &mut success);

    let priority = float_values(df, "priority")?;
    let mask: Vec<bool> = priority
        .iter()
        .map(|v| {
            v.map(|x| x.is_finite() && x.fract() == 0.0 && (0.0..=9.0).contains(&x))
                .unwrap_or(false)
        })
        .collect();
    push_mask("priority", mask, &mut success);

    let exptime = float_values(df, "exptime")?;
    let mask: Vec<bool> = exptime
        .iter()
        .map(|v| v.map(|x| x.is_finite() && x > 0.0).unwrap_or(false))
        .collect();
    push_mask("exptime", mask, &mut success);

    let resolution = string_values(df, "resolution")?;
    let mask: Vec<bool> = resolution
        .iter()
        .map(|v| matches!(v.as_deref(), Some("L") | Some("M")))
        .collect();
    push_mask("resolution", mask, &mut success);

    let status = if success.iter().all(|&ok| ok) {
        StageStatus::Pass
    } else {
        StageStatus::Fail
    };

    Ok(ValueStage {
        status,
        per_column,
        success,
    })
}

/// Stage 3': fold survey-specific flux columns into the canonical
/// `filter_<band>` / `flux_<band>` / `flux_error_<band>` triplet per band.
///
/// Aliases are visited in the registry's fixed order; for a given row and band
/// the first finite value wins, and later matches are skipped with a warning.
/// Consumed survey columns are dropped from the frame.
pub fn normalize_fluxes(
    df: DataFrame,
    schema: &SchemaRegistry,
) -> PolarsResult<(DataFrame, FluxStage)> {
    let n = df.height();
    let table = schema.filters();

    let mut frame = df;
    let mut found = vec![false; n];
    let mut dropped_columns = Vec::new();
    let mut skipped_duplicates = 0usize;

    for band in Band::ALL {
        let flux_name = band.flux_column();
        let filter_name = band.filter_column();
        let error_name = band.flux_error_column();

        let input_filters = if has_column(&frame, &filter_name) {
            Some(string_values(&frame, &filter_name)?)
        } else {
            None
        };

        let mut out_filter: Vec<Option<String>> = vec![None; n];
        let mut out_flux: Vec<Option<f64>> = vec![None; n];
        let mut out_error: Vec<Option<f64>> = vec![None; n];

        for alias in table.aliases_of(band).iter().copied() {
            if !has_column(&frame, alias) {
                continue;
            }
            let values = float_values(&frame, alias)?;
            let generic = alias == flux_name;
            let alias_error_name = if generic {
                error_name.clone()
            } else {
                format!("{alias}_error")
            };
            let errors = if has_column(&frame, &alias_error_name) {
                Some(float_values(&frame, &alias_error_name)?)
            } else {
                None
            };

            for (row, value) in values.iter().enumerate() {
                let Some(v) = value.filter(|x| x.is_finite()) else {
                    continue;
                };
                if out_flux[row].is_some() {
                    skipped_duplicates += 1;
                    log::warn!(
                        "row {row}: flux for band {band} already set, ignoring column {alias}"
                    );
                    continue;
                }
                out_flux[row] = Some(v);
                out_error[row] = errors
                    .as_ref()
                    .and_then(|e| e[row])
                    .filter(|x| x.is_finite());
                out_filter[row] = if generic {
                    input_filters
                        .as_ref()
                        .and_then(|f| f[row].clone())
                        .filter(|s| !s.is_empty())
                        .or_else(|| Some(band.as_str().to_string()))
                } else {
                    Some(alias.to_string())
                };
                found[row] = true;
            }
        }

        // Survey alias columns (and their error columns) are consumed.
        for alias in table.aliases_of(band).iter().copied() {
            if alias == flux_name {
                continue;
            }
            for name in [alias.to_string(), format!("{alias}_error")] {
                if has_column(&frame, &name) {
                    frame = frame.drop(&name)?;
                    dropped_columns.push(name);
                }
            }
        }

        if out_flux.iter().any(Option::is_some) {
            frame.with_column(Series::new(filter_name.as_str().into(), out_filter))?;
            frame.with_column(Series::new(flux_name.as_str().into(), out_flux))?;
            frame.with_column(Series::new(error_name.as_str().into(), out_error))?;
        } else {
            for name in [filter_name, flux_name, error_name] {
                if has_column(&frame, &name) {
                    frame = frame.drop(&name)?;
                    dropped_columns.push(name);
                }
            }
        }
    }

    let status = if found.iter().all(|&ok| ok) {
        StageStatus::Pass
    } else {
        StageStatus::Fail
    };

    Ok((
        frame,
        FluxStage {
            status,
            success: found,
            dropped_columns,
            skipped_duplicates,
        },
    ))
}

/// Stage 4: `ob_code` uniqueness. An empty frame fails outright.
pub fn check_unique(df: &DataFrame) -> PolarsResult<UniqueStage> {
    if df.height() == 0 {
        return Ok(UniqueStage {
            status: StageStatus::Fail,
            flags: Vec::new(),
            description: EMPTY_DATA_MESSAGE.to_string(),
        });
    }

    let codes = string_values(df, "ob_code")?;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for code in codes.iter().flatten() {
        *counts.entry(code.as_str()).or_insert(0) += 1;
    }

    // True flags a violating row: every occurrence of a duplicated code.
    let flags: Vec<bool> = codes
        .iter()
        .map(|c| match c {
            Some(code) => counts[code.as_str()] > 1,
            None => true,
        })
        .collect();

    if flags.iter().all(|&flagged| !flagged) {
        Ok(UniqueStage {
            status: StageStatus::Pass,
            flags,
            description: "All ob_code values are unique.".to_string(),
        })
    } else {
        let mut duplicated: Vec<&str> = counts
            .iter()
            .filter(|(_, &count)| count > 1)
            .map(|(&code, _)| code)
            .collect();
        duplicated.sort_unstable();
        Ok(UniqueStage {
            status: StageStatus::Fail,
            flags,
            description: format!("Duplicate ob_code values: {:?}", duplicated),
        })
    }
}
