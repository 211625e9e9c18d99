//! Target visibility over an observing window.
//!
//! Visibility is a per-target accounting exercise: for every night of the
//! requested range, ask the ephemeris for the continuous sub-window during
//! which the target sits inside the telescope's elevation band, sum the
//! observable seconds, and compare against the requested exposure time. The
//! ephemeris itself is a black box behind the [`Ephemeris`] trait so the
//! astronomy backend can be swapped (or stubbed in tests).

pub mod semester;

pub use semester::{DateRange, Semester, SemesterTerm};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use once_cell::sync::Lazy;
use polars::prelude::*;

/// Lower edge of the usable elevation band, degrees.
pub const ELEVATION_MIN_DEG: f64 = 30.0;
/// Upper edge of the usable elevation band, degrees.
pub const ELEVATION_MAX_DEG: f64 = 85.0;

/// Observation site clock (Hawaii Standard Time, no DST).
static HST: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::west_opt(10 * 3600).expect("HST offset is in range"));

/// One observing night, 18:30 HST through 05:30 HST the next morning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightWindow {
    pub begin: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl NightWindow {
    /// Night window for the evening of the given civil date.
    pub fn for_evening(date: NaiveDate) -> Option<NightWindow> {
        let begin = hst_datetime(date, 18, 30)?;
        let end = hst_datetime(date.succ_opt()?, 5, 30)?;
        Some(NightWindow { begin, end })
    }
}

fn hst_datetime(date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<FixedOffset>> {
    date.and_hms_opt(hour, minute, 0)?
        .and_local_timezone(*HST)
        .single()
}

/// Black-box ephemeris capability.
pub trait Ephemeris {
    /// Continuous sub-window of `night` during which the target at
    /// (`ra_deg`, `dec_deg`) stays within the elevation band, or `None` if it
    /// never enters it.
    fn observable(
        &self,
        ra_deg: f64,
        dec_deg: f64,
        night: &NightWindow,
        min_elevation_deg: f64,
        max_elevation_deg: f64,
    ) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)>;
}

/// Per-row visibility mask over the given range.
///
/// A target is visible when its observable seconds, summed over every night
/// of the range, reach its requested `exptime`. With no explicit range the
/// next semester after today is used. An empty frame yields an empty mask
/// without consulting the ephemeris.
pub fn compute_visibility(
    df: &DataFrame,
    range: Option<&DateRange>,
    ephemeris: &dyn Ephemeris,
) -> PolarsResult<Vec<bool>> {
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    let default_range;
    let range = match range {
        Some(r) => r,
        None => {
            let semester = Semester::next_after(Utc::now().date_naive());
            log::info!("no observing range given, using semester {semester}");
            default_range = semester.date_range();
            &default_range
        }
    };

    let ra = cast_f64(df, "ra")?;
    let dec = cast_f64(df, "dec")?;
    let exptime = cast_f64(df, "exptime")?;

    let mut observable_sec = vec![0.0f64; df.height()];
    let mut date = range.begin;
    while date < range.end {
        let Some(night) = NightWindow::for_evening(date) else {
            break;
        };
        for (row, seconds) in observable_sec.iter_mut().enumerate() {
            let (Some(ra), Some(dec)) = (ra[row], dec[row]) else {
                continue;
            };
            if let Some((start, stop)) =
                ephemeris.observable(ra, dec, &night, ELEVATION_MIN_DEG, ELEVATION_MAX_DEG)
            {
                if stop > start {
                    *seconds += (stop - start).num_seconds() as f64;
                }
            }
        }
        let Some(next) = date.succ_opt() else {
            break;
        };
        date = next;
    }

    Ok(observable_sec
        .iter()
        .zip(&exptime)
        .map(|(&sec, requested)| requested.map(|t| sec >= t).unwrap_or(false))
        .collect())
}

fn cast_f64(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let cast = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}
