//! End-to-end flow: validate an upload, filter by visibility, run the
//! pointing simulation with the greedy reference optimizer.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};
use polars::prelude::*;

use target_uploader::simulation::{GreedyOptimizer, SimulationStatus};
use target_uploader::validation::StageStatus;
use target_uploader::visibility::NightWindow;
use target_uploader::{
    compute_visibility, run_simulation, validate, DateRange, Ephemeris, ObjectiveWeights,
    SchemaRegistry,
};

/// Every target is observable for the whole night.
struct AllNight;

impl Ephemeris for AllNight {
    fn observable(
        &self,
        _ra_deg: f64,
        _dec_deg: f64,
        night: &NightWindow,
        _min_elevation_deg: f64,
        _max_elevation_deg: f64,
    ) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        Some((night.begin, night.end))
    }
}

fn upload_frame() -> DataFrame {
    df!(
        "obj_id" => &[1i64, 2, 3],
        "ob_code" => &["field_a_1", "field_a_2", "field_b_1"],
        "ra" => &[10.0f64, 10.1, 200.0],
        "dec" => &[20.0f64, 20.05, -15.0],
        "equinox" => &["J2000.0", "J2000.0", "J2000.0"],
        "priority" => &[0i64, 5, 1],
        "exptime" => &[900.0f64, 900.0, 1800.0],
        "resolution" => &["L", "L", "M"],
        "g_hsc" => &[Some(110.0f64), Some(95.0), None],
        "flux_i" => &[None, None, Some(60.0f64)],
    )
    .unwrap()
}

fn one_week() -> DateRange {
    DateRange {
        begin: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
    }
}

#[test]
fn test_valid_upload_flows_to_simulation() {
    let outcome = validate(upload_frame(), SchemaRegistry::global()).unwrap();
    assert!(outcome.report.status, "report: {:?}", outcome.report);
    assert_eq!(outcome.report.flux.status, StageStatus::Pass);

    // Survey flux columns were folded into canonical ones.
    let names: Vec<&str> = outcome
        .frame
        .get_columns()
        .iter()
        .map(|c| c.name().as_str())
        .collect();
    assert!(!names.contains(&"g_hsc"));
    assert!(names.contains(&"flux_g"));
    assert!(names.contains(&"filter_i"));

    let mask = compute_visibility(&outcome.frame, Some(&one_week()), &AllNight).unwrap();
    assert_eq!(mask, vec![true, true, true]);

    let result = run_simulation(
        &outcome.frame,
        &ObjectiveWeights::default(),
        Duration::from_secs(30),
        &GreedyOptimizer::default(),
    )
    .unwrap();

    assert_eq!(result.status, SimulationStatus::Completed);
    assert!(!result.exceeds_rot_cap);

    // The two clustered low-resolution targets fit one pointing.
    assert_eq!(result.low.summary.n_ppc, 1);
    assert_eq!(result.low.pointings[0].code, "PPC_L_1");
    assert_eq!(result.low.summary.completion_all_pct, 100.0);

    // The 1800 s medium-resolution target needs two visits.
    assert_eq!(result.medium.summary.n_ppc, 2);
    assert_eq!(result.medium.pointings[1].code, "PPC_M_2");
    assert_eq!(result.medium.summary.completion_all_pct, 100.0);
}

#[test]
fn test_minimal_single_row_upload_passes() {
    let df = df!(
        "obj_id" => &[1i64],
        "ob_code" => &["A"],
        "ra" => &[10.0f64],
        "dec" => &[20.0f64],
        "equinox" => &["J2000.0"],
        "priority" => &[5i64],
        "exptime" => &[900.0f64],
        "resolution" => &["L"],
        "flux_g" => &[100.0f64],
    )
    .unwrap();

    let outcome = validate(df, SchemaRegistry::global()).unwrap();
    assert!(outcome.report.status, "report: {:?}", outcome.report);
}

#[test]
fn test_invalid_upload_stops_before_later_stages() {
    let df = upload_frame().drop("equinox").unwrap();
    let outcome = validate(df, SchemaRegistry::global()).unwrap();

    assert!(!outcome.report.status);
    assert_eq!(outcome.report.keys.status, StageStatus::Fail);
    assert!(outcome
        .report
        .keys
        .required
        .desc_error
        .iter()
        .any(|d| d.contains("equinox")));
    assert_eq!(outcome.report.strings.status, StageStatus::NotReached);
    assert_eq!(outcome.report.unique.status, StageStatus::NotReached);

    // The frame comes back untouched.
    assert!(outcome
        .frame
        .get_columns()
        .iter()
        .any(|c| c.name().as_str() == "g_hsc"));
}

#[test]
fn test_unobservable_targets_are_masked_out() {
    struct Never;
    impl Ephemeris for Never {
        fn observable(
            &self,
            _ra_deg: f64,
            _dec_deg: f64,
            _night: &NightWindow,
            _min_elevation_deg: f64,
            _max_elevation_deg: f64,
        ) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
            None
        }
    }

    let outcome = validate(upload_frame(), SchemaRegistry::global()).unwrap();
    let mask = compute_visibility(&outcome.frame, Some(&one_week()), &Never).unwrap();
    assert_eq!(mask, vec![false, false, false]);
}
