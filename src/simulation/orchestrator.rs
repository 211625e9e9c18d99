//! Simulation orchestration: partition by resolution, run the optimizer,
//! reduce to ranked pointings and summary rows.

use std::time::Duration;

use polars::prelude::*;

use crate::core::{ObjectiveWeights, Resolution, TargetPoint};
use crate::simulation::optimizer::{PointingOptimizer, Termination};
use crate::simulation::summary::{placeholder_summary, reduce_allocation, PointingCenter, ResolutionSummary};
use crate::simulation::MAX_REQTIME_NORMAL_HOURS;

/// How the simulation as a whole ended. Neither variant is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStatus {
    Completed,
    /// At least one partition hit its time budget; results are best-effort.
    TimeBudgetExhausted,
}

/// Outcome for one resolution partition.
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub resolution: Resolution,
    pub pointings: Vec<PointingCenter>,
    pub summary: ResolutionSummary,
    /// Engine failure message, if the optimizer errored for this partition.
    pub optimizer_error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub low: ResolutionOutcome,
    pub medium: ResolutionOutcome,
    pub status: SimulationStatus,
    /// Total request time crossed the normal-program ceiling.
    pub exceeds_rot_cap: bool,
}

/// Build the target list from a validated, visibility-filtered frame.
fn targets_from_frame(df: &DataFrame) -> PolarsResult<Vec<TargetPoint>> {
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    let ob_code = df.column("ob_code")?.as_materialized_series().clone();
    let ob_code = ob_code.str()?;
    let ra = df
        .column("ra")?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let ra = ra.f64()?;
    let dec = df
        .column("dec")?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let dec = dec.f64()?;
    let priority = df
        .column("priority")?
        .as_materialized_series()
        .cast(&DataType::Int32)?;
    let priority = priority.i32()?;
    let exptime = df
        .column("exptime")?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let exptime = exptime.f64()?;
    let resolution = df.column("resolution")?.as_materialized_series().clone();
    let resolution = resolution.str()?;

    let mut targets = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let fields = (
            ob_code.get(row),
            ra.get(row),
            dec.get(row),
            priority.get(row),
            exptime.get(row),
            resolution.get(row).and_then(Resolution::parse),
        );
        match fields {
            (Some(code), Some(ra), Some(dec), Some(priority), Some(exptime), Some(resolution)) => {
                targets.push(TargetPoint {
                    ob_code: code.to_string(),
                    ra_deg: ra,
                    dec_deg: dec,
                    priority,
                    exptime_sec: exptime,
                    resolution,
                });
            }
            _ => log::warn!("row {row}: incomplete target skipped in simulation"),
        }
    }
    Ok(targets)
}

fn run_partition(
    resolution: Resolution,
    targets: &[TargetPoint],
    weights: &ObjectiveWeights,
    budget: Duration,
    optimizer: &dyn PointingOptimizer,
) -> (ResolutionOutcome, bool) {
    if targets.is_empty() {
        log::info!("no {resolution} targets, skipping optimizer");
        return (
            ResolutionOutcome {
                resolution,
                pointings: Vec::new(),
                summary: placeholder_summary(resolution),
                optimizer_error: None,
            },
            false,
        );
    }

    log::info!("allocating {} {resolution} targets", targets.len());
    match optimizer.allocate(targets, weights, budget) {
        Ok(allocation) => {
            let deadline_hit = allocation.termination == Termination::DeadlineExceeded;
            let (pointings, summary) = reduce_allocation(resolution, targets, &allocation);
            (
                ResolutionOutcome {
                    resolution,
                    pointings,
                    summary,
                    optimizer_error: None,
                },
                deadline_hit,
            )
        }
        Err(err) => {
            log::error!("optimizer failed for {resolution} partition: {err}");
            (
                ResolutionOutcome {
                    resolution,
                    pointings: Vec::new(),
                    summary: placeholder_summary(resolution),
                    optimizer_error: Some(err.to_string()),
                },
                false,
            )
        }
    }
}

/// Run the pointing simulation over a validated, visibility-filtered frame.
///
/// The frame is partitioned by resolution and each partition gets its own
/// optimizer run under the shared time budget. A failing partition is
/// reported in its outcome and never blocks the other one.
pub fn run_simulation(
    visible: &DataFrame,
    weights: &ObjectiveWeights,
    budget: Duration,
    optimizer: &dyn PointingOptimizer,
) -> PolarsResult<SimulationResult> {
    let targets = targets_from_frame(visible)?;
    let low: Vec<TargetPoint> = targets
        .iter()
        .filter(|t| t.resolution == Resolution::Low)
        .cloned()
        .collect();
    let medium: Vec<TargetPoint> = targets
        .iter()
        .filter(|t| t.resolution == Resolution::Medium)
        .cloned()
        .collect();

    let (low, low_deadline) = run_partition(Resolution::Low, &low, weights, budget, optimizer);
    let (medium, medium_deadline) =
        run_partition(Resolution::Medium, &medium, weights, budget, optimizer);

    let status = if low_deadline || medium_deadline {
        SimulationStatus::TimeBudgetExhausted
    } else {
        SimulationStatus::Completed
    };

    let total_request_hours = [low.summary.request_hours, medium.summary.request_hours]
        .iter()
        .filter(|h| h.is_finite())
        .sum::<f64>();
    let exceeds_rot_cap = total_request_hours > MAX_REQTIME_NORMAL_HOURS;
    if exceeds_rot_cap {
        log::warn!(
            "total request time {total_request_hours:.2} h exceeds the {MAX_REQTIME_NORMAL_HOURS} h ceiling"
        );
    }

    Ok(SimulationResult {
        low,
        medium,
        status,
        exceeds_rot_cap,
    })
}
