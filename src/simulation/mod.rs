//! Pointing simulation.
//!
//! The orchestrator partitions the visible targets by spectrograph resolution,
//! hands each partition to a deadline-bounded allocation engine, and reduces
//! the raw allocations into ranked pointing lists and per-resolution summary
//! rows.

pub mod greedy;
pub mod optimizer;
pub mod orchestrator;
pub mod summary;

pub use greedy::GreedyOptimizer;
pub use optimizer::{Allocation, OptimizerError, PointingOptimizer, RawPointing, Termination};
pub use orchestrator::{
    run_simulation, ResolutionOutcome, SimulationResult, SimulationStatus,
};
pub use summary::{placeholder_summary, reduce_allocation, PointingCenter, ResolutionSummary};

/// Open-shutter time of one pointing, seconds.
pub const PPC_EXPTIME_SEC: f64 = 900.0;
/// Slew, configuration and calibration overhead per pointing, seconds.
pub const PPC_OVERHEAD_SEC: f64 = 300.0;
/// Science fibers available per pointing.
pub const FIBERS_PER_PPC: usize = 2394;
/// Request-time ceiling for a normal program, hours.
pub const MAX_REQTIME_NORMAL_HOURS: f64 = 35.0;
/// Default optimizer time budget, seconds.
pub const DEFAULT_TIME_BUDGET_SEC: u64 = 900;
