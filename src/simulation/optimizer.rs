//! Pointing optimizer contract.
//!
//! The fiber-to-target assignment problem is solved by an external engine
//! behind the [`PointingOptimizer`] trait. The orchestrator only needs the
//! resulting pointings, whether the engine finished within its time budget,
//! and a way to surface engine failures without aborting the run.

use std::time::Duration;

use thiserror::Error;

use crate::core::{ObjectiveWeights, TargetPoint};

/// How an allocation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The engine proved optimality (or exhausted its search) in time.
    Optimal,
    /// The time budget ran out; the allocation is the best found so far.
    DeadlineExceeded,
}

/// One telescope pointing as produced by the engine: sky position, position
/// angle and the indices (into the input target slice) of targets assigned to
/// fibers during this pointing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPointing {
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub pa_deg: f64,
    pub assigned: Vec<usize>,
}

/// Engine output: the pointing list plus how the run terminated.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub pointings: Vec<RawPointing>,
    pub termination: Termination,
}

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("optimizer rejected input: {0}")]
    InvalidInput(String),
    #[error("solver failure: {0}")]
    Solver(String),
}

/// Black-box pointing allocation engine.
pub trait PointingOptimizer {
    /// Allocate fibers to `targets`, spending at most `budget` wall time.
    ///
    /// Running out of budget is not an error: the engine returns its best
    /// allocation with [`Termination::DeadlineExceeded`]. `Err` is reserved
    /// for the engine being unable to produce any allocation at all.
    fn allocate(
        &self,
        targets: &[TargetPoint],
        weights: &ObjectiveWeights,
        budget: Duration,
    ) -> Result<Allocation, OptimizerError>;
}
