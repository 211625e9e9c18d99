//! Greedy reference implementation of the pointing optimizer.
//!
//! Not a MIP solver: it repeatedly centers a pointing on the unfinished
//! target with the best (lowest) priority value, breaking ties toward the
//! densest neighbourhood, and fills fibers from the surrounding field. Good
//! enough to exercise the orchestration path and to give sensible pointing
//! counts on smooth target distributions.

use std::time::{Duration, Instant};

use crate::core::{ObjectiveWeights, TargetPoint};
use crate::simulation::optimizer::{
    Allocation, OptimizerError, PointingOptimizer, RawPointing, Termination,
};
use crate::simulation::PPC_EXPTIME_SEC;

/// Angular separation on the sky in degrees (haversine form).
pub(crate) fn angular_sep_deg(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let (ra1, dec1, ra2, dec2) = (
        ra1.to_radians(),
        dec1.to_radians(),
        ra2.to_radians(),
        dec2.to_radians(),
    );
    let sin_ddec = ((dec2 - dec1) / 2.0).sin();
    let sin_dra = ((ra2 - ra1) / 2.0).sin();
    let h = sin_ddec * sin_ddec + dec1.cos() * dec2.cos() * sin_dra * sin_dra;
    2.0 * h.sqrt().clamp(-1.0, 1.0).asin().to_degrees()
}

#[derive(Debug, Clone)]
pub struct GreedyOptimizer {
    /// Patrol radius of the instrument field, degrees.
    pub field_radius_deg: f64,
    /// Fiber count available per pointing.
    pub fibers_per_pointing: usize,
}

impl Default for GreedyOptimizer {
    fn default() -> Self {
        Self {
            field_radius_deg: 0.75,
            fibers_per_pointing: crate::simulation::FIBERS_PER_PPC,
        }
    }
}

impl GreedyOptimizer {
    /// Number of pointing visits a target needs to reach its exposure time.
    fn visits_needed(target: &TargetPoint) -> usize {
        ((target.exptime_sec / PPC_EXPTIME_SEC).ceil() as usize).max(1)
    }
}

impl PointingOptimizer for GreedyOptimizer {
    fn allocate(
        &self,
        targets: &[TargetPoint],
        _weights: &ObjectiveWeights,
        budget: Duration,
    ) -> Result<Allocation, OptimizerError> {
        for t in targets {
            if !t.ra_deg.is_finite() || !t.dec_deg.is_finite() || !t.exptime_sec.is_finite() {
                return Err(OptimizerError::InvalidInput(format!(
                    "non-finite coordinates or exptime for ob_code {}",
                    t.ob_code
                )));
            }
        }

        let start = Instant::now();
        let mut remaining: Vec<usize> = targets.iter().map(Self::visits_needed).collect();
        let mut pointings = Vec::new();

        loop {
            if start.elapsed() >= budget {
                log::warn!(
                    "time budget exhausted after {} pointings, returning best effort",
                    pointings.len()
                );
                return Ok(Allocation {
                    pointings,
                    termination: Termination::DeadlineExceeded,
                });
            }

            // Center candidate: unfinished target with the lowest priority
            // value, ties broken toward the most unfinished neighbours.
            let mut center: Option<(usize, i32, usize)> = None;
            for (i, t) in targets.iter().enumerate() {
                if remaining[i] == 0 {
                    continue;
                }
                let neighbours = targets
                    .iter()
                    .enumerate()
                    .filter(|(j, n)| {
                        remaining[*j] > 0
                            && angular_sep_deg(t.ra_deg, t.dec_deg, n.ra_deg, n.dec_deg)
                                <= self.field_radius_deg
                    })
                    .count();
                let better = match center {
                    None => true,
                    Some((_, best_priority, best_neighbours)) => {
                        (t.priority, std::cmp::Reverse(neighbours))
                            < (best_priority, std::cmp::Reverse(best_neighbours))
                    }
                };
                if better {
                    center = Some((i, t.priority, neighbours));
                }
            }
            let Some((center_idx, _, _)) = center else {
                break;
            };
            let center_target = &targets[center_idx];

            let mut in_field: Vec<usize> = targets
                .iter()
                .enumerate()
                .filter(|(j, n)| {
                    remaining[*j] > 0
                        && angular_sep_deg(
                            center_target.ra_deg,
                            center_target.dec_deg,
                            n.ra_deg,
                            n.dec_deg,
                        ) <= self.field_radius_deg
                })
                .map(|(j, _)| j)
                .collect();
            in_field.sort_by_key(|&j| (targets[j].priority, j));
            in_field.truncate(self.fibers_per_pointing);

            for &j in &in_field {
                remaining[j] -= 1;
            }
            pointings.push(RawPointing {
                ra_deg: center_target.ra_deg,
                dec_deg: center_target.dec_deg,
                pa_deg: 0.0,
                assigned: in_field,
            });
        }

        Ok(Allocation {
            pointings,
            termination: Termination::Optimal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Resolution;

    fn target(ob_code: &str, ra: f64, dec: f64, priority: i32, exptime: f64) -> TargetPoint {
        TargetPoint {
            ob_code: ob_code.to_string(),
            ra_deg: ra,
            dec_deg: dec,
            priority,
            exptime_sec: exptime,
            resolution: Resolution::Low,
        }
    }

    #[test]
    fn test_angular_sep() {
        assert!(angular_sep_deg(10.0, 20.0, 10.0, 20.0).abs() < 1e-9);
        assert!((angular_sep_deg(0.0, 0.0, 1.0, 0.0) - 1.0).abs() < 1e-6);
        assert!((angular_sep_deg(0.0, 0.0, 0.0, 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clustered_targets_share_a_pointing() {
        let targets = vec![
            target("a", 10.0, 20.0, 1, 900.0),
            target("b", 10.1, 20.05, 2, 900.0),
            target("c", 10.05, 19.95, 3, 900.0),
        ];
        let alloc = GreedyOptimizer::default()
            .allocate(&targets, &ObjectiveWeights::default(), Duration::from_secs(60))
            .unwrap();
        assert_eq!(alloc.termination, Termination::Optimal);
        assert_eq!(alloc.pointings.len(), 1);
        assert_eq!(alloc.pointings[0].assigned, vec![0, 1, 2]);
    }

    #[test]
    fn test_distant_targets_need_separate_pointings() {
        let targets = vec![
            target("a", 10.0, 20.0, 1, 900.0),
            target("b", 50.0, -30.0, 1, 900.0),
        ];
        let alloc = GreedyOptimizer::default()
            .allocate(&targets, &ObjectiveWeights::default(), Duration::from_secs(60))
            .unwrap();
        assert_eq!(alloc.pointings.len(), 2);
    }

    #[test]
    fn test_long_exposure_gets_repeat_visits() {
        // 2700 s needs three 900 s visits.
        let targets = vec![target("a", 10.0, 20.0, 1, 2700.0)];
        let alloc = GreedyOptimizer::default()
            .allocate(&targets, &ObjectiveWeights::default(), Duration::from_secs(60))
            .unwrap();
        assert_eq!(alloc.pointings.len(), 3);
        for p in &alloc.pointings {
            assert_eq!(p.assigned, vec![0]);
        }
    }

    #[test]
    fn test_zero_budget_terminates_with_deadline() {
        let targets = vec![target("a", 10.0, 20.0, 1, 900.0)];
        let alloc = GreedyOptimizer::default()
            .allocate(&targets, &ObjectiveWeights::default(), Duration::ZERO)
            .unwrap();
        assert_eq!(alloc.termination, Termination::DeadlineExceeded);
        assert!(alloc.pointings.is_empty());
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let targets = vec![target("a", f64::NAN, 20.0, 1, 900.0)];
        let err = GreedyOptimizer::default()
            .allocate(&targets, &ObjectiveWeights::default(), Duration::from_secs(60))
            .unwrap_err();
        assert!(matches!(err, OptimizerError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_input() {
        let alloc = GreedyOptimizer::default()
            .allocate(&[], &ObjectiveWeights::default(), Duration::from_secs(60))
            .unwrap();
        assert!(alloc.pointings.is_empty());
        assert_eq!(alloc.termination, Termination::Optimal);
    }
}
