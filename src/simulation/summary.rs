//! Reduction of raw allocations into ranked pointing lists and summary rows.

use serde::{Deserialize, Serialize};

use crate::core::{Resolution, TargetPoint};
use crate::simulation::optimizer::Allocation;
use crate::simulation::{FIBERS_PER_PPC, PPC_EXPTIME_SEC, PPC_OVERHEAD_SEC};

/// One ranked pointing center ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointingCenter {
    /// `PPC_<resolution>_<rank+1>`.
    pub code: String,
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub pa_deg: f64,
    /// 0-based rank, best pointing first.
    pub rank: usize,
    /// Fraction of fibers carrying a target, percent.
    pub fiber_usage_pct: f64,
    pub resolution: Resolution,
}

/// Per-resolution summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    pub resolution: Resolution,
    pub n_ppc: usize,
    /// Open-shutter time, hours.
    pub exptime_hours: f64,
    /// Open-shutter time multiplied by assigned fibers, fiber-hours.
    pub exptime_fiberhours: f64,
    /// Requested observing time including per-pointing overhead, hours.
    pub request_hours: f64,
    /// Mean fiber usage over all pointings, percent.
    pub fiber_usage_pct: f64,
    /// Share of pointings with fiber usage below 30 percent, percent.
    pub low_usage_ppc_pct: f64,
    /// Share of targets whose exposure is fully covered, percent.
    pub completion_all_pct: f64,
    /// Same, restricted to the best-priority targets. NaN without targets.
    pub completion_top_pct: f64,
}

/// Summary for a partition that never reached the optimizer.
pub fn placeholder_summary(resolution: Resolution) -> ResolutionSummary {
    ResolutionSummary {
        resolution,
        n_ppc: 0,
        exptime_hours: 0.0,
        exptime_fiberhours: 0.0,
        request_hours: 0.0,
        fiber_usage_pct: 0.0,
        low_usage_ppc_pct: 0.0,
        completion_all_pct: f64::NAN,
        completion_top_pct: f64::NAN,
    }
}

/// Turn an allocation into a ranked pointing list plus its summary row.
///
/// Pointings are ranked by the descending sum of `10 - priority` over their
/// assigned targets, so pointings packed with high-priority (low value)
/// targets sort first.
pub fn reduce_allocation(
    resolution: Resolution,
    targets: &[TargetPoint],
    allocation: &Allocation,
) -> (Vec<PointingCenter>, ResolutionSummary) {
    let score = |assigned: &[usize]| -> f64 {
        assigned
            .iter()
            .map(|&i| (10 - targets[i].priority) as f64)
            .sum()
    };

    let mut order: Vec<usize> = (0..allocation.pointings.len()).collect();
    order.sort_by(|&a, &b| {
        score(&allocation.pointings[b].assigned)
            .total_cmp(&score(&allocation.pointings[a].assigned))
            .then(a.cmp(&b))
    });

    let pointings: Vec<PointingCenter> = order
        .iter()
        .enumerate()
        .map(|(rank, &i)| {
            let raw = &allocation.pointings[i];
            PointingCenter {
                code: format!("PPC_{}_{}", resolution.as_str(), rank + 1),
                ra_deg: raw.ra_deg,
                dec_deg: raw.dec_deg,
                pa_deg: raw.pa_deg,
                rank,
                fiber_usage_pct: raw.assigned.len() as f64 / FIBERS_PER_PPC as f64 * 100.0,
                resolution,
            }
        })
        .collect();

    let n_ppc = allocation.pointings.len();
    let total_assigned: usize = allocation.pointings.iter().map(|p| p.assigned.len()).sum();

    let mut visits = vec![0usize; targets.len()];
    for p in &allocation.pointings {
        for &i in &p.assigned {
            visits[i] += 1;
        }
    }
    let completed = |i: usize| visits[i] as f64 * PPC_EXPTIME_SEC >= targets[i].exptime_sec;

    let completion_all_pct = if targets.is_empty() {
        f64::NAN
    } else {
        (0..targets.len()).filter(|&i| completed(i)).count() as f64 / targets.len() as f64 * 100.0
    };

    let top_priority = targets.iter().map(|t| t.priority).min();
    let completion_top_pct = match top_priority {
        None => f64::NAN,
        Some(best) => {
            let top: Vec<usize> = (0..targets.len())
                .filter(|&i| targets[i].priority == best)
                .collect();
            top.iter().filter(|&&i| completed(i)).count() as f64 / top.len() as f64 * 100.0
        }
    };

    let low_usage_ppc_pct = if n_ppc == 0 {
        0.0
    } else {
        allocation
            .pointings
            .iter()
            .filter(|p| (p.assigned.len() as f64 / FIBERS_PER_PPC as f64) < 0.30)
            .count() as f64
            / n_ppc as f64
            * 100.0
    };

    let summary = ResolutionSummary {
        resolution,
        n_ppc,
        exptime_hours: n_ppc as f64 * PPC_EXPTIME_SEC / 3600.0,
        exptime_fiberhours: total_assigned as f64 * PPC_EXPTIME_SEC / 3600.0,
        request_hours: n_ppc as f64 * (PPC_EXPTIME_SEC + PPC_OVERHEAD_SEC) / 3600.0,
        fiber_usage_pct: if n_ppc == 0 {
            0.0
        } else {
            total_assigned as f64 / (n_ppc * FIBERS_PER_PPC) as f64 * 100.0
        },
        low_usage_ppc_pct,
        completion_all_pct,
        completion_top_pct,
    };

    (pointings, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::optimizer::{RawPointing, Termination};

    fn target(priority: i32, exptime: f64) -> TargetPoint {
        TargetPoint {
            ob_code: format!("t{priority}"),
            ra_deg: 10.0,
            dec_deg: 20.0,
            priority,
            exptime_sec: exptime,
            resolution: Resolution::Low,
        }
    }

    fn pointing(assigned: Vec<usize>) -> RawPointing {
        RawPointing {
            ra_deg: 10.0,
            dec_deg: 20.0,
            pa_deg: 0.0,
            assigned,
        }
    }

    #[test]
    fn test_rank_prefers_high_priority_pointings() {
        let targets = vec![target(9, 900.0), target(0, 900.0)];
        let allocation = Allocation {
            // First pointing carries the low-priority target only.
            pointings: vec![pointing(vec![0]), pointing(vec![1])],
            termination: Termination::Optimal,
        };
        let (centers, _) = reduce_allocation(Resolution::Low, &targets, &allocation);
        assert_eq!(centers[0].rank, 0);
        assert_eq!(centers[0].code, "PPC_L_1");
        // The priority-0 pointing scores 10, the priority-9 one scores 1.
        assert_eq!(centers[0].fiber_usage_pct, centers[1].fiber_usage_pct);
        assert_eq!(centers[1].code, "PPC_L_2");
    }

    #[test]
    fn test_summary_accounting() {
        let targets = vec![target(0, 900.0), target(1, 1800.0)];
        let allocation = Allocation {
            pointings: vec![pointing(vec![0, 1]), pointing(vec![1])],
            termination: Termination::Optimal,
        };
        let (_, summary) = reduce_allocation(Resolution::Medium, &targets, &allocation);

        assert_eq!(summary.n_ppc, 2);
        assert!((summary.exptime_hours - 0.5).abs() < 1e-12);
        assert!((summary.exptime_fiberhours - 0.75).abs() < 1e-12);
        // Two pointings at 1200 s each.
        assert!((summary.request_hours - 2.0 / 3.0).abs() < 1e-12);
        assert!((summary.fiber_usage_pct - 3.0 / (2.0 * 2394.0) * 100.0).abs() < 1e-12);
        // Both pointings use far fewer than 30% of fibers.
        assert_eq!(summary.low_usage_ppc_pct, 100.0);
        // Both targets reach their exposure.
        assert_eq!(summary.completion_all_pct, 100.0);
        assert_eq!(summary.completion_top_pct, 100.0);
    }

    #[test]
    fn test_completion_top_restricted_to_best_priority() {
        let targets = vec![target(0, 1800.0), target(5, 900.0)];
        let allocation = Allocation {
            // Target 0 gets one visit of its two, target 1 is done.
            pointings: vec![pointing(vec![0, 1])],
            termination: Termination::Optimal,
        };
        let (_, summary) = reduce_allocation(Resolution::Low, &targets, &allocation);
        assert_eq!(summary.completion_all_pct, 50.0);
        assert_eq!(summary.completion_top_pct, 0.0);
    }

    #[test]
    fn test_placeholder_summary_is_nan_completion() {
        let s = placeholder_summary(Resolution::Medium);
        assert_eq!(s.n_ppc, 0);
        assert_eq!(s.request_hours, 0.0);
        assert!(s.completion_all_pct.is_nan());
        assert!(s.completion_top_pct.is_nan());
    }
}
