//! Rigid-body gap fill: per-frame Procrustes refits over fully intact spans.

use crate::fill::{
    check_lengths, cluster_frame_sets, target_precondition, FillReport, SkipReason,
};
use crate::retrack_errors::RetrackError;
use crate::rigid::rigid_fit;
use crate::trajectory::Trajectory;

/// Fill blocked target frames by refitting the cluster's rigid transform at
/// every frame.
///
/// For a blocked frame `f` bracketed by anchors `f0 < f < f1` (anchors are
/// frames where the target and the whole cluster are valid), two rigid fits
/// map the cluster configuration at `f0` and at `f1` onto the configuration
/// at `f`; each transform is applied to the target's position at its bracket
/// frame and the two predictions are blended linearly by frame distance.
///
/// A frame is skipped when either bracket is missing (gaps touching the
/// anchor sequence ends are never filled) or when any cluster marker drops
/// out anywhere inside the closed span `[f0, f1]` — this strategy trusts
/// only fully intact spans. More conservative than
/// [`crate::fill::rigid_recovery::recover`], but numerically more faithful:
/// geometry is refit per frame instead of composed from frame-to-frame
/// rotations.
///
/// Arguments
/// ---------
/// * `target`: trajectory to repair, mutated in place
/// * `cluster`: at least three reference trajectories, all target-length
///
/// Return
/// ------
/// * The [`FillReport`]; `updated` is `false` with
///   [`SkipReason::NoRepairableFrame`] when every candidate failed the span
///   requirements.
pub fn fill(target: &mut Trajectory, cluster: &[Trajectory]) -> Result<FillReport, RetrackError> {
    check_lengths(target, cluster)?;
    if cluster.len() < 3 {
        return Err(RetrackError::ClusterTooSmall {
            needed: 3,
            got: cluster.len(),
        });
    }

    let valid_frames = match target_precondition(target) {
        Ok(count) => count,
        Err(report) => return Ok(report),
    };
    let sets = match cluster_frame_sets(target, cluster, valid_frames) {
        Ok(sets) => sets,
        Err(report) => return Ok(report),
    };

    let cluster_at = |f: usize| -> Vec<_> { cluster.iter().map(|m| m.positions[f]).collect() };

    let mut updated = false;
    for &frame in &sets.candidates {
        let idx = sets.anchors.partition_point(|&a| a < frame);
        if idx == 0 || idx == sets.anchors.len() {
            continue;
        }
        let f0 = sets.anchors[idx - 1];
        let f1 = sets.anchors[idx];
        if (f0..=f1).any(|f| !sets.cluster_valid[f]) {
            continue;
        }

        let config_f = cluster_at(frame);
        let Ok(fit0) = rigid_fit(&cluster_at(f0), &config_f) else {
            continue;
        };
        let Ok(fit1) = rigid_fit(&cluster_at(f1), &config_f) else {
            continue;
        };

        let from_f0 = fit0.apply(target.positions[f0]);
        let from_f1 = fit1.apply(target.positions[f1]);
        let t = (frame - f0) as f64 / (f1 - f0) as f64;
        target.mark_repaired(frame, from_f0 + (from_f1 - from_f0) * t);
        updated = true;
    }

    if updated {
        Ok(FillReport::updated(target.valid_frame_count()))
    } else {
        Ok(FillReport::skipped(
            SkipReason::NoRepairableFrame,
            valid_frames,
        ))
    }
}

#[cfg(test)]
mod rigid_gap_test {
    use super::*;
    use approx::assert_relative_eq;

    use crate::constants::BLOCKED_RESIDUAL;
    use crate::fill::SkipReason;
    use nalgebra::{Rotation3, Vector3};

    fn rigid_scene(n: usize) -> (Trajectory, Vec<Trajectory>) {
        let body = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.2),
            Vector3::new(0.3, 1.2, 0.0),
        ];
        let target_body = Vector3::new(0.6, 0.5, 0.8);

        let mut cluster_pos: Vec<Vec<Vector3<f64>>> = vec![Vec::new(); 3];
        let mut target_pos = Vec::new();
        for f in 0..n {
            let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), 0.05 * f as f64);
            let shift = Vector3::new(0.01 * f as f64, -0.004 * f as f64, 0.0);
            for (series, &p) in cluster_pos.iter_mut().zip(&body) {
                series.push(rot * p + shift);
            }
            target_pos.push(rot * target_body + shift);
        }

        let cluster = cluster_pos
            .into_iter()
            .map(|p| Trajectory::new(p, vec![0.0; n]).unwrap())
            .collect();
        let target = Trajectory::new(target_pos, vec![0.0; n]).unwrap();
        (target, cluster)
    }

    #[test]
    fn repairs_an_interior_gap_within_tolerance() {
        let (mut target, cluster) = rigid_scene(100);
        let truth = target.clone();
        for f in 40..=45 {
            target.residuals[f] = BLOCKED_RESIDUAL;
            target.positions[f] = Vector3::zeros();
        }

        let report = fill(&mut target, &cluster).unwrap();
        assert!(report.updated);
        assert_eq!(report.valid_frames, 100);
        for f in 40..=45 {
            assert!(
                (target.positions[f] - truth.positions[f]).norm() < 1e-3,
                "frame {f} off by {}",
                (target.positions[f] - truth.positions[f]).norm()
            );
        }
    }

    #[test]
    fn boundary_candidates_are_never_filled() {
        let (mut target, cluster) = rigid_scene(20);
        for f in 0..3 {
            target.residuals[f] = BLOCKED_RESIDUAL;
        }
        for f in 17..20 {
            target.residuals[f] = BLOCKED_RESIDUAL;
        }

        let report = fill(&mut target, &cluster).unwrap();
        assert!(!report.updated);
        assert_eq!(report.skipped, Some(SkipReason::NoRepairableFrame));
        assert_eq!(report.valid_frames, 14);
    }

    #[test]
    fn broken_span_is_skipped() {
        let (mut target, mut cluster) = rigid_scene(30);
        for f in 10..=12 {
            target.residuals[f] = BLOCKED_RESIDUAL;
        }
        // One cluster marker drops out inside the span [9, 13].
        cluster[2].residuals[11] = BLOCKED_RESIDUAL;

        let report = fill(&mut target, &cluster).unwrap();
        // Frames 10 and 12 have brackets (9,13)... but the span contains the
        // cluster dropout at 11, so nothing qualifies.
        assert!(!report.updated);
        assert_eq!(report.skipped, Some(SkipReason::NoRepairableFrame));
        assert!(!target.is_valid(10));
        assert!(!target.is_valid(11));
        assert!(!target.is_valid(12));
    }

    #[test]
    fn exact_reconstruction_on_noise_free_rigid_motion() {
        let (mut target, cluster) = rigid_scene(50);
        let truth = target.clone();
        target.residuals[25] = BLOCKED_RESIDUAL;

        fill(&mut target, &cluster).unwrap();
        assert_relative_eq!(
            (target.positions[25] - truth.positions[25]).norm(),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn degenerate_targets_are_no_ops() {
        let (mut target, cluster) = rigid_scene(10);
        let report = fill(&mut target, &cluster).unwrap();
        assert_eq!(report.skipped, Some(SkipReason::AllFramesValid));
    }

    #[test]
    fn short_cluster_is_a_hard_error() {
        let (mut target, cluster) = rigid_scene(10);
        target.residuals[4] = BLOCKED_RESIDUAL;
        let err = fill(&mut target, &cluster[..2]).unwrap_err();
        assert_eq!(err, RetrackError::ClusterTooSmall { needed: 3, got: 2 });
    }
}
