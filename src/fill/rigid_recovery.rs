//! Rigid-body recovery: world offsets carried between frames by the cluster
//! frame's relative rotation.

use nalgebra::Vector3;

use crate::fill::{check_lengths, cluster_frame_sets, target_precondition, FillReport};
use crate::retrack_errors::RetrackError;
use crate::rigid::{build_frames, select_reference_markers};
use crate::trajectory::Trajectory;

/// Recover blocked target frames by rotating the target's world offset from
/// an anchor frame into the blocked frame's orientation.
///
/// Differs from [`crate::fill::relative::recover`] in what gets
/// interpolated: instead of a frame-local coordinate, the raw world offset
/// `v = target − origin` at an anchor frame `f0` is carried to the blocked
/// frame `f` through the relative rotation `R(f)·R(f0)ᵀ`, and likewise from
/// the anchor on the other side. The two predictions are blended with
/// frame-distance weights; at the ends of the anchor sequence only the
/// one-sided prediction is used.
///
/// Arguments
/// ---------
/// * `target`: trajectory to repair, mutated in place
/// * `cluster`: at least three reference trajectories, all target-length
///
/// Return
/// ------
/// * The [`FillReport`]; shape problems are hard errors with no mutation.
pub fn recover(
    target: &mut Trajectory,
    cluster: &[Trajectory],
) -> Result<FillReport, RetrackError> {
    check_lengths(target, cluster)?;
    let references = select_reference_markers(target, cluster)?;

    let valid_frames = match target_precondition(target) {
        Ok(count) => count,
        Err(report) => return Ok(report),
    };
    let sets = match cluster_frame_sets(target, cluster, valid_frames) {
        Ok(sets) => sets,
        Err(report) => return Ok(report),
    };

    let frames = build_frames(
        &cluster[references[0]].positions,
        &cluster[references[1]].positions,
        &cluster[references[2]].positions,
    );

    // World offset from the frame origin, meaningful at anchor frames only.
    let offset = |f: usize| -> Vector3<f64> { target.positions[f] - frames[f].origin };
    let carried = |f: usize, anchor: usize| -> Vector3<f64> {
        frames[f].rotation * (frames[anchor].rotation.transpose() * offset(anchor))
    };

    let mut repaired = Vec::with_capacity(sets.candidates.len());
    for &frame in &sets.candidates {
        let idx = sets.anchors.partition_point(|&a| a < frame);
        let predicted = if idx == 0 {
            carried(frame, sets.anchors[0])
        } else if idx == sets.anchors.len() {
            carried(frame, sets.anchors[idx - 1])
        } else {
            let f0 = sets.anchors[idx - 1];
            let f1 = sets.anchors[idx];
            let a = (frame - f0) as f64;
            let b = (f1 - frame) as f64;
            (b * carried(frame, f0) + a * carried(frame, f1)) / (a + b)
        };
        repaired.push((frame, frames[frame].origin + predicted));
    }
    for (frame, position) in repaired {
        target.mark_repaired(frame, position);
    }

    Ok(FillReport::updated(target.valid_frame_count()))
}

#[cfg(test)]
mod rigid_recovery_test {
    use super::*;
    use approx::assert_relative_eq;

    use crate::constants::BLOCKED_RESIDUAL;
    use crate::fill::SkipReason;
    use nalgebra::Rotation3;

    fn rigid_scene(n: usize) -> (Trajectory, Vec<Trajectory>) {
        let body = [
            Vector3::new(0.1, 0.0, 0.0),
            Vector3::new(1.1, 0.2, 0.0),
            Vector3::new(0.0, 1.3, 0.1),
        ];
        let target_body = Vector3::new(0.5, 0.4, 1.0);

        let mut cluster_pos: Vec<Vec<Vector3<f64>>> = vec![Vec::new(); 3];
        let mut target_pos = Vec::new();
        for f in 0..n {
            let rot = Rotation3::from_axis_angle(&Vector3::y_axis(), 0.03 * f as f64);
            let shift = Vector3::new(0.002 * f as f64, 0.0, 0.0);
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
    fn repairs_an_interior_gap_exactly() {
        let (mut target, cluster) = rigid_scene(50);
        let truth = target.clone();
        for f in 15..=22 {
            target.residuals[f] = BLOCKED_RESIDUAL;
        }

        let report = recover(&mut target, &cluster).unwrap();
        assert!(report.updated);
        assert_eq!(report.valid_frames, 50);
        for f in 15..=22 {
            assert_relative_eq!(
                (target.positions[f] - truth.positions[f]).norm(),
                0.0,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn one_sided_prediction_at_the_sequence_end() {
        let (mut target, cluster) = rigid_scene(30);
        let truth = target.clone();
        for f in 26..30 {
            target.residuals[f] = BLOCKED_RESIDUAL;
        }

        let report = recover(&mut target, &cluster).unwrap();
        assert!(report.updated);
        for f in 26..30 {
            assert!(target.is_valid(f));
            assert_relative_eq!(
                (target.positions[f] - truth.positions[f]).norm(),
                0.0,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn anchor_configuration_is_reproduced_at_zero_distance() {
        // One blocked frame directly between two anchors one frame away on
        // each side: the blend weights hit the anchors exactly, and a rigid
        // scene makes both one-sided predictions identical to the truth.
        let (mut target, cluster) = rigid_scene(9);
        let truth = target.positions[4];
        target.residuals[4] = BLOCKED_RESIDUAL;
        target.positions[4] = Vector3::zeros();

        recover(&mut target, &cluster).unwrap();
        assert_relative_eq!((target.positions[4] - truth).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn cluster_blocked_frames_stay_blocked() {
        let (mut target, mut cluster) = rigid_scene(20);
        target.residuals[8] = BLOCKED_RESIDUAL;
        target.residuals[9] = BLOCKED_RESIDUAL;
        cluster[0].residuals[9] = BLOCKED_RESIDUAL;

        let report = recover(&mut target, &cluster).unwrap();
        assert!(report.updated);
        assert!(target.is_valid(8));
        assert!(!target.is_valid(9));
        assert_eq!(report.valid_frames, 19);
    }

    #[test]
    fn no_op_on_degenerate_targets() {
        let (mut target, cluster) = rigid_scene(10);
        let report = recover(&mut target, &cluster).unwrap();
        assert_eq!(report.skipped, Some(SkipReason::AllFramesValid));

        target.residuals = vec![BLOCKED_RESIDUAL; 10];
        let report = recover(&mut target, &cluster).unwrap();
        assert_eq!(report.skipped, Some(SkipReason::NoValidFrames));
    }
}
