//! Relative recovery: local-frame offset interpolation over a marker cluster.

use nalgebra::Vector3;

use crate::fill::{check_lengths, cluster_frame_sets, target_precondition, FillReport};
use crate::retrack_errors::RetrackError;
use crate::rigid::{build_frames, select_reference_markers};
use crate::trajectory::Trajectory;

/// Recover blocked target frames from the target's offset expressed in a
/// cluster-local coordinate frame.
///
/// The three cluster markers nearest to the target define an orthonormal
/// local frame per capture frame. At every anchor frame (target and full
/// cluster valid) the target's local offset `Rᵀ·(target − origin)` is
/// recorded; blocked frames where the cluster is still valid get their offset
/// linearly interpolated between the two surrounding anchors — or copied from
/// the single nearest anchor when the frame lies before the first or after
/// the last anchor — and mapped back to world space through that frame's
/// rotation.
///
/// Frames where the cluster itself is blocked are left untouched.
///
/// Arguments
/// ---------
/// * `target`: trajectory to repair, mutated in place
/// * `cluster`: at least three reference trajectories, all target-length
///
/// Return
/// ------
/// * The [`FillReport`]; shape problems (short cluster, length mismatch) are
///   hard errors with no mutation.
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

    // Sparse sequence of local offsets, one per anchor frame.
    let anchor_locals: Vec<Vector3<f64>> = sets
        .anchors
        .iter()
        .map(|&f| frames[f].to_local(target.positions[f]))
        .collect();

    for &frame in &sets.candidates {
        let idx = sets.anchors.partition_point(|&a| a < frame);
        let local = if idx == 0 {
            // Before the first anchor: nearest-neighbor extrapolation.
            anchor_locals[0]
        } else if idx == sets.anchors.len() {
            anchor_locals[idx - 1]
        } else {
            let f0 = sets.anchors[idx - 1];
            let f1 = sets.anchors[idx];
            let a = (frame - f0) as f64;
            let b = (f1 - frame) as f64;
            (b * anchor_locals[idx - 1] + a * anchor_locals[idx]) / (a + b)
        };
        target.mark_repaired(frame, frames[frame].to_world(local));
    }

    Ok(FillReport::updated(target.valid_frame_count()))
}
