//! Pattern gap fill: donor-marker offset transfer.

use nalgebra::Vector3;

use crate::constants::FrameIndex;
use crate::fill::{check_lengths, target_precondition, FillReport, SkipReason};
use crate::retrack_errors::RetrackError;
use crate::trajectory::Trajectory;

/// Fill blocked target frames using a donor marker that moves with a fixed
/// offset relative to the target over short spans.
///
/// Anchors are the frames where target and donor are both valid. For a
/// blocked frame `f` strictly inside a bracket `(f0, f1)` with the donor
/// valid across the whole closed span, both target and donor are linearly
/// interpolated at `f` from their bracket values, and the interpolated
/// offset is added to the donor's *actual* position:
///
/// ```text
/// target(f) = donor(f) + (lerp(target, f0, f1, f) − lerp(donor, f0, f1, f))
/// ```
///
/// This keeps the target-donor relative geometry while honoring the donor's
/// true motion at the repaired frame.
///
/// Arguments
/// ---------
/// * `target`: trajectory to repair, mutated in place
/// * `donor`: donor trajectory, target-length
///
/// Return
/// ------
/// * The [`FillReport`]; a length mismatch is a hard error with no mutation.
pub fn fill(target: &mut Trajectory, donor: &Trajectory) -> Result<FillReport, RetrackError> {
    check_lengths(target, std::iter::once(donor))?;

    let valid_frames = match target_precondition(target) {
        Ok(count) => count,
        Err(report) => return Ok(report),
    };

    if donor.valid_frame_count() == 0 {
        return Ok(FillReport::skipped(SkipReason::DonorNeverValid, valid_frames));
    }

    let anchors: Vec<FrameIndex> = (0..target.len())
        .filter(|&f| target.is_valid(f) && donor.is_valid(f))
        .collect();
    if anchors.is_empty() {
        return Ok(FillReport::skipped(
            SkipReason::NoCommonValidFrame,
            valid_frames,
        ));
    }

    let candidates: Vec<FrameIndex> = (0..target.len()).filter(|&f| !target.is_valid(f)).collect();

    let lerp = |p0: Vector3<f64>, p1: Vector3<f64>, t: f64| p0 + (p1 - p0) * t;

    let mut updated = false;
    let mut repaired = Vec::new();
    for &frame in &candidates {
        let idx = anchors.partition_point(|&a| a < frame);
        if idx == 0 || idx == anchors.len() {
            continue;
        }
        let f0 = anchors[idx - 1];
        let f1 = anchors[idx];
        if (f0..=f1).any(|f| !donor.is_valid(f)) {
            continue;
        }

        let t = (frame - f0) as f64 / (f1 - f0) as f64;
        let target_interp = lerp(target.positions[f0], target.positions[f1], t);
        let donor_interp = lerp(donor.positions[f0], donor.positions[f1], t);
        repaired.push((frame, donor.positions[frame] + (target_interp - donor_interp)));
        updated = true;
    }
    for (frame, position) in repaired {
        target.mark_repaired(frame, position);
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
