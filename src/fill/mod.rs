//! # Gap-fill strategies
//!
//! Five independent strategies repair a target marker's blocked frames:
//!
//! - [`relative`] – local-frame offset interpolation over a marker cluster
//! - [`rigid_recovery`] – frame-to-frame rotated world offsets over a cluster
//! - [`rigid_gap`] – per-frame Procrustes refits over fully intact spans
//! - [`pattern`] – donor-marker offset transfer
//! - [`spline_gap`] – per-gap spline interpolation of the target itself
//!
//! All strategies share the same contract: they reject degenerate targets
//! (fully valid or fully blocked) before doing any work, repair what the
//! data supports, stamp repaired frames with residual 0, and leave
//! unrepairable frames blocked. The outcome is a [`FillReport`].

pub mod pattern;
pub mod relative;
pub mod rigid_gap;
pub mod rigid_recovery;
pub mod spline_gap;

use std::fmt;

use crate::constants::FrameIndex;
use crate::retrack_errors::RetrackError;
use crate::trajectory::Trajectory;

/// Why a strategy declined to update the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The target has no valid frame at all; nothing to anchor on.
    NoValidFrames,
    /// The target is already fully valid; nothing to repair.
    AllFramesValid,
    /// Target and cluster (or donor) share no valid frame.
    NoCommonValidFrame,
    /// The cluster is never valid on a blocked target frame.
    ClusterNotHelpful,
    /// The donor marker has no valid frame.
    DonorNeverValid,
    /// Every candidate frame failed its per-frame requirements.
    NoRepairableFrame,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::NoValidFrames => "no valid target marker frame",
            SkipReason::AllFramesValid => "all target marker frames valid",
            SkipReason::NoCommonValidFrame => "no common valid frame among markers",
            SkipReason::ClusterNotHelpful => "cluster markers not helpful",
            SkipReason::DonorNeverValid => "donor marker has no valid frame",
            SkipReason::NoRepairableFrame => "no frame could be repaired",
        };
        f.write_str(text)
    }
}

/// Outcome of one strategy invocation.
///
/// # Fields
///
/// * `updated` - `true` when at least one frame was repaired
/// * `valid_frames` - target valid-frame count after the operation
/// * `skipped` - diagnostic reason when `updated` is `false`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillReport {
    pub updated: bool,
    pub valid_frames: usize,
    pub skipped: Option<SkipReason>,
}

impl FillReport {
    pub(crate) fn updated(valid_frames: usize) -> Self {
        FillReport {
            updated: true,
            valid_frames,
            skipped: None,
        }
    }

    pub(crate) fn skipped(reason: SkipReason, valid_frames: usize) -> Self {
        FillReport {
            updated: false,
            valid_frames,
            skipped: Some(reason),
        }
    }
}

/// Degenerate-target check shared by every strategy.
///
/// Returns the applicable [`SkipReason`] when the target is fully blocked or
/// fully valid, together with the current valid count.
pub(crate) fn target_precondition(target: &Trajectory) -> Result<usize, FillReport> {
    let valid_frames = target.valid_frame_count();
    if valid_frames == 0 {
        return Err(FillReport::skipped(SkipReason::NoValidFrames, valid_frames));
    }
    if valid_frames == target.len() {
        return Err(FillReport::skipped(SkipReason::AllFramesValid, valid_frames));
    }
    Ok(valid_frames)
}

/// Validate that every companion trajectory spans the target's frame range.
pub(crate) fn check_lengths<'a, I>(target: &Trajectory, others: I) -> Result<(), RetrackError>
where
    I: IntoIterator<Item = &'a Trajectory>,
{
    for other in others {
        if other.len() != target.len() {
            return Err(RetrackError::TrajectoryLengthMismatch {
                expected: target.len(),
                got: other.len(),
            });
        }
    }
    Ok(())
}

/// Per-frame AND of every cluster marker's validity.
pub(crate) fn cluster_validity(cluster: &[Trajectory], n_frames: usize) -> Vec<bool> {
    let mut mask = vec![true; n_frames];
    for marker in cluster {
        for (frame, flag) in mask.iter_mut().enumerate() {
            *flag &= marker.is_valid(frame);
        }
    }
    mask
}

/// Frames shared by the cluster-driven strategies.
///
/// `anchors` are the frames where the whole cluster *and* the target are
/// valid; `candidates` are the frames where the cluster is valid but the
/// target is blocked — the only frames those strategies can repair.
#[derive(Debug)]
pub(crate) struct ClusterFrameSets {
    pub anchors: Vec<FrameIndex>,
    pub candidates: Vec<FrameIndex>,
    pub cluster_valid: Vec<bool>,
}

/// Derive anchor/candidate frame sets, applying the shared skip rules.
pub(crate) fn cluster_frame_sets(
    target: &Trajectory,
    cluster: &[Trajectory],
    valid_frames: usize,
) -> Result<ClusterFrameSets, FillReport> {
    let cluster_valid = cluster_validity(cluster, target.len());

    let anchors: Vec<FrameIndex> = (0..target.len())
        .filter(|&f| cluster_valid[f] && target.is_valid(f))
        .collect();
    if anchors.is_empty() {
        return Err(FillReport::skipped(
            SkipReason::NoCommonValidFrame,
            valid_frames,
        ));
    }

    let candidates: Vec<FrameIndex> = (0..target.len())
        .filter(|&f| cluster_valid[f] && !target.is_valid(f))
        .collect();
    if candidates.is_empty() {
        return Err(FillReport::skipped(
            SkipReason::ClusterNotHelpful,
            valid_frames,
        ));
    }

    Ok(ClusterFrameSets {
        anchors,
        candidates,
        cluster_valid,
    })
}
