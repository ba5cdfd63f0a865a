//! # Orchestrator
//!
//! Store-facing entry points, one per gap-fill strategy. Each function reads
//! the trajectories it needs from a [`TrajectoryStore`], validates their
//! lengths against the store's frame range, runs the strategy on a private
//! working copy, and writes the repaired trajectory back **only** when at
//! least one frame was repaired — write-back is all-or-nothing per marker,
//! so a failed or skipped operation never leaves partial state behind.

use log::debug;

use crate::fill::{pattern, relative, rigid_gap, rigid_recovery, spline_gap, FillReport};
use crate::fill::spline_gap::SplineFillConfig;
use crate::retrack_errors::RetrackError;
use crate::store::TrajectoryStore;
use crate::trajectory::Trajectory;

/// Fetch a marker and validate it against the store's frame range.
fn fetch_checked<S: TrajectoryStore>(store: &S, name: &str) -> Result<Trajectory, RetrackError> {
    let trajectory = store.marker(name)?;
    if trajectory.len() != store.frame_count() {
        return Err(RetrackError::TrajectoryLengthMismatch {
            expected: store.frame_count(),
            got: trajectory.len(),
        });
    }
    Ok(trajectory)
}

fn write_back<S: TrajectoryStore>(
    store: &mut S,
    operation: &str,
    name: &str,
    trajectory: Trajectory,
    report: FillReport,
) -> Result<FillReport, RetrackError> {
    if report.updated {
        store.set_marker(name, trajectory)?;
        debug!(
            "{operation} of {name}: updated, {} valid frames",
            report.valid_frames
        );
    } else if let Some(reason) = report.skipped {
        debug!("{operation} of {name} skipped: {reason}");
    }
    Ok(report)
}

/// Relative recovery of `target` using `cluster` (see
/// [`crate::fill::relative::recover`]).
pub fn recover_marker_relative<S: TrajectoryStore>(
    store: &mut S,
    target: &str,
    cluster: &[&str],
) -> Result<FillReport, RetrackError> {
    let mut trajectory = fetch_checked(store, target)?;
    let cluster = fetch_cluster(store, cluster)?;
    let report = relative::recover(&mut trajectory, &cluster)?;
    write_back(store, "relative recovery", target, trajectory, report)
}

/// Rigid-body recovery of `target` using `cluster` (see
/// [`crate::fill::rigid_recovery::recover`]).
pub fn recover_marker_rigid_body<S: TrajectoryStore>(
    store: &mut S,
    target: &str,
    cluster: &[&str],
) -> Result<FillReport, RetrackError> {
    let mut trajectory = fetch_checked(store, target)?;
    let cluster = fetch_cluster(store, cluster)?;
    let report = rigid_recovery::recover(&mut trajectory, &cluster)?;
    write_back(store, "rigid-body recovery", target, trajectory, report)
}

/// Rigid-body gap fill of `target` using `cluster` (see
/// [`crate::fill::rigid_gap::fill`]).
pub fn fill_marker_gap_rigid_body<S: TrajectoryStore>(
    store: &mut S,
    target: &str,
    cluster: &[&str],
) -> Result<FillReport, RetrackError> {
    let mut trajectory = fetch_checked(store, target)?;
    let cluster = fetch_cluster(store, cluster)?;
    let report = rigid_gap::fill(&mut trajectory, &cluster)?;
    write_back(store, "rigid-body gap fill", target, trajectory, report)
}

/// Pattern gap fill of `target` using `donor` (see
/// [`crate::fill::pattern::fill`]).
pub fn fill_marker_gap_pattern<S: TrajectoryStore>(
    store: &mut S,
    target: &str,
    donor: &str,
) -> Result<FillReport, RetrackError> {
    let mut trajectory = fetch_checked(store, target)?;
    let donor_trajectory = fetch_checked(store, donor)?;
    let report = pattern::fill(&mut trajectory, &donor_trajectory)?;
    write_back(store, "pattern gap fill", target, trajectory, report)
}

/// Spline gap fill of `target` (see [`crate::fill::spline_gap::fill`]).
pub fn fill_marker_gap_spline<S: TrajectoryStore>(
    store: &mut S,
    target: &str,
    config: &SplineFillConfig,
) -> Result<FillReport, RetrackError> {
    let mut trajectory = fetch_checked(store, target)?;
    let report = spline_gap::fill(&mut trajectory, config)?;
    write_back(store, "spline gap fill", target, trajectory, report)
}

fn fetch_cluster<S: TrajectoryStore>(
    store: &S,
    names: &[&str],
) -> Result<Vec<Trajectory>, RetrackError> {
    names.iter().map(|name| fetch_checked(store, name)).collect()
}
