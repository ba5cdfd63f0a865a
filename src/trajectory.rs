//! # Marker trajectories and validity analysis
//!
//! A [`Trajectory`] is the in-memory form of one marker's time series: a 3D
//! position and a scalar residual per frame. The residual doubles as the
//! validity flag — a value within tolerance of −1 marks the frame as blocked
//! (see [`crate::constants::is_blocked`]).
//!
//! This module also derives the structures every gap-fill strategy starts
//! from: the per-frame validity mask, the valid-frame count, and the list of
//! contiguous invalid runs ([`Gap`]).

use nalgebra::Vector3;

use crate::constants::{is_blocked, FrameIndex};
use crate::retrack_errors::RetrackError;

/// A maximal run of consecutive invalid frames, as a closed integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    /// First invalid frame of the run.
    pub start: FrameIndex,
    /// Last invalid frame of the run (inclusive).
    pub end: FrameIndex,
}

impl Gap {
    /// Number of frames covered by the gap.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// `true` when the gap touches the first or last frame of a trajectory
    /// with `n_frames` frames.
    pub fn touches_boundary(&self, n_frames: usize) -> bool {
        self.start == 0 || self.end + 1 == n_frames
    }
}

/// One marker's full time series: a position and a residual per frame.
///
/// # Fields
///
/// * `positions` - 3D position per frame
/// * `residuals` - scalar residual per frame; −1 marks a blocked frame
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub positions: Vec<Vector3<f64>>,
    pub residuals: Vec<f64>,
}

impl Trajectory {
    /// Create a trajectory from parallel position and residual series.
    ///
    /// Arguments
    /// ---------
    /// * `positions`: one 3D position per frame
    /// * `residuals`: one residual per frame, same length as `positions`
    ///
    /// Return
    /// ------
    /// * The trajectory, or [`RetrackError::TrajectoryLengthMismatch`] when
    ///   the two series disagree in length.
    pub fn new(positions: Vec<Vector3<f64>>, residuals: Vec<f64>) -> Result<Self, RetrackError> {
        if positions.len() != residuals.len() {
            return Err(RetrackError::TrajectoryLengthMismatch {
                expected: positions.len(),
                got: residuals.len(),
            });
        }
        Ok(Trajectory {
            positions,
            residuals,
        })
    }

    /// Number of frames in the trajectory.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// `true` when the trajectory holds no frames.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// `true` when the frame carries tracked data.
    #[inline]
    pub fn is_valid(&self, frame: FrameIndex) -> bool {
        !is_blocked(self.residuals[frame])
    }

    /// Per-frame validity mask, `true` for tracked frames.
    pub fn valid_mask(&self) -> Vec<bool> {
        self.residuals.iter().map(|&r| !is_blocked(r)).collect()
    }

    /// Number of tracked frames.
    pub fn valid_frame_count(&self) -> usize {
        self.residuals.iter().filter(|&&r| !is_blocked(r)).count()
    }

    /// Contiguous runs of invalid frames, in frame order.
    ///
    /// Each returned [`Gap`] is maximal: the frames immediately before
    /// `start` and after `end` are either valid or outside the trajectory.
    pub fn gaps(&self) -> Vec<Gap> {
        let mut gaps = Vec::new();
        let mut run_start: Option<FrameIndex> = None;
        for frame in 0..self.len() {
            if self.is_valid(frame) {
                if let Some(start) = run_start.take() {
                    gaps.push(Gap {
                        start,
                        end: frame - 1,
                    });
                }
            } else if run_start.is_none() {
                run_start = Some(frame);
            }
        }
        if let Some(start) = run_start {
            gaps.push(Gap {
                start,
                end: self.len() - 1,
            });
        }
        gaps
    }

    /// Mark `frame` as repaired: residual drops to 0.
    pub(crate) fn mark_repaired(&mut self, frame: FrameIndex, position: Vector3<f64>) {
        self.positions[frame] = position;
        self.residuals[frame] = 0.0;
    }
}
