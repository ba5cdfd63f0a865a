//! Per-frame local coordinate frames built from three cluster markers.

use itertools::{izip, Itertools};
use nalgebra::{Matrix3, Vector3};

use crate::retrack_errors::RetrackError;
use crate::trajectory::Trajectory;

/// Normalize `v`, leaving a degenerate (zero-length) vector untouched.
///
/// The guard keeps NaN/∞ out of the frame construction; frames built from
/// degenerate geometry are excluded by the callers' validity masks, never
/// consumed.
#[inline]
fn unit_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    let norm = v.norm();
    if norm > 0.0 {
        v / norm
    } else {
        v
    }
}

/// Orthonormal local frame at one capture frame.
///
/// # Fields
///
/// * `origin` - position of the first reference marker
/// * `rotation` - columns are the local x̂, ŷ, ẑ axes expressed in world
///   coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterFrame {
    pub origin: Vector3<f64>,
    pub rotation: Matrix3<f64>,
}

impl ClusterFrame {
    /// Build the frame from the three reference marker positions.
    ///
    /// Arguments
    /// ---------
    /// * `p0`: first reference, becomes the origin
    /// * `p1`: second reference, fixes the x̂ direction
    /// * `p2`: third reference, fixes the x̂–ẑ plane
    ///
    /// Return
    /// ------
    /// * The frame with rotation columns `[x̂, ŷ, ẑ]` where
    ///   x̂ = unit(p1−p0), ẑ = unit(x̂ × unit(p2−p0)), ŷ = ẑ × x̂.
    pub fn from_references(p0: Vector3<f64>, p1: Vector3<f64>, p2: Vector3<f64>) -> Self {
        let x_axis = unit_or_zero(p1 - p0);
        let z_axis = unit_or_zero(x_axis.cross(&unit_or_zero(p2 - p0)));
        let y_axis = z_axis.cross(&x_axis);
        ClusterFrame {
            origin: p0,
            rotation: Matrix3::from_columns(&[x_axis, y_axis, z_axis]),
        }
    }

    /// Express a world-space point in this frame's local coordinates.
    #[inline]
    pub fn to_local(&self, world: Vector3<f64>) -> Vector3<f64> {
        self.rotation.transpose() * (world - self.origin)
    }

    /// Express a local-coordinate point back in world space.
    #[inline]
    pub fn to_world(&self, local: Vector3<f64>) -> Vector3<f64> {
        self.origin + self.rotation * local
    }
}

/// Build one [`ClusterFrame`] per capture frame from three reference series.
///
/// The series must share the same length; frames where any reference is
/// invalid are still built (geometry may be garbage there) and must be
/// excluded by the caller's validity mask.
pub fn build_frames(
    p0: &[Vector3<f64>],
    p1: &[Vector3<f64>],
    p2: &[Vector3<f64>],
) -> Vec<ClusterFrame> {
    izip!(p0, p1, p2)
        .map(|(&a, &b, &c)| ClusterFrame::from_references(a, b, c))
        .collect()
}

/// Pick the three cluster markers nearest to the target.
///
/// For each cluster marker the mean Euclidean distance to the target is
/// computed over the frames where **both** markers are valid; markers sharing
/// no valid frame with the target rank last. The ascending sort is stable, so
/// distance ties keep the caller's input order.
///
/// Arguments
/// ---------
/// * `target`: the marker being repaired
/// * `cluster`: candidate reference trajectories, all target-length
///
/// Return
/// ------
/// * Indices into `cluster` of the three nearest markers, nearest first, or
///   [`RetrackError::ClusterTooSmall`] when fewer than three candidates are
///   supplied.
pub fn select_reference_markers(
    target: &Trajectory,
    cluster: &[Trajectory],
) -> Result<[usize; 3], RetrackError> {
    if cluster.len() < 3 {
        return Err(RetrackError::ClusterTooSmall {
            needed: 3,
            got: cluster.len(),
        });
    }

    let mean_distance = |candidate: &Trajectory| -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for frame in 0..target.len() {
            if target.is_valid(frame) && candidate.is_valid(frame) {
                sum += (candidate.positions[frame] - target.positions[frame]).norm();
                count += 1;
            }
        }
        if count > 0 {
            sum / count as f64
        } else {
            f64::INFINITY
        }
    };

    let ranked: Vec<usize> = cluster
        .iter()
        .map(mean_distance)
        .enumerate()
        .sorted_by(|(_, da), (_, db)| da.total_cmp(db))
        .map(|(idx, _)| idx)
        .collect();

    Ok([ranked[0], ranked[1], ranked[2]])
}
