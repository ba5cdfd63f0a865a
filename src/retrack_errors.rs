use thiserror::Error;

/// Errors surfaced by the trajectory store adapter and the gap-fill engine.
///
/// Shape errors abort the whole operation with no mutation; data-dependent
/// shortfalls (nothing to repair, unhelpful cluster, …) are *not* errors and
/// are reported through [`crate::fill::SkipReason`] instead.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RetrackError {
    #[error("Marker not found in the trajectory store: {0}")]
    MarkerNotFound(String),

    #[error("Trajectory length mismatch: expected {expected} frames, got {got}")]
    TrajectoryLengthMismatch { expected: usize, got: usize },

    #[error("Cluster too small: {needed} markers required, got {got}")]
    ClusterTooSmall { needed: usize, got: usize },

    #[error("Point set size mismatch in rigid fit: {left} vs {right}")]
    PointSetMismatch { left: usize, right: usize },

    #[error("Too few points: {needed} required, got {got}")]
    TooFewPoints { needed: usize, got: usize },

    #[error("SVD of the cross-covariance matrix did not converge")]
    SvdFailed,

    #[error("Spline degree must be at least 1, got {0}")]
    InvalidSplineDegree(usize),

    #[error("Spline collocation system is singular")]
    SingularInterpolation,
}
