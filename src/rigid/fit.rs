//! Procrustes/Kabsch rigid alignment between two point configurations.

use nalgebra::{Matrix3, Vector3};

use crate::retrack_errors::RetrackError;

/// Result of a rigid fit mapping point set A onto point set B.
///
/// # Fields
///
/// * `rotation` - proper rotation (det = +1) applied to A
/// * `translation` - translation applied after the rotation
/// * `residuals` - per-point error vectors `R·Aᵢ + L − Bᵢ`
/// * `residual_norms` - Euclidean norm of each error vector
/// * `mean_residual` - mean of `residual_norms`
#[derive(Debug, Clone, PartialEq)]
pub struct RigidFit {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    pub residuals: Vec<Vector3<f64>>,
    pub residual_norms: Vec<f64>,
    pub mean_residual: f64,
}

impl RigidFit {
    /// Apply the fitted transform to a point.
    #[inline]
    pub fn apply(&self, point: Vector3<f64>) -> Vector3<f64> {
        self.rotation * point + self.translation
    }
}

/// Solve for the rigid rotation + translation minimizing Σ‖R·Aᵢ+L−Bᵢ‖².
///
/// Both point sets are centered on their own centroids, the cross-covariance
/// matrix `C = Σ (Bᵢ−B̄)(Aᵢ−Ā)ᵀ` is decomposed by SVD, and the raw product
/// `U·Vᵀ` is corrected to a proper rotation by flipping the sign of the
/// smallest singular direction whenever its determinant is −1. The solver
/// therefore never returns a reflection, even for degenerate or mirrored
/// configurations.
///
/// Arguments
/// ---------
/// * `a`: source configuration, one point per reference marker
/// * `b`: destination configuration, same length as `a`
///
/// Return
/// ------
/// * The [`RigidFit`], or an error when the sets differ in size, hold fewer
///   than three points, or the decomposition fails to converge.
///
/// # See also
/// * [`crate::fill::rigid_gap`] – refits cluster geometry at every repaired
///   frame with this solver
pub fn rigid_fit(a: &[Vector3<f64>], b: &[Vector3<f64>]) -> Result<RigidFit, RetrackError> {
    if a.len() != b.len() {
        return Err(RetrackError::PointSetMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.len() < 3 {
        return Err(RetrackError::TooFewPoints {
            needed: 3,
            got: a.len(),
        });
    }

    let n = a.len() as f64;
    let centroid_a: Vector3<f64> = a.iter().sum::<Vector3<f64>>() / n;
    let centroid_b: Vector3<f64> = b.iter().sum::<Vector3<f64>>() / n;

    let mut cross_cov = Matrix3::zeros();
    for (pa, pb) in a.iter().zip(b) {
        cross_cov += (pb - centroid_b) * (pa - centroid_a).transpose();
    }

    let svd = cross_cov.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(RetrackError::SvdFailed);
    };

    // Reflection correction: det(U·Vᵀ) is ±1; a −1 product flips the axis of
    // the smallest singular value.
    let det = (u * v_t).determinant();
    let rotation = u * Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, det)) * v_t;
    let translation = centroid_b - rotation * centroid_a;

    let residuals: Vec<Vector3<f64>> = a
        .iter()
        .zip(b)
        .map(|(pa, pb)| rotation * pa + translation - pb)
        .collect();
    let residual_norms: Vec<f64> = residuals.iter().map(Vector3::norm).collect();
    let mean_residual = residual_norms.iter().sum::<f64>() / n;

    Ok(RigidFit {
        rotation,
        translation,
        residuals,
        residual_norms,
        mean_residual,
    })
}
