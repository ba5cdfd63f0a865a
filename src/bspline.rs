//! # Interpolating B-splines
//!
//! Numeric backend for the spline gap-fill strategy: a one-dimensional
//! degree-`k` B-spline passing exactly through every supplied site/value
//! pair. The knot vector is clamped at both ends with interior knots placed
//! by the standard averaging rule, which keeps the collocation matrix
//! banded and non-singular for strictly increasing sites
//! (Schoenberg–Whitney). The collocation system is solved once at
//! construction; evaluation runs the usual triangular basis recursion.
//!
//! Queries outside the fitted domain are clamped to the nearest edge first,
//! so the spline holds its boundary value instead of extrapolating.

use nalgebra::{DMatrix, DVector};

use crate::retrack_errors::RetrackError;

/// A fitted one-dimensional interpolating B-spline.
#[derive(Debug, Clone, PartialEq)]
pub struct BSpline {
    degree: usize,
    knots: Vec<f64>,
    coeffs: Vec<f64>,
    domain: (f64, f64),
}

impl BSpline {
    /// Fit a degree-`degree` spline through `(sites[i], values[i])`.
    ///
    /// Arguments
    /// ---------
    /// * `sites`: strictly increasing abscissae (frame indices in practice)
    /// * `values`: ordinates, same length as `sites`
    /// * `degree`: spline degree `k ≥ 1`; requires at least `k + 1` sites
    ///
    /// Return
    /// ------
    /// * The fitted spline, or an error when the sites are too few or the
    ///   collocation system cannot be solved.
    pub fn interpolate(
        sites: &[f64],
        values: &[f64],
        degree: usize,
    ) -> Result<Self, RetrackError> {
        if sites.len() != values.len() {
            return Err(RetrackError::PointSetMismatch {
                left: sites.len(),
                right: values.len(),
            });
        }
        if degree == 0 {
            return Err(RetrackError::InvalidSplineDegree(0));
        }
        let n = sites.len();
        if n < degree + 1 {
            return Err(RetrackError::TooFewPoints {
                needed: degree + 1,
                got: n,
            });
        }
        debug_assert!(
            sites.windows(2).all(|w| w[0] < w[1]),
            "sites must be strictly increasing"
        );

        let knots = averaged_knots(sites, degree);

        // Collocation matrix: row i holds the k+1 basis functions that are
        // nonzero at sites[i].
        let mut collocation = DMatrix::zeros(n, n);
        for (row, &x) in sites.iter().enumerate() {
            let span = find_span(&knots, degree, n, x);
            let basis = nonzero_basis(&knots, degree, span, x);
            for (offset, &value) in basis.iter().enumerate() {
                collocation[(row, span - degree + offset)] = value;
            }
        }

        let coeffs = collocation
            .lu()
            .solve(&DVector::from_column_slice(values))
            .ok_or(RetrackError::SingularInterpolation)?;

        Ok(BSpline {
            degree,
            knots,
            coeffs: coeffs.iter().copied().collect(),
            domain: (sites[0], sites[n - 1]),
        })
    }

    /// Evaluate the spline at `x`.
    ///
    /// Queries outside the fitted domain hold the nearest edge value.
    pub fn eval(&self, x: f64) -> f64 {
        let x = x.clamp(self.domain.0, self.domain.1);
        let n = self.coeffs.len();
        let span = find_span(&self.knots, self.degree, n, x);
        let basis = nonzero_basis(&self.knots, self.degree, span, x);
        basis
            .iter()
            .enumerate()
            .map(|(offset, &value)| value * self.coeffs[span - self.degree + offset])
            .sum()
    }

    /// Inclusive abscissa range the spline was fitted over.
    pub fn domain(&self) -> (f64, f64) {
        (self.domain.0, self.domain.1)
    }
}

/// Clamped knot vector with interior knots by the averaging rule:
/// `t[k+j] = mean(sites[j..j+k])` for `j = 1..n−k−1`.
fn averaged_knots(sites: &[f64], degree: usize) -> Vec<f64> {
    let n = sites.len();
    let mut knots = Vec::with_capacity(n + degree + 1);
    knots.extend(std::iter::repeat(sites[0]).take(degree + 1));
    for j in 1..n - degree {
        let window = &sites[j..j + degree];
        knots.push(window.iter().sum::<f64>() / degree as f64);
    }
    knots.extend(std::iter::repeat(sites[n - 1]).take(degree + 1));
    knots
}

/// Index `span` of the knot interval containing `x`, clamped to the
/// non-degenerate range `[degree, n-1]` so that `knots[span] <= x` and the
/// interval is never empty for in-domain queries.
fn find_span(knots: &[f64], degree: usize, n: usize, x: f64) -> usize {
    let raw = knots.partition_point(|&t| t <= x);
    raw.saturating_sub(1).clamp(degree, n - 1)
}

/// The `degree + 1` basis functions that are nonzero on the span, evaluated
/// at `x` (triangular Cox–de Boor recursion). Entry `r` is the value of
/// basis function `span - degree + r`.
fn nonzero_basis(knots: &[f64], degree: usize, span: usize, x: f64) -> Vec<f64> {
    let mut values = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    values[0] = 1.0;
    for j in 1..=degree {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let term = if denom != 0.0 { values[r] / denom } else { 0.0 };
            values[r] = saved + right[r + 1] * term;
            saved = left[j - r] * term;
        }
        values[j] = saved;
    }
    values
}
