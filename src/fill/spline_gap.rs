//! Spline gap fill: per-gap interpolation of the target's own motion.

use crate::bspline::BSpline;
use crate::fill::{target_precondition, FillReport, SkipReason};
use crate::retrack_errors::RetrackError;
use crate::trajectory::Trajectory;

/// Tuning knobs for [`fill`].
///
/// # Fields
///
/// * `degree` - spline degree per coordinate axis
/// * `search_span_offset` - extra frames added to the half-gap-length search
///   window on each side of the gap
/// * `min_candidates` - minimum number of valid frames inside the window
///   required to attempt the fit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplineFillConfig {
    pub degree: usize,
    pub search_span_offset: usize,
    pub min_candidates: usize,
}

impl Default for SplineFillConfig {
    fn default() -> Self {
        SplineFillConfig {
            degree: 3,
            search_span_offset: 5,
            min_candidates: 10,
        }
    }
}

/// Fill each interior gap of the target by fitting one interpolating spline
/// per coordinate axis over the valid frames around the gap.
///
/// Per gap: the search window spans `ceil(gap_len / 2) + search_span_offset`
/// frames on each side of the gap, clipped to the trajectory bounds; the
/// valid frames inside it are the fit candidates. The gap is skipped
/// entirely when it touches the first or last frame (no extrapolation across
/// a hard boundary) or when fewer than
/// `max(min_candidates, degree + 1)` candidates are found. Splines hold the
/// nearest edge value outside their fitted domain, so a gap with candidates
/// on a single side still evaluates finitely.
///
/// Arguments
/// ---------
/// * `target`: trajectory to repair, mutated in place
/// * `config`: degree, window and candidate thresholds
///
/// Return
/// ------
/// * The [`FillReport`]; `updated` is `false` with
///   [`SkipReason::NoRepairableFrame`] when every gap was skipped. A zero
///   `degree` is a hard error with no mutation.
pub fn fill(
    target: &mut Trajectory,
    config: &SplineFillConfig,
) -> Result<FillReport, RetrackError> {
    if config.degree == 0 {
        return Err(RetrackError::InvalidSplineDegree(0));
    }

    let valid_frames = match target_precondition(target) {
        Ok(count) => count,
        Err(report) => return Ok(report),
    };

    let n_frames = target.len();
    let min_candidates = config.min_candidates.max(config.degree + 1);
    // Candidates are judged against the validity mask as it was before any
    // repair, so earlier gaps never feed their filled frames into later fits.
    let valid = target.valid_mask();

    let mut updated = false;
    for gap in target.gaps() {
        if gap.touches_boundary(n_frames) {
            continue;
        }

        let span = gap.len().div_ceil(2) + config.search_span_offset;
        let window_start = gap.start.saturating_sub(span);
        let window_end = (gap.end + span).min(n_frames - 1);
        let candidates: Vec<usize> = (window_start..gap.start)
            .chain(gap.end + 1..=window_end)
            .filter(|&f| valid[f])
            .collect();
        if candidates.len() < min_candidates {
            continue;
        }

        let sites: Vec<f64> = candidates.iter().map(|&f| f as f64).collect();
        let mut axis_splines = Vec::with_capacity(3);
        for axis in 0..3 {
            let values: Vec<f64> = candidates
                .iter()
                .map(|&f| target.positions[f][axis])
                .collect();
            match BSpline::interpolate(&sites, &values, config.degree) {
                Ok(spline) => axis_splines.push(spline),
                Err(_) => break,
            }
        }
        if axis_splines.len() != 3 {
            continue;
        }

        for frame in gap.start..=gap.end {
            let x = frame as f64;
            let position = nalgebra::Vector3::new(
                axis_splines[0].eval(x),
                axis_splines[1].eval(x),
                axis_splines[2].eval(x),
            );
            target.mark_repaired(frame, position);
        }
        updated = true;
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
