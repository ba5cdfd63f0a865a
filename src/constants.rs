//! # Constants and type definitions for Retrack
//!
//! This module centralizes the **numeric constants** and **common type
//! definitions** used throughout the `retrack` library.
//!
//! ## Overview
//!
//! - Residual sentinel marking blocked (untracked) frames
//! - Floating-point tolerance for sentinel comparison
//! - Core type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Residual sentinel
// -------------------------------------------------------------------------------------------------

/// Residual value conventionally meaning "no data" for a frame.
///
/// Motion-capture pipelines store a per-frame residual alongside each marker
/// position; a residual of exactly −1 flags the frame as blocked (occluded or
/// otherwise untracked). Every other value, including 0, marks a valid frame.
pub const BLOCKED_RESIDUAL: f64 = -1.0;

/// Absolute tolerance used when comparing a residual against
/// [`BLOCKED_RESIDUAL`].
///
/// Residuals travel through single-precision storage in most capture formats,
/// so the comparison must absorb round-trip noise around −1.
pub const RESIDUAL_TOLERANCE: f64 = 1e-8;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// 0-based frame offset inside one trajectory.
///
/// All strategies operate on these internally; translation to absolute frame
/// numbers happens only at the store boundary.
pub type FrameIndex = usize;

/// Absolute frame number as recorded by the capture system.
pub type AbsoluteFrame = i32;

/// Returns `true` when `residual` marks a blocked frame.
#[inline]
pub fn is_blocked(residual: f64) -> bool {
    (residual - BLOCKED_RESIDUAL).abs() <= RESIDUAL_TOLERANCE
}

#[cfg(test)]
mod constants_test {
    use super::*;

    #[test]
    fn sentinel_detection() {
        assert!(is_blocked(-1.0));
        assert!(is_blocked(-1.0 + 1e-9));
        assert!(!is_blocked(0.0));
        assert!(!is_blocked(-0.5));
        assert!(!is_blocked(2.75));
    }
}
