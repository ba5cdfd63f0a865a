//! # Trajectory store adapter
//!
//! The engine never talks to a capture file or an automation interface
//! directly; it reaches persisted marker data only through the
//! [`TrajectoryStore`] trait. A store exposes a shared global frame range and
//! per-marker whole-series reads and writes. Writes replace the complete
//! trajectory at once, so a failed operation never leaves a marker half
//! updated.
//!
//! [`InMemoryStore`] is the bundled implementation: a plain map from marker
//! name to [`Trajectory`], usable both as a test double and as a working
//! container when the capture data has already been loaded elsewhere.

use std::collections::HashMap;

use crate::constants::AbsoluteFrame;
use crate::retrack_errors::RetrackError;
use crate::trajectory::Trajectory;

/// External collaborator holding persisted marker trajectories.
///
/// All trajectories in one store share the global frame range
/// `[first_frame, first_frame + frame_count)`. Strategies index frames from 0
/// internally; `first_frame` exists so callers can translate results back to
/// absolute capture frame numbers.
///
/// Implementations must guarantee at most one writer per marker at a time;
/// the engine itself is single-threaded and holds no locks.
pub trait TrajectoryStore {
    /// Number of frames every trajectory in the store spans.
    fn frame_count(&self) -> usize;

    /// Absolute frame number corresponding to internal frame 0.
    fn first_frame(&self) -> AbsoluteFrame;

    /// Fetch a full-length copy of one marker's trajectory.
    fn marker(&self, name: &str) -> Result<Trajectory, RetrackError>;

    /// Replace one marker's trajectory as a whole.
    ///
    /// Fails with [`RetrackError::TrajectoryLengthMismatch`] when the new
    /// trajectory does not span [`frame_count`](TrajectoryStore::frame_count)
    /// frames; the stored series is untouched in that case.
    fn set_marker(&mut self, name: &str, trajectory: Trajectory) -> Result<(), RetrackError>;
}

/// Map-backed [`TrajectoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    first_frame: AbsoluteFrame,
    frame_count: usize,
    markers: HashMap<String, Trajectory>,
}

impl InMemoryStore {
    /// Create an empty store spanning `frame_count` frames starting at the
    /// absolute frame number `first_frame`.
    pub fn new(first_frame: AbsoluteFrame, frame_count: usize) -> Self {
        InMemoryStore {
            first_frame,
            frame_count,
            markers: HashMap::new(),
        }
    }

    /// Insert a marker, validating its length against the store's frame
    /// range.
    pub fn insert(&mut self, name: &str, trajectory: Trajectory) -> Result<(), RetrackError> {
        if trajectory.len() != self.frame_count {
            return Err(RetrackError::TrajectoryLengthMismatch {
                expected: self.frame_count,
                got: trajectory.len(),
            });
        }
        self.markers.insert(name.to_owned(), trajectory);
        Ok(())
    }

    /// Marker names currently held, in arbitrary order.
    pub fn marker_names(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(String::as_str)
    }
}

impl TrajectoryStore for InMemoryStore {
    fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn first_frame(&self) -> AbsoluteFrame {
        self.first_frame
    }

    fn marker(&self, name: &str) -> Result<Trajectory, RetrackError> {
        self.markers
            .get(name)
            .cloned()
            .ok_or_else(|| RetrackError::MarkerNotFound(name.to_owned()))
    }

    fn set_marker(&mut self, name: &str, trajectory: Trajectory) -> Result<(), RetrackError> {
        if trajectory.len() != self.frame_count {
            return Err(RetrackError::TrajectoryLengthMismatch {
                expected: self.frame_count,
                got: trajectory.len(),
            });
        }
        match self.markers.get_mut(name) {
            Some(slot) => {
                *slot = trajectory;
                Ok(())
            }
            None => Err(RetrackError::MarkerNotFound(name.to_owned())),
        }
    }
}

#[cfg(test)]
mod store_test {
    use super::*;
    use nalgebra::Vector3;

    fn flat_trajectory(n: usize) -> Trajectory {
        Trajectory::new(vec![Vector3::new(1.0, 2.0, 3.0); n], vec![0.0; n]).unwrap()
    }

    #[test]
    fn insert_and_fetch_round_trip() {
        let mut store = InMemoryStore::new(1, 4);
        store.insert("RASI", flat_trajectory(4)).unwrap();
        let traj = store.marker("RASI").unwrap();
        assert_eq!(traj.len(), 4);
        assert_eq!(store.first_frame(), 1);
    }

    #[test]
    fn unknown_marker_is_reported() {
        let store = InMemoryStore::new(1, 4);
        assert_eq!(
            store.marker("LASI").unwrap_err(),
            RetrackError::MarkerNotFound("LASI".into())
        );
    }

    #[test]
    fn length_mismatch_rejected_on_write() {
        let mut store = InMemoryStore::new(1, 4);
        store.insert("RASI", flat_trajectory(4)).unwrap();
        let err = store.set_marker("RASI", flat_trajectory(3)).unwrap_err();
        assert_eq!(
            err,
            RetrackError::TrajectoryLengthMismatch {
                expected: 4,
                got: 3
            }
        );
        // Stored series untouched.
        assert_eq!(store.marker("RASI").unwrap().len(), 4);
    }
}
