//! # Rigid geometry
//!
//! Two building blocks shared by the cluster-based gap-fill strategies:
//!
//! - [`frame`]: per-frame orthonormal local coordinate frames built from
//!   three reference markers, and the selection of those references from a
//!   larger cluster.
//! - [`fit`]: the Procrustes/Kabsch rigid alignment of one point
//!   configuration onto another.

pub mod fit;
pub mod frame;

pub use fit::{rigid_fit, RigidFit};
pub use frame::{build_frames, select_reference_markers, ClusterFrame};
