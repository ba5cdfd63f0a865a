use nalgebra::{Rotation3, Vector3};

use retrack::constants::BLOCKED_RESIDUAL;
use retrack::store::{InMemoryStore, TrajectoryStore};
use retrack::trajectory::Trajectory;

/// A rotating-arm capture: three cluster markers and one target marker all
/// rigidly attached to an arm swinging about the z axis, fully valid.
///
/// Returns the populated store and the target's ground-truth positions.
/// Marker names: target `TGT`, cluster `CL0`/`CL1`/`CL2`.
pub fn rotating_arm_store(n_frames: usize) -> (InMemoryStore, Vec<Vector3<f64>>) {
    let body = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(120.0, 0.0, 10.0),
        Vector3::new(40.0, 110.0, 0.0),
    ];
    let target_body = Vector3::new(60.0, 55.0, 90.0);

    let mut cluster_pos: Vec<Vec<Vector3<f64>>> = vec![Vec::new(); 3];
    let mut target_pos = Vec::new();
    for f in 0..n_frames {
        let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), 0.04 * f as f64);
        let shift = Vector3::new(0.5 * f as f64, 0.0, 0.2 * f as f64);
        for (series, &p) in cluster_pos.iter_mut().zip(&body) {
            series.push(rot * p + shift);
        }
        target_pos.push(rot * target_body + shift);
    }

    let mut store = InMemoryStore::new(1, n_frames);
    for (i, positions) in cluster_pos.into_iter().enumerate() {
        let name = format!("CL{i}");
        store
            .insert(
                &name,
                Trajectory::new(positions, vec![0.0; n_frames]).unwrap(),
            )
            .unwrap();
    }
    store
        .insert(
            "TGT",
            Trajectory::new(target_pos.clone(), vec![0.0; n_frames]).unwrap(),
        )
        .unwrap();

    (store, target_pos)
}

/// Block `frames` of `marker` in the store, overwriting the stored positions
/// with garbage so tests cannot accidentally pass on stale data.
pub fn block_frames(
    store: &mut InMemoryStore,
    marker: &str,
    frames: std::ops::RangeInclusive<usize>,
) {
    let mut trajectory = store.marker(marker).unwrap();
    for f in frames {
        trajectory.residuals[f] = BLOCKED_RESIDUAL;
        trajectory.positions[f] = Vector3::new(9e9, 9e9, 9e9);
    }
    store.set_marker(marker, trajectory).unwrap();
}

/// Largest per-frame position error of `marker` against `truth` over `frames`.
pub fn max_error(
    store: &InMemoryStore,
    marker: &str,
    truth: &[Vector3<f64>],
    frames: std::ops::RangeInclusive<usize>,
) -> f64 {
    let trajectory = store.marker(marker).unwrap();
    frames
        .map(|f| (trajectory.positions[f] - truth[f]).norm())
        .fold(0.0, f64::max)
}
