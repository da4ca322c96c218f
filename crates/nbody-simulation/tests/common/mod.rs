#![allow(dead_code)]

use approx::assert_abs_diff_eq;
use glam::Vec3;
use nbody_physics::{ParticleSystem, ScatterConfig};
use nbody_simulation::{DeviceSelection, GpuContext};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Device handle, trying a software adapter before giving up. `None` on
/// machines with no usable adapter at all.
pub fn gpu() -> Option<GpuContext> {
    init_logging();
    let hardware = DeviceSelection::default();
    let software = DeviceSelection {
        force_fallback_adapter: true,
        ..Default::default()
    };
    match GpuContext::new_blocking(&hardware) {
        Ok(context) => Some(context),
        Err(err) => {
            log::warn!("no hardware adapter ({}), trying a software one", err);
            match GpuContext::new_blocking(&software) {
                Ok(context) => Some(context),
                Err(err) => {
                    log::warn!("skipping GPU test: {}", err);
                    None
                }
            }
        }
    }
}

pub fn assert_vec_close(a: Vec3, b: Vec3, epsilon: f32) {
    assert_abs_diff_eq!(a.x, b.x, epsilon = epsilon);
    assert_abs_diff_eq!(a.y, b.y, epsilon = epsilon);
    assert_abs_diff_eq!(a.z, b.z, epsilon = epsilon);
}

/// Max component difference relative to the larger magnitude
pub fn assert_relative_close(a: &[Vec3], b: &[Vec3], tolerance: f32) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        let scale = x.length().max(y.length()).max(1.0);
        let diff = (*x - *y).length();
        assert!(
            diff <= tolerance * scale,
            "body {}: {:?} vs {:?} differ by {}",
            i,
            x,
            y,
            diff
        );
    }
}

/// Two equal masses at ±x, at rest
pub fn symmetric_pair() -> ParticleSystem {
    ParticleSystem::at_rest(
        vec![Vec3::new(-0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)],
        vec![10.0, 10.0],
    )
    .unwrap()
}

/// Unit equilateral triangle in the xy plane centred on the origin, masses 10
pub fn triangle() -> ParticleSystem {
    let h = 3.0_f32.sqrt() / 2.0;
    ParticleSystem::at_rest(
        vec![
            Vec3::new(-0.5, -h / 3.0, 0.0),
            Vec3::new(0.5, -h / 3.0, 0.0),
            Vec3::new(0.0, 2.0 * h / 3.0, 0.0),
        ],
        vec![10.0, 10.0, 10.0],
    )
    .unwrap()
}

pub fn cluster(body_count: usize, seed: u64) -> ParticleSystem {
    ScatterConfig {
        body_count,
        seed: Some(seed),
        ..Default::default()
    }
    .generate()
    .unwrap()
}
