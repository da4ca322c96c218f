//! Semi-implicit (symplectic) Euler integration
//!
//! velocity += a · dt, then position += velocity · dt using the *updated*
//! velocity. Using the pre-step velocity would make this plain explicit Euler,
//! which gains energy on orbits.

use crate::forces::accelerations_into;
use crate::params::PhysicsParams;
use glam::Vec3;

/// Advance one body given its acceleration
#[inline]
pub fn integrate_body(position: &mut Vec3, velocity: &mut Vec3, acceleration: Vec3, dt: f32) {
    *velocity += acceleration * dt;
    *position += *velocity * dt;
}

/// Apply one step to every body from precomputed accelerations
pub fn integrate(positions: &mut [Vec3], velocities: &mut [Vec3], accelerations: &[Vec3], dt: f32) {
    for ((x, v), &a) in positions.iter_mut().zip(velocities.iter_mut()).zip(accelerations) {
        integrate_body(x, v, a, dt);
    }
}

/// Full reference step: accelerations from the pre-step snapshot, then integration.
///
/// `scratch` holds the accelerations between calls to avoid reallocating.
pub fn step(
    positions: &mut [Vec3],
    velocities: &mut [Vec3],
    masses: &[f32],
    params: &PhysicsParams,
    scratch: &mut Vec<Vec3>,
) {
    if positions.is_empty() {
        return;
    }
    accelerations_into(positions, masses, params, scratch);
    integrate(positions, velocities, scratch, params.dt);
}
