//! All-pairs gravity, host reference implementation
//!
//! Mirrors `gravity.wgsl` lane for lane. Used by the CPU backend and as the
//! oracle when checking the device kernel.
//!
//! The force law divides by `(r + ε)` to the first power, not `r²`:
//!
//! F(i) = G · Σ_{j≠i} m_i · m_j · normalize(x_j − x_i) / (|x_j − x_i| + ε)

use crate::params::PhysicsParams;
use glam::Vec3;

/// Direction of `v`, or zero for a zero-length vector
#[inline]
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let length = v.length();
    if length > 0.0 {
        v / length
    } else {
        Vec3::ZERO
    }
}

/// Net force on body `index` from every other body
pub fn net_force(index: usize, positions: &[Vec3], masses: &[f32], params: &PhysicsParams) -> Vec3 {
    let s1 = positions[index];
    let m1 = masses[index];

    let mut force = Vec3::ZERO;
    for (i, (&s2, &m2)) in positions.iter().zip(masses).enumerate() {
        if i == index {
            continue;
        }
        let disp = s2 - s1;
        force += params.gravity * m1 * m2 * normalize_or_zero(disp) / (disp.length() + params.softening);
    }
    force
}

/// Acceleration of body `index`
#[inline]
pub fn acceleration(index: usize, positions: &[Vec3], masses: &[f32], params: &PhysicsParams) -> Vec3 {
    net_force(index, positions, masses, params) / masses[index]
}

/// Accelerations of every body from one immutable snapshot.
///
/// `out` is cleared and refilled; no position is read after any is updated.
pub fn accelerations_into(
    positions: &[Vec3],
    masses: &[f32],
    params: &PhysicsParams,
    out: &mut Vec<Vec3>,
) {
    debug_assert_eq!(positions.len(), masses.len());
    out.clear();
    out.extend((0..positions.len()).map(|i| acceleration(i, positions, masses, params)));
}

pub fn accelerations(positions: &[Vec3], masses: &[f32], params: &PhysicsParams) -> Vec<Vec3> {
    let mut out = Vec::with_capacity(positions.len());
    accelerations_into(positions, masses, params, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> PhysicsParams {
        PhysicsParams::default()
    }

    #[test]
    fn symmetric_pair_obeys_third_law() {
        let positions = [Vec3::new(-0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)];
        let masses = [2.0, 2.0];
        let acc = accelerations(&positions, &masses, &params());

        assert_relative_eq!(acc[0].length(), acc[1].length(), max_relative = 1e-6);
        assert!((acc[0] + acc[1]).length() < 1e-9);
        // Attractive: body 0 accelerates toward +x
        assert!(acc[0].x > 0.0);
    }

    #[test]
    fn unequal_masses_conserve_momentum_rate() {
        let positions = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 2.0, -1.0)];
        let masses = [3.0, 7.0];
        let p = params();
        let f0 = net_force(0, &positions, &masses, &p);
        let f1 = net_force(1, &positions, &masses, &p);
        assert!((f0 + f1).length() < 1e-9);
    }

    #[test]
    fn magnitude_follows_first_power_law() {
        let p = PhysicsParams {
            gravity: 1.0,
            softening: 0.0,
            ..params()
        };
        let masses = [1.0, 1.0];
        let near = accelerations(&[Vec3::ZERO, Vec3::X], &masses, &p);
        let far = accelerations(&[Vec3::ZERO, Vec3::X * 2.0], &masses, &p);
        assert_relative_eq!(near[0].length() / far[0].length(), 2.0, max_relative = 1e-5);
    }

    #[test]
    fn matches_closed_form_with_softening() {
        let p = params();
        let masses = [4.0, 9.0];
        let acc = accelerations(&[Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0)], &masses, &p);
        let expected = p.gravity * masses[1] / (3.0 + p.softening);
        assert_relative_eq!(acc[0].y, expected, max_relative = 1e-5);
        assert_eq!(acc[0].x, 0.0);
        assert_eq!(acc[0].z, 0.0);
    }

    #[test]
    fn coincident_bodies_produce_zero_acceleration() {
        let positions = [Vec3::ONE, Vec3::ONE];
        let acc = accelerations(&positions, &[1.0, 1.0], &params());
        assert!(acc.iter().all(|a| a.is_finite()));
        assert_eq!(acc[0], Vec3::ZERO);
    }

    #[test]
    fn equilateral_triangle_points_to_centroid() {
        let h = 3.0_f32.sqrt() / 2.0;
        let positions = [
            Vec3::new(-0.5, -h / 3.0, 0.0),
            Vec3::new(0.5, -h / 3.0, 0.0),
            Vec3::new(0.0, 2.0 * h / 3.0, 0.0),
        ];
        let centroid = positions.iter().sum::<Vec3>() / 3.0;
        let acc = accelerations(&positions, &[10.0, 10.0, 10.0], &params());

        for (a, p) in acc.iter().zip(&positions) {
            let to_centroid = (centroid - *p).normalize();
            assert_relative_eq!(a.normalize().dot(to_centroid), 1.0, epsilon = 1e-5);
            assert_relative_eq!(a.length(), acc[0].length(), max_relative = 1e-5);
        }
    }

    #[test]
    fn single_body_feels_nothing() {
        let acc = accelerations(&[Vec3::new(1.0, 2.0, 3.0)], &[5.0], &params());
        assert_eq!(acc, vec![Vec3::ZERO]);
    }

    #[test]
    fn empty_snapshot_yields_no_accelerations() {
        assert!(accelerations(&[], &[], &params()).is_empty());
    }
}
