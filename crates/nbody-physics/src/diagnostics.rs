//! Conserved-quantity diagnostics for checking a run

use glam::Vec3;

/// Σ m·v
pub fn total_momentum(velocities: &[Vec3], masses: &[f32]) -> Vec3 {
    velocities
        .iter()
        .zip(masses)
        .map(|(&v, &m)| v * m)
        .sum()
}

/// Σ ½·m·|v|²
pub fn kinetic_energy(velocities: &[Vec3], masses: &[f32]) -> f32 {
    velocities
        .iter()
        .zip(masses)
        .map(|(v, &m)| 0.5 * m * v.length_squared())
        .sum()
}

/// Mass-weighted mean position, or `None` for an empty system
pub fn center_of_mass(positions: &[Vec3], masses: &[f32]) -> Option<Vec3> {
    let total: f32 = masses.iter().sum();
    if positions.is_empty() || total <= 0.0 {
        return None;
    }
    let weighted: Vec3 = positions.iter().zip(masses).map(|(&p, &m)| p * m).sum();
    Some(weighted / total)
}

/// Axis-aligned bounds of a snapshot, `None` when empty
pub fn bounds(positions: &[Vec3]) -> Option<(Vec3, Vec3)> {
    let first = *positions.first()?;
    Some(
        positions
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn momentum_of_opposing_pair_is_zero() {
        let v = [Vec3::X, -Vec3::X * 0.5];
        assert_eq!(total_momentum(&v, &[1.0, 2.0]), Vec3::ZERO);
    }

    #[test]
    fn kinetic_energy_sums_bodies() {
        let v = [Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        assert_eq!(kinetic_energy(&v, &[1.0, 4.0]), 4.0);
    }

    #[test]
    fn center_of_mass_is_weighted() {
        let p = [Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)];
        assert_eq!(center_of_mass(&p, &[3.0, 1.0]), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(center_of_mass(&[], &[]), None);
    }

    #[test]
    fn bounds_cover_all_points() {
        let p = [Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 3.0, 0.5)];
        assert_eq!(
            bounds(&p),
            Some((Vec3::new(-1.0, -2.0, 0.0), Vec3::new(1.0, 3.0, 0.5)))
        );
        assert_eq!(bounds(&[]), None);
    }
}
