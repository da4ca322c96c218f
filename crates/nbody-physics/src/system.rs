//! Particle state as three parallel arrays

use crate::error::ConfigurationError;
use glam::Vec3;

/// Position/velocity/mass of every body, indexed by body id.
///
/// Built once per run and validated on construction: the arrays have equal
/// length, every mass is positive and finite, and every vector component is
/// finite. An empty system is valid and steps as a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSystem {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    masses: Vec<f32>,
}

impl ParticleSystem {
    pub fn new(
        positions: Vec<Vec3>,
        velocities: Vec<Vec3>,
        masses: Vec<f32>,
    ) -> Result<Self, ConfigurationError> {
        if positions.len() != velocities.len() || positions.len() != masses.len() {
            return Err(ConfigurationError::LengthMismatch {
                positions: positions.len(),
                velocities: velocities.len(),
                masses: masses.len(),
            });
        }

        for (index, &mass) in masses.iter().enumerate() {
            // `!(mass > 0.0)` also catches NaN
            if !(mass > 0.0) || !mass.is_finite() {
                return Err(ConfigurationError::NonPositiveMass { index, mass });
            }
        }
        if let Some(index) = positions.iter().position(|p| !p.is_finite()) {
            return Err(ConfigurationError::NonFinite {
                index,
                quantity: "position",
            });
        }
        if let Some(index) = velocities.iter().position(|v| !v.is_finite()) {
            return Err(ConfigurationError::NonFinite {
                index,
                quantity: "velocity",
            });
        }

        Ok(Self {
            positions,
            velocities,
            masses,
        })
    }

    /// Bodies at rest
    pub fn at_rest(positions: Vec<Vec3>, masses: Vec<f32>) -> Result<Self, ConfigurationError> {
        let velocities = vec![Vec3::ZERO; positions.len()];
        Self::new(positions, velocities, masses)
    }

    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            velocities: Vec::new(),
            masses: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn masses(&self) -> &[f32] {
        &self.masses
    }

    pub fn into_parts(self) -> (Vec<Vec3>, Vec<Vec3>, Vec<f32>) {
        (self.positions, self.velocities, self.masses)
    }

    /// Positions in device layout (`vec4<f32>`, w = 0)
    pub fn padded_positions(&self) -> Vec<[f32; 4]> {
        pad(&self.positions)
    }

    /// Velocities in device layout (`vec4<f32>`, w = 0)
    pub fn padded_velocities(&self) -> Vec<[f32; 4]> {
        pad(&self.velocities)
    }
}

fn pad(vectors: &[Vec3]) -> Vec<[f32; 4]> {
    vectors.iter().map(|v| v.extend(0.0).to_array()).collect()
}

/// Drop the padding component of device vectors
pub fn unpad(vectors: &[[f32; 4]]) -> impl Iterator<Item = Vec3> + '_ {
    vectors.iter().map(|&[x, y, z, _]| Vec3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_mass() {
        let err = ParticleSystem::at_rest(vec![Vec3::ZERO, Vec3::X], vec![1.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::NonPositiveMass {
                index: 1,
                mass: 0.0
            }
        );
    }

    #[test]
    fn rejects_negative_and_nan_mass() {
        assert!(ParticleSystem::at_rest(vec![Vec3::ZERO], vec![-2.0]).is_err());
        assert!(ParticleSystem::at_rest(vec![Vec3::ZERO], vec![f32::NAN]).is_err());
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let err = ParticleSystem::new(vec![Vec3::ZERO; 3], vec![Vec3::ZERO; 2], vec![1.0; 3])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::LengthMismatch {
                positions: 3,
                velocities: 2,
                masses: 3
            }
        ));
    }

    #[test]
    fn rejects_infinite_position() {
        let err =
            ParticleSystem::at_rest(vec![Vec3::new(f32::INFINITY, 0.0, 0.0)], vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::NonFinite {
                index: 0,
                quantity: "position"
            }
        ));
    }

    #[test]
    fn empty_system_is_valid() {
        let system = ParticleSystem::new(vec![], vec![], vec![]).unwrap();
        assert!(system.is_empty());
        assert_eq!(system, ParticleSystem::empty());
    }

    #[test]
    fn padding_round_trips_through_device_layout() {
        let system =
            ParticleSystem::at_rest(vec![Vec3::new(1.0, 2.0, 3.0)], vec![4.0]).unwrap();
        let padded = system.padded_positions();
        assert_eq!(padded, vec![[1.0, 2.0, 3.0, 0.0]]);
        assert_eq!(unpad(&padded).collect::<Vec<_>>(), system.positions());
    }
}
