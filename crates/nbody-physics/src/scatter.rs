//! Randomized initial conditions

use crate::constants::*;
use crate::error::ConfigurationError;
use crate::system::ParticleSystem;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Options for scattering bodies in a cube with a swirl around the z axis
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterConfig {
    pub body_count: usize,
    /// Half-width of the bounding cube
    pub position_range: f32,
    /// Tangential speed factor: v = (y, -x, 0) * velocity_scale
    pub velocity_scale: f32,
    /// Uniform mass range `[min, max)`
    pub mass_range: (f32, f32),
    /// Fixed seed for reproducible runs, entropy otherwise
    pub seed: Option<u64>,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            body_count: DEFAULT_BODY_COUNT,
            position_range: DEFAULT_POSITION_RANGE,
            velocity_scale: DEFAULT_VELOCITY_SCALE,
            mass_range: (DEFAULT_MASS_MIN, DEFAULT_MASS_MAX),
            seed: None,
        }
    }
}

impl ScatterConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.body_count == 0 {
            return Err(ConfigurationError::InvalidScatter(
                "body count must be positive".into(),
            ));
        }
        if !(self.position_range > 0.0) || !self.position_range.is_finite() {
            return Err(ConfigurationError::InvalidScatter(format!(
                "position range must be positive, got {}",
                self.position_range
            )));
        }
        // The sampler scales the full width 2r up slightly, which must stay finite
        if self.position_range > MAX_POSITION_RANGE {
            return Err(ConfigurationError::InvalidScatter(format!(
                "position range {} is too large to sample",
                self.position_range
            )));
        }
        if !self.velocity_scale.is_finite() {
            return Err(ConfigurationError::InvalidScatter(format!(
                "velocity scale must be finite, got {}",
                self.velocity_scale
            )));
        }
        let (min, max) = self.mass_range;
        if !(min > 0.0) || !max.is_finite() || min > max {
            return Err(ConfigurationError::InvalidScatter(format!(
                "mass range must satisfy 0 < min <= max, got [{}, {}]",
                min, max
            )));
        }
        Ok(())
    }

    /// Generate a validated particle system
    pub fn generate(&self) -> Result<ParticleSystem, ConfigurationError> {
        self.validate()?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let n = self.body_count;
        let r = self.position_range;
        let (mass_min, mass_max) = self.mass_range;

        let mut positions = Vec::with_capacity(n);
        let mut velocities = Vec::with_capacity(n);
        let mut masses = Vec::with_capacity(n);

        for _ in 0..n {
            let position = Vec3::new(
                rng.random_range(-r..=r),
                rng.random_range(-r..=r),
                rng.random_range(-r..=r),
            );
            let velocity = Vec3::new(position.y, -position.x, 0.0) * self.velocity_scale;
            let mass = if mass_min < mass_max {
                rng.random_range(mass_min..mass_max)
            } else {
                mass_min
            };

            positions.push(position);
            velocities.push(velocity);
            masses.push(mass);
        }

        log::info!(
            "Scattered {} bodies (half-width {}, swirl {}, mass [{}, {}))",
            n,
            r,
            self.velocity_scale,
            mass_min,
            mass_max
        );

        ParticleSystem::new(positions, velocities, masses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(seed: u64) -> ScatterConfig {
        ScatterConfig {
            body_count: 64,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        assert_eq!(small(7).generate().unwrap(), small(7).generate().unwrap());
        assert_ne!(small(7).generate().unwrap(), small(8).generate().unwrap());
    }

    #[test]
    fn respects_ranges() {
        let system = small(1).generate().unwrap();
        assert_eq!(system.len(), 64);
        for p in system.positions() {
            assert!(p.abs().max_element() <= DEFAULT_POSITION_RANGE);
        }
        for &m in system.masses() {
            assert!((DEFAULT_MASS_MIN..DEFAULT_MASS_MAX).contains(&m));
        }
    }

    #[test]
    fn velocity_is_tangential_in_xy_plane() {
        let system = small(3).generate().unwrap();
        for (p, v) in system.positions().iter().zip(system.velocities()) {
            assert_eq!(v.z, 0.0);
            // (y, -x) is perpendicular to (x, y)
            assert!((p.x * v.x + p.y * v.y).abs() < 1e-4);
        }
    }

    #[test]
    fn rejects_bad_options() {
        let zero = ScatterConfig {
            body_count: 0,
            ..Default::default()
        };
        assert!(zero.generate().is_err());

        let inverted = ScatterConfig {
            mass_range: (10.0, 5.0),
            ..small(0)
        };
        assert!(inverted.generate().is_err());

        let massless = ScatterConfig {
            mass_range: (0.0, 5.0),
            ..small(0)
        };
        assert!(matches!(
            massless.generate(),
            Err(ConfigurationError::InvalidScatter(_))
        ));
    }

    #[test]
    fn rejects_position_range_wider_than_f32() {
        let huge = ScatterConfig {
            body_count: 4,
            position_range: 3.0e38,
            ..small(1)
        };
        assert!(matches!(
            huge.validate(),
            Err(ConfigurationError::InvalidScatter(_))
        ));
        assert!(huge.generate().is_err());

        let widest = ScatterConfig {
            body_count: 4,
            position_range: MAX_POSITION_RANGE,
            velocity_scale: 0.0,
            ..small(1)
        };
        assert_eq!(widest.generate().unwrap().len(), 4);
    }

    #[test]
    fn fixed_mass_when_range_is_degenerate() {
        let config = ScatterConfig {
            mass_range: (3.0, 3.0),
            ..small(2)
        };
        let system = config.generate().unwrap();
        assert!(system.masses().iter().all(|&m| m == 3.0));
    }
}
