//! Physics parameters shared by the host reference and the compute kernel

use crate::constants::{DT, G, SOFTENING};
use crate::error::ConfigurationError;
use bytemuck::{Pod, Zeroable};

/// Uniform block consumed by `gravity.wgsl`.
///
/// Layout is 16 bytes, matching the WGSL `Params` struct. The constants are
/// fixed for a run; there is no way to change them after upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PhysicsParams {
    /// Gravitational constant
    pub gravity: f32,
    /// Softening added to the pair distance
    pub softening: f32,
    /// Time step
    pub dt: f32,
    /// Number of bodies (set by the backend at upload)
    pub body_count: u32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: G,
            softening: SOFTENING,
            dt: DT,
            body_count: 0,
        }
    }
}

impl PhysicsParams {
    pub fn new(gravity: f32, softening: f32, dt: f32) -> Result<Self, ConfigurationError> {
        let params = Self {
            gravity,
            softening,
            dt,
            body_count: 0,
        };
        params.validate()?;
        Ok(params)
    }

    /// Copy of these parameters with the body count filled in
    pub fn with_body_count(self, body_count: u32) -> Self {
        Self { body_count, ..self }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(ConfigurationError::InvalidParams(format!(
                "gravitational constant must be finite and >= 0, got {}",
                self.gravity
            )));
        }
        if !self.softening.is_finite() || self.softening < 0.0 {
            return Err(ConfigurationError::InvalidParams(format!(
                "softening must be finite and >= 0, got {}",
                self.softening
            )));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigurationError::InvalidParams(format!(
                "time step must be finite and > 0, got {}",
                self.dt
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let params = PhysicsParams::default();
        assert_eq!(params.gravity, 0.0001);
        assert_eq!(params.softening, 0.001);
        assert_eq!(params.dt, 0.01);
        assert_eq!(std::mem::size_of::<PhysicsParams>(), 16);
    }

    #[test]
    fn rejects_zero_time_step() {
        assert!(matches!(
            PhysicsParams::new(0.0001, 0.001, 0.0),
            Err(ConfigurationError::InvalidParams(_))
        ));
    }

    #[test]
    fn rejects_nan_gravity() {
        assert!(PhysicsParams::new(f32::NAN, 0.001, 0.01).is_err());
    }
}
