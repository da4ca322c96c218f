//! Host backend built on the reference kernel
//!
//! Runs the same lane computation as `gravity.wgsl`, one body at a time. Used
//! when no adapter is available and as the oracle for the device kernel.

use crate::backend::{ComputeBackend, Snapshot};
use crate::error::{DeviceError, Result};
use glam::Vec3;
use nbody_physics::{integrator, ConfigurationError, ParticleSystem, PhysicsParams};

pub struct CpuBridge {
    params: PhysicsParams,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    masses: Vec<f32>,
    accelerations: Vec<Vec3>,
    uploaded: bool,
    steps: u64,
}

impl CpuBridge {
    pub fn new(params: PhysicsParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            positions: Vec::new(),
            velocities: Vec::new(),
            masses: Vec::new(),
            accelerations: Vec::new(),
            uploaded: false,
            steps: 0,
        })
    }

    /// Accelerations used by the most recent step
    pub fn last_accelerations(&self) -> &[Vec3] {
        &self.accelerations
    }
}

impl ComputeBackend for CpuBridge {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn body_count(&self) -> usize {
        self.positions.len()
    }

    fn steps_completed(&self) -> u64 {
        self.steps
    }

    fn upload(&mut self, system: &ParticleSystem) -> Result<()> {
        if self.uploaded {
            return Err(ConfigurationError::AlreadyUploaded.into());
        }
        let (positions, velocities, masses) = system.clone().into_parts();
        self.positions = positions;
        self.velocities = velocities;
        self.masses = masses;
        self.accelerations = Vec::with_capacity(self.masses.len());
        self.uploaded = true;
        log::info!("Uploaded {} bodies to the CPU backend", self.masses.len());
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        if !self.uploaded {
            return Err(DeviceError::NotUploaded.into());
        }
        integrator::step(
            &mut self.positions,
            &mut self.velocities,
            &self.masses,
            &self.params,
            &mut self.accelerations,
        );
        self.steps += 1;
        Ok(())
    }

    fn read_positions(&mut self) -> Result<Snapshot<'_>> {
        if !self.uploaded {
            return Err(DeviceError::NotUploaded.into());
        }
        Ok(Snapshot::new(self.steps, &self.positions))
    }

    fn read_velocities(&mut self) -> Result<Vec<Vec3>> {
        if !self.uploaded {
            return Err(DeviceError::NotUploaded.into());
        }
        Ok(self.velocities.clone())
    }
}
