//! Backend abstraction shared by the GPU bridge and the host reference

use crate::error::Result;
use glam::Vec3;
use nbody_physics::ParticleSystem;

/// Positions of every body after a completed step.
///
/// Borrows the backend's host staging vector, so it cannot outlive the next
/// `step` call. Use [`Snapshot::to_vec`] to keep the data.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    step: u64,
    positions: &'a [Vec3],
}

impl<'a> Snapshot<'a> {
    pub fn new(step: u64, positions: &'a [Vec3]) -> Self {
        Self { step, positions }
    }

    /// Number of completed steps this snapshot was taken after
    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn positions(&self) -> &'a [Vec3] {
        self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Vec3> {
        self.positions.to_vec()
    }
}

/// Owner of the authoritative particle state during a run.
///
/// Every call blocks until the underlying work is finished; a caller never
/// observes a partially stepped or partially transferred array.
pub trait ComputeBackend {
    fn name(&self) -> &'static str;

    /// Body count of the uploaded system (0 before upload)
    fn body_count(&self) -> usize;

    /// Steps advanced since upload
    fn steps_completed(&self) -> u64;

    /// One-time transfer of the initial state
    fn upload(&mut self, system: &ParticleSystem) -> Result<()>;

    /// Advance simulation time by one `dt`
    fn step(&mut self) -> Result<()>;

    /// Copy current positions to the host
    fn read_positions(&mut self) -> Result<Snapshot<'_>>;

    /// Copy current velocities to the host
    fn read_velocities(&mut self) -> Result<Vec<Vec3>>;
}
