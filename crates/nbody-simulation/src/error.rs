//! Device and run errors

use nbody_physics::ConfigurationError;
use thiserror::Error;

/// Failure on the accelerator side. Always fatal to the run: a faulted
/// dispatch leaves lanes in an unknown mix of updated and stale state.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// No adapter matched the device selection
    #[error("no usable GPU adapter: {0}")]
    AdapterUnavailable(String),

    /// The adapter refused to create a device
    #[error("device request failed: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// Buffer or pipeline creation failed
    #[error("device allocation failed: {0}")]
    Allocation(String),

    /// The compute dispatch or its completion wait failed
    #[error("compute dispatch failed: {0}")]
    Dispatch(String),

    /// Copying results back to the host failed
    #[error("readback failed: {0}")]
    Readback(String),

    /// `step` or a read was issued before `upload`
    #[error("particle state has not been uploaded")]
    NotUploaded,

    /// More bodies than the device can cover in one dispatch
    #[error("{bodies} bodies exceed the device limit of {max} per dispatch")]
    TooManyBodies { bodies: usize, max: u64 },
}

/// Any error that stops a run
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}

pub type Result<T, E = SimulationError> = std::result::Result<T, E>;
