//! # N-body Simulation Engine
//!
//! GPU all-pairs gravity using a wgpu compute shader, with a host reference
//! backend and a step/readback loop feeding snapshots to an output sink.

pub mod backend;
pub mod bridge;
pub mod context;
pub mod cpu;
pub mod error;
pub mod simulation_loop;

pub use backend::*;
pub use bridge::*;
pub use context::*;
pub use cpu::*;
pub use error::{DeviceError, SimulationError};
pub use simulation_loop::*;
