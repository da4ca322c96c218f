//! # N-body Physics
//!
//! Host-side data model for the all-pairs gravity simulation: particle state,
//! physics parameters, randomized initial conditions, and reference
//! implementations of the force kernel and integrator.

pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod params;
pub mod scatter;
pub mod system;

pub use constants::*;
pub use error::*;
pub use params::*;
pub use scatter::*;
pub use system::*;
