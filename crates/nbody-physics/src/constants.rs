//! Reference constants for the all-pairs gravity simulation
//!
//! These are the values the stylized reference dynamics were tuned with. They
//! are not physical SI constants.

/// Gravitational constant
pub const G: f32 = 0.0001;

/// Softening added to the pairwise distance to avoid blow-up at r→0
pub const SOFTENING: f32 = 0.001;

/// Fixed integration time step
pub const DT: f32 = 0.01;

/// Lanes per compute workgroup (must match `@workgroup_size` in the kernel)
pub const WORKGROUP_SIZE: u32 = 256;

// Reference randomized initial conditions

/// Default body count for a scattered system
pub const DEFAULT_BODY_COUNT: usize = 10_000;

/// Half-width of the cube bodies are scattered in
pub const DEFAULT_POSITION_RANGE: f32 = 1.5;

/// Largest half-width the uniform sampler can span without overflowing
pub const MAX_POSITION_RANGE: f32 = f32::MAX / 4.0;

/// Scale of the initial tangential (swirl) velocity
pub const DEFAULT_VELOCITY_SCALE: f32 = 1.5;

/// Lower bound of the uniform mass distribution
pub const DEFAULT_MASS_MIN: f32 = 5.0;

/// Upper bound (exclusive) of the uniform mass distribution
pub const DEFAULT_MASS_MAX: f32 = 55.0;
