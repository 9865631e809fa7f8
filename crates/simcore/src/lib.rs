//! Shared state, context and error types for the vehicle simulator.

pub mod clock;
pub mod curve;
pub mod error;
mod traits;

pub use clock::SimClock;
pub use curve::Curve;
pub use error::{require_non_negative, require_positive, ConfigError, SimError};
pub use traits::*;
