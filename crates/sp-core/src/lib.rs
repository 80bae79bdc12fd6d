//! sp-core: stable foundation for spallflow.
//!
//! Contains:
//! - keys (typed names for steps, frames, fields, components and channels)
//! - velocity (validated impact velocity, the sweep's independent variable)
//! - units (uom SI types + velocity unit conversion)
//! - numeric (finite/positive guards + tolerant comparison)
//! - error (shared error types)

pub mod error;
pub mod keys;
pub mod numeric;
pub mod units;
pub mod velocity;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use keys::*;
pub use numeric::*;
pub use units::VelocityUnit;
pub use velocity::Velocity;
