#![forbid(unsafe_code)]
//! cygraph-core library.
//!
//! Cycling domains, cycle-point bounds resolution, and suite configuration.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums, each mapped to a stable [`error::ErrorCode`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod bounds;
pub mod config;
pub mod cycling;
pub mod error;

pub use bounds::{Bounds, PointDefaults, resolve_bounds};
pub use config::{ConfigError, SuiteConfig, SuiteLocation, locate_suite};
pub use cycling::{CycleError, CyclingDomain, CyclingMode, GregorianDomain, IntegerDomain};
pub use error::ErrorCode;
