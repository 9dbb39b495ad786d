//! Utility types and functions.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Aabb`] - Axis-aligned boxes with union / surface area
//! - [`Error`] / [`Result`] - Error handling
//! - [`init_tracing`] - Optional log subscriber
//! - Math type re-exports from glam

mod error;
mod logging;
mod math;

pub use error::*;
pub use logging::*;
pub use math::*;
