//! Domain layer - Core records and port definitions
//!
//! This module defines the records returned to the plugin host and the
//! traits (ports) that adapters implement, following hexagonal
//! architecture principles.

pub mod model;
pub mod ports;

pub use model::*;
pub use ports::*;
