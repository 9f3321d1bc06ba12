//! Interface Adapters Layer
//!
//! Implementations of the application ports that do not depend on a real
//! windowing system.

pub mod gateways;

pub use gateways::*;
