//! Application Ports - Interfaces for external dependencies
//!
//! Ports define the interfaces that infrastructure must implement.
//! They allow the interceptor to run against the real windowing layer or an
//! in-memory one.

pub mod platform_port;

pub use platform_port::{ObserverHandle, ObserverKind, WindowPlatform};
