//! Application Layer - Interception workflows
//!
//! This layer drives the domain entities through the platform port.
//! It contains:
//! - **Ports**: Interface to the host windowing layer
//! - **Strategies**: Per-window subclassing or a thread-wide hook
//! - **Services**: The interceptor that owns the registry and lifecycle
//!
//! # Clean Architecture Rules
//! - Depends only on the domain layer
//! - Defines ports that the platform layer implements
//! - Contains no operating-system code

pub mod ports;
pub mod services;
pub mod strategies;

// Re-export commonly used types
pub use ports::*;
pub use services::*;
pub use strategies::{Delivery, HookStrategy, InterceptStrategy, SubclassStrategy, Unregistration};
