//! Application Services - Coordination of registry, strategy and lifecycle

pub mod interceptor;

pub use interceptor::{Interceptor, Lifecycle, Registration};
