//! Gateways - Port implementations that need no operating system

pub mod memory_platform;

pub use memory_platform::{ForwardedCall, MemoryPlatform};
