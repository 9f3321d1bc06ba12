//! Domain Entities - Core business objects
//!
//! Entities are objects with a distinct identity that persists over time:
//! the registration of a window, and the device it belongs to.

pub mod device;
pub mod registration;

pub use device::MessageDevice;
pub use registration::{EntrySnapshot, EntryState, RegistrationEntry};
