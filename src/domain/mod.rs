//! Domain Layer - window registrations and the rules they obey
//!
//! This layer contains:
//! - **Entities**: Registration entries and the device interface
//! - **Value Objects**: Window handles, procedures, messages, strategy kind
//! - **Repositories**: The registry table
//! - **Domain Errors**: Error types for interception operations
//!
//! Nothing here touches the platform; everything is testable on any target.

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use errors::InterceptError;
pub use value_objects::*;
