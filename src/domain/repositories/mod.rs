//! Domain Repositories - storage of domain entities
//!
//! The registry table is the only repository: an in-memory set of
//! registration entries guarded by the interceptor.

pub mod registry_table;

pub use registry_table::RegistryTable;
