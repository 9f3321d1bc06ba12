//! Infrastructure Layer - Composition of the subsystem

pub mod composition_root;

pub use composition_root::CompositionRoot;
