//! Domain Value Objects - Immutable values that describe characteristics
//!
//! Value objects have no identity and are compared by their values.
//! They are `Copy` and can be freely shared between callback threads.

pub mod strategy;
pub mod window;

pub use strategy::StrategyKind;
pub use window::{Message, ProcedureRef, TextEncoding, WindowHandle};
