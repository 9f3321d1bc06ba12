//! hwnd-intercept library - window procedure interception for rendering devices
//!
//! A device registers the windows it renders to; every message for those
//! windows is routed to the device first, with the window's previous
//! procedure available as a fallback. Two strategies are available:
//! per-window subclassing and a thread-wide message hook.
//!
//! Everything except `platform` builds and tests on any target, using the
//! in-memory windowing layer from `adapters`.

pub mod log;

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod platform;
pub mod shared;

pub use application::services::{Interceptor, Lifecycle, Registration};
pub use application::strategies::{Delivery, Unregistration};
pub use domain::entities::{EntryState, MessageDevice};
pub use domain::errors::InterceptError;
pub use domain::value_objects::{Message, ProcedureRef, StrategyKind, TextEncoding, WindowHandle};
pub use infrastructure::CompositionRoot;
pub use shared::config::InterceptConfig;
