//! Interception strategies
//!
//! A strategy decides how messages reach the dispatcher (per-window procedure
//! replacement, or one thread-wide observer) and what happens to the result.
//! Exactly one is chosen when the subsystem is composed.

pub mod hook;
pub mod subclass;

pub use hook::HookStrategy;
pub use subclass::SubclassStrategy;

use crate::application::ports::WindowPlatform;
use crate::domain::entities::{EntrySnapshot, RegistrationEntry};
use crate::domain::errors::InterceptError;
use crate::domain::value_objects::{Message, ProcedureRef, StrategyKind, TextEncoding, WindowHandle};

/// Result of resolving a window against the registry for one message
#[derive(Debug)]
pub enum Lookup {
    /// Subsystem not initialized, or already torn down
    Inactive,
    /// No entry for the window
    Unregistered,
    /// Fields copied out of the window's entry
    Registered(EntrySnapshot),
}

/// What the platform callback should do after dispatch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Return this value to the platform
    Handled(isize),
    /// Hand the message on to the next observer
    Chain,
}

/// How a successful unregistration left the window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unregistration {
    /// The saved procedure was put back
    Restored,
    /// Nothing was installed per window; the entry was just dropped
    Removed,
    /// There was no procedure to put back; the dispatcher stays installed
    /// and the entry stays, passive
    Detached,
}

/// Capability interface shared by the two strategies
pub trait InterceptStrategy<P: WindowPlatform>: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Called once when the subsystem initializes
    fn start(&self, _platform: &P) -> Result<(), InterceptError> {
        Ok(())
    }

    /// Called once when the subsystem is torn down
    fn stop(&self, _platform: &P) {}

    /// Redirect `window` to the dispatcher; returns the procedure to chain to
    fn install(
        &self,
        platform: &P,
        window: WindowHandle,
        encoding: TextEncoding,
    ) -> Option<ProcedureRef>;

    /// Undo `install` for an entry.
    ///
    /// Returns `ProcedureMismatch` when undoing it is no longer safe; the
    /// caller then orphans the entry.
    fn uninstall(
        &self,
        platform: &P,
        entry: &RegistrationEntry,
    ) -> Result<Unregistration, InterceptError>;

    /// Route one message. Must not be called with the table lock held.
    fn deliver(&self, platform: &P, window: WindowHandle, message: Message, lookup: Lookup)
        -> Delivery;

    /// Called after the window procedure handled a message
    fn after_delivery(&self, _platform: &P, _message: Message) {}
}
