//! WindowPlatform - interface to the host windowing layer
//!
//! Everything the interceptor needs from the platform: reading and swapping
//! window procedures, calling them, default handling and message observers.

use crate::domain::errors::InterceptError;
use crate::domain::value_objects::{Message, ProcedureRef, TextEncoding, WindowHandle};

/// Which phase of delivery an observer watches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObserverKind {
    /// Called before the window procedure sees the message
    BeforeDelivery,
    /// Called after the window procedure returned
    AfterDelivery,
}

/// Handle of an installed observer, used to remove it again
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverHandle(pub usize);

/// Port interface for the windowing layer
pub trait WindowPlatform: Send + Sync {
    /// Address of the entrypoint installed into subclassed windows
    fn dispatcher_procedure(&self) -> ProcedureRef;

    /// Text encoding the window was created with
    fn window_encoding(&self, window: WindowHandle) -> TextEncoding;

    /// The procedure currently active for `window`
    fn active_procedure(&self, window: WindowHandle, encoding: TextEncoding)
        -> Option<ProcedureRef>;

    /// Atomically install `procedure` and return the one it replaced
    fn replace_procedure(
        &self,
        window: WindowHandle,
        encoding: TextEncoding,
        procedure: ProcedureRef,
    ) -> Option<ProcedureRef>;

    /// Forward a message to `procedure` with the calling convention of
    /// `encoding`
    fn call_procedure(
        &self,
        procedure: ProcedureRef,
        window: WindowHandle,
        encoding: TextEncoding,
        message: Message,
    ) -> isize;

    /// Platform default handling for a message
    fn default_procedure(
        &self,
        window: WindowHandle,
        encoding: TextEncoding,
        message: Message,
    ) -> isize;

    /// Install a message observer for the calling thread
    fn install_observer(&self, kind: ObserverKind) -> Result<ObserverHandle, InterceptError>;

    /// Remove an observer installed by `install_observer`
    fn remove_observer(&self, handle: ObserverHandle);

    /// Clear the cursor shape
    fn hide_cursor(&self);
}
