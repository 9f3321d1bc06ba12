//! MessageDevice - the rendering device a window is registered for
//!
//! The device is owned elsewhere; the registry only holds a `Weak` to it and
//! hands it messages.

use crate::domain::value_objects::{Message, ProcedureRef, TextEncoding, WindowHandle};

/// Entry point of the external device collaborator.
///
/// Called on whichever thread delivers the message, never while the
/// registry's lock is held, so implementations may register or unregister
/// windows from inside `handle_message`.
pub trait MessageDevice: Send + Sync {
    /// Handle one message for `window`.
    ///
    /// `fallback` is the procedure that was active before interception (if
    /// any); devices that want default behavior forward to it using
    /// `encoding`. Under the hook strategy the return value is discarded.
    fn handle_message(
        &self,
        window: WindowHandle,
        encoding: TextEncoding,
        message: Message,
        fallback: Option<ProcedureRef>,
    ) -> isize;
}
