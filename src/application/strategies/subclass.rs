//! SubclassStrategy - per-window procedure replacement
//!
//! Each registered window gets the dispatcher as its procedure; the one it
//! replaced is saved and chained to, and restored on unregistration as long
//! as nobody stacked another procedure on top of ours.

use tracing::{trace, warn};

use super::{Delivery, InterceptStrategy, Lookup, Unregistration};
use crate::application::ports::WindowPlatform;
use crate::domain::entities::RegistrationEntry;
use crate::domain::errors::InterceptError;
use crate::domain::value_objects::{Message, ProcedureRef, StrategyKind, TextEncoding, WindowHandle};

#[derive(Clone, Copy, Debug, Default)]
pub struct SubclassStrategy;

impl SubclassStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl<P: WindowPlatform> InterceptStrategy<P> for SubclassStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Subclass
    }

    fn install(
        &self,
        platform: &P,
        window: WindowHandle,
        encoding: TextEncoding,
    ) -> Option<ProcedureRef> {
        // Use the entrypoint matching the window's encoding: some applications
        // call the previous procedure (ours) directly instead of through the
        // platform's forwarding call.
        let original = platform.replace_procedure(window, encoding, platform.dispatcher_procedure());
        trace!("Subclassed window {window}, original procedure {original:?}");
        original
    }

    fn uninstall(
        &self,
        platform: &P,
        entry: &RegistrationEntry,
    ) -> Result<Unregistration, InterceptError> {
        let window = entry.window();
        let current = platform.active_procedure(window, entry.encoding());
        if current != Some(platform.dispatcher_procedure()) {
            return Err(InterceptError::ProcedureMismatch { window, current });
        }

        match entry.original_procedure() {
            Some(original) => {
                platform.replace_procedure(window, entry.encoding(), original);
                Ok(Unregistration::Restored)
            }
            None => {
                warn!(
                    "Window {window} had no procedure before registration, leaving dispatcher installed"
                );
                Ok(Unregistration::Detached)
            }
        }
    }

    fn deliver(
        &self,
        platform: &P,
        window: WindowHandle,
        message: Message,
        lookup: Lookup,
    ) -> Delivery {
        let snapshot = match lookup {
            Lookup::Inactive => {
                let encoding = platform.window_encoding(window);
                return Delivery::Handled(platform.default_procedure(window, encoding, message));
            }
            Lookup::Unregistered => {
                warn!("Window {window} is not registered");
                let encoding = platform.window_encoding(window);
                return Delivery::Handled(platform.default_procedure(window, encoding, message));
            }
            Lookup::Registered(snapshot) => snapshot,
        };

        if let Some(device) = snapshot.device {
            return Delivery::Handled(device.handle_message(
                window,
                snapshot.encoding,
                message,
                snapshot.original_procedure,
            ));
        }

        match snapshot.original_procedure {
            Some(original) if original != platform.dispatcher_procedure() => Delivery::Handled(
                platform.call_procedure(original, window, snapshot.encoding, message),
            ),
            // degenerate reentry: chaining to ourselves would recurse forever
            _ => Delivery::Handled(platform.default_procedure(window, snapshot.encoding, message)),
        }
    }
}
