//! HookStrategy - one thread-wide message observer
//!
//! No window procedure is touched. The observer sees every message for every
//! window on the thread, hands registered windows' messages to their device
//! and always lets delivery continue.

use parking_lot::Mutex;
use tracing::{debug, error};

use super::{Delivery, InterceptStrategy, Lookup, Unregistration};
use crate::application::ports::{ObserverHandle, ObserverKind, WindowPlatform};
use crate::domain::entities::RegistrationEntry;
use crate::domain::errors::InterceptError;
use crate::domain::value_objects::{Message, ProcedureRef, StrategyKind, TextEncoding, WindowHandle};

#[derive(Debug, Default)]
pub struct HookStrategy {
    hide_cursor: bool,
    observers: Mutex<Vec<ObserverHandle>>,
}

impl HookStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also install a post-delivery observer that clears the cursor after
    /// every set-cursor message
    pub fn with_hidden_cursor(mut self, hide_cursor: bool) -> Self {
        self.hide_cursor = hide_cursor;
        self
    }
}

impl<P: WindowPlatform> InterceptStrategy<P> for HookStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Hook
    }

    fn start(&self, platform: &P) -> Result<(), InterceptError> {
        let mut observers = self.observers.lock();

        let before = platform.install_observer(ObserverKind::BeforeDelivery)?;
        observers.push(before);
        debug!("Installed message observer {before:?}");

        if self.hide_cursor {
            match platform.install_observer(ObserverKind::AfterDelivery) {
                Ok(after) => {
                    observers.push(after);
                    debug!("Installed cursor observer {after:?}");
                }
                Err(e) => {
                    error!("Failed to install cursor observer: {e}");
                    for handle in observers.drain(..) {
                        platform.remove_observer(handle);
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn stop(&self, platform: &P) {
        let handles: Vec<_> = self.observers.lock().drain(..).collect();
        for handle in handles {
            debug!("Removing observer {handle:?}");
            platform.remove_observer(handle);
        }
    }

    fn install(
        &self,
        _platform: &P,
        _window: WindowHandle,
        _encoding: TextEncoding,
    ) -> Option<ProcedureRef> {
        None
    }

    fn uninstall(
        &self,
        _platform: &P,
        _entry: &RegistrationEntry,
    ) -> Result<Unregistration, InterceptError> {
        Ok(Unregistration::Removed)
    }

    fn deliver(
        &self,
        _platform: &P,
        window: WindowHandle,
        message: Message,
        lookup: Lookup,
    ) -> Delivery {
        if let Lookup::Registered(snapshot) = lookup {
            if let Some(device) = snapshot.device {
                device.handle_message(window, snapshot.encoding, message, snapshot.original_procedure);
            }
        }
        Delivery::Chain
    }

    fn after_delivery(&self, platform: &P, message: Message) {
        if self.hide_cursor && message.is_set_cursor() {
            platform.hide_cursor();
        }
    }
}
