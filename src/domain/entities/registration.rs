//! RegistrationEntry entity - one intercepted window
//!
//! Tracks which device owns a window, how the window encodes text and which
//! procedure was active before interception.

use std::fmt;
use std::sync::{Arc, Weak};

use super::device::MessageDevice;
use crate::domain::value_objects::{ProcedureRef, TextEncoding, WindowHandle};

/// Where an entry sits in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    /// A live device receives every message
    Active,
    /// No device; messages pass through to the original procedure
    Passive,
    /// Procedure was replaced behind our back; kept only to block re-arming
    Orphaned,
}

/// A registered window
#[derive(Clone)]
pub struct RegistrationEntry {
    window: WindowHandle,
    encoding: TextEncoding,
    original_procedure: Option<ProcedureRef>,
    device: Option<Weak<dyn MessageDevice>>,
    orphaned: bool,
}

impl RegistrationEntry {
    pub fn new(
        window: WindowHandle,
        encoding: TextEncoding,
        original_procedure: Option<ProcedureRef>,
        device: &Arc<dyn MessageDevice>,
    ) -> Self {
        Self {
            window,
            encoding,
            original_procedure,
            device: Some(Arc::downgrade(device)),
            orphaned: false,
        }
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn original_procedure(&self) -> Option<ProcedureRef> {
        self.original_procedure
    }

    /// Strong reference to the device, if it is still attached and alive
    pub fn device(&self) -> Option<Arc<dyn MessageDevice>> {
        self.device.as_ref().and_then(Weak::upgrade)
    }

    /// Whether `device` is the one this entry was registered with
    pub fn is_owned_by(&self, device: &Arc<dyn MessageDevice>) -> bool {
        self.device
            .as_ref()
            .map_or(false, |weak| std::ptr::addr_eq(weak.as_ptr(), Arc::as_ptr(device)))
    }

    pub fn state(&self) -> EntryState {
        if self.orphaned {
            EntryState::Orphaned
        } else if self.device.as_ref().map_or(false, |w| w.strong_count() > 0) {
            EntryState::Active
        } else {
            EntryState::Passive
        }
    }

    pub fn is_orphaned(&self) -> bool {
        self.orphaned
    }

    /// Detach the device. Never undone.
    pub fn release_device(&mut self) {
        self.device = None;
    }

    /// Detach the device and mark the entry terminal
    pub fn orphan(&mut self) {
        self.device = None;
        self.orphaned = true;
    }

    /// Copy out everything dispatch needs, upgrading the device.
    ///
    /// A device whose owner already dropped it is released here, so the
    /// entry turns Passive for good.
    pub fn snapshot(&mut self) -> EntrySnapshot {
        let device = self.device();
        if device.is_none() {
            self.device = None;
        }
        EntrySnapshot {
            device,
            encoding: self.encoding,
            original_procedure: self.original_procedure,
        }
    }
}

impl fmt::Debug for RegistrationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationEntry")
            .field("window", &self.window)
            .field("encoding", &self.encoding)
            .field("original_procedure", &self.original_procedure)
            .field("state", &self.state())
            .finish()
    }
}

/// Fields of an entry copied out under the table lock
#[derive(Clone)]
pub struct EntrySnapshot {
    pub device: Option<Arc<dyn MessageDevice>>,
    pub encoding: TextEncoding,
    pub original_procedure: Option<ProcedureRef>,
}

impl fmt::Debug for EntrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntrySnapshot")
            .field("device", &self.device.is_some())
            .field("encoding", &self.encoding)
            .field("original_procedure", &self.original_procedure)
            .finish()
    }
}
