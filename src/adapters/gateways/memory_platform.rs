//! MemoryPlatform - In-memory windowing layer
//!
//! Simulates windows with a single active procedure each, records every
//! forwarded and default-handled message, and hands out observer handles.
//! Used by tests and by hosts that want to exercise the interceptor without
//! a real message loop.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::application::ports::{ObserverHandle, ObserverKind, WindowPlatform};
use crate::domain::errors::InterceptError;
use crate::domain::value_objects::{Message, ProcedureRef, TextEncoding, WindowHandle};

/// A message forwarded to a saved procedure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForwardedCall {
    pub procedure: ProcedureRef,
    pub window: WindowHandle,
    pub encoding: TextEncoding,
    pub message: Message,
}

#[derive(Clone, Copy, Debug)]
struct SimWindow {
    encoding: TextEncoding,
    procedure: Option<ProcedureRef>,
}

#[derive(Debug, Default)]
struct MemoryState {
    windows: HashMap<WindowHandle, SimWindow>,
    next_window: usize,
    observers: HashMap<ObserverHandle, ObserverKind>,
    next_observer: usize,
    refuse_observers: bool,
    default_deliveries: Vec<(WindowHandle, Message)>,
    forwarded: Vec<ForwardedCall>,
    cursor_hides: usize,
}

/// In-memory windowing layer
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    state: Mutex<MemoryState>,
}

impl MemoryPlatform {
    /// Address reported for the dispatcher entrypoint
    pub const DISPATCHER: ProcedureRef = ProcedureRef::from_address(0xd150_0000);

    /// Value returned by default handling
    pub const DEFAULT_RESULT: isize = 0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Create a window whose active procedure is `procedure`
    pub fn create_window(&self, encoding: TextEncoding, procedure: ProcedureRef) -> WindowHandle {
        self.add_window(encoding, Some(procedure))
    }

    /// Create a window that reports no procedure at all
    pub fn create_bare_window(&self, encoding: TextEncoding) -> WindowHandle {
        self.add_window(encoding, None)
    }

    fn add_window(&self, encoding: TextEncoding, procedure: Option<ProcedureRef>) -> WindowHandle {
        let mut state = self.state.lock();
        state.next_window += 1;
        let window = WindowHandle::from_raw(0x1_0000 + state.next_window * 0x10);
        state.windows.insert(window, SimWindow { encoding, procedure });
        window
    }

    /// Replace a window's procedure the way an application would
    pub fn set_procedure(&self, window: WindowHandle, procedure: ProcedureRef) {
        if let Some(sim) = self.state.lock().windows.get_mut(&window) {
            sim.procedure = Some(procedure);
        }
    }

    pub fn procedure_of(&self, window: WindowHandle) -> Option<ProcedureRef> {
        self.state.lock().windows.get(&window).and_then(|w| w.procedure)
    }

    /// Messages that reached default handling, in order
    pub fn default_deliveries(&self) -> Vec<(WindowHandle, Message)> {
        self.state.lock().default_deliveries.clone()
    }

    /// Messages forwarded to saved procedures, in order
    pub fn forwarded_calls(&self) -> Vec<ForwardedCall> {
        self.state.lock().forwarded.clone()
    }

    /// Kinds of the observers currently installed
    pub fn observers(&self) -> Vec<ObserverKind> {
        self.state.lock().observers.values().copied().collect()
    }

    pub fn cursor_hides(&self) -> usize {
        self.state.lock().cursor_hides
    }

    /// Make `install_observer` fail from now on
    pub fn refuse_observers(&self, refuse: bool) {
        self.state.lock().refuse_observers = refuse;
    }
}

impl WindowPlatform for MemoryPlatform {
    fn dispatcher_procedure(&self) -> ProcedureRef {
        Self::DISPATCHER
    }

    fn window_encoding(&self, window: WindowHandle) -> TextEncoding {
        self.state
            .lock()
            .windows
            .get(&window)
            .map_or(TextEncoding::Narrow, |w| w.encoding)
    }

    fn active_procedure(
        &self,
        window: WindowHandle,
        _encoding: TextEncoding,
    ) -> Option<ProcedureRef> {
        self.procedure_of(window)
    }

    fn replace_procedure(
        &self,
        window: WindowHandle,
        _encoding: TextEncoding,
        procedure: ProcedureRef,
    ) -> Option<ProcedureRef> {
        let mut state = self.state.lock();
        let sim = state.windows.get_mut(&window)?;
        sim.procedure.replace(procedure)
    }

    /// Records the call and returns the procedure's address as the result,
    /// so callers can tell which procedure answered.
    fn call_procedure(
        &self,
        procedure: ProcedureRef,
        window: WindowHandle,
        encoding: TextEncoding,
        message: Message,
    ) -> isize {
        self.state.lock().forwarded.push(ForwardedCall {
            procedure,
            window,
            encoding,
            message,
        });
        procedure.raw() as isize
    }

    fn default_procedure(
        &self,
        window: WindowHandle,
        _encoding: TextEncoding,
        message: Message,
    ) -> isize {
        self.state.lock().default_deliveries.push((window, message));
        Self::DEFAULT_RESULT
    }

    fn install_observer(&self, kind: ObserverKind) -> Result<ObserverHandle, InterceptError> {
        let mut state = self.state.lock();
        if state.refuse_observers {
            return Err(InterceptError::ObserverInstall(format!(
                "{kind:?} observer refused"
            )));
        }
        state.next_observer += 1;
        let handle = ObserverHandle(state.next_observer);
        state.observers.insert(handle, kind);
        Ok(handle)
    }

    fn remove_observer(&self, handle: ObserverHandle) {
        self.state.lock().observers.remove(&handle);
    }

    fn hide_cursor(&self) {
        self.state.lock().cursor_hides += 1;
    }
}
