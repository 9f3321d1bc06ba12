//! Interceptor - the process-scoped interception subsystem
//!
//! Owns the registry table and the chosen strategy. Two independent guards:
//! one for the lifecycle state, one for the table. Neither is ever held while
//! calling into a device or a saved procedure, so a device may register or
//! unregister windows from inside its message handler.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use crate::application::ports::WindowPlatform;
use crate::application::strategies::{
    Delivery, HookStrategy, InterceptStrategy, Lookup, SubclassStrategy, Unregistration,
};
use crate::domain::entities::{EntryState, MessageDevice, RegistrationEntry};
use crate::domain::errors::InterceptError;
use crate::domain::repositories::RegistryTable;
use crate::domain::value_objects::{Message, StrategyKind, WindowHandle};

/// Subsystem lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Initialized,
    TornDown,
}

/// How a successful registration left the window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// A new entry was created and the strategy installed
    Inserted,
    /// The window already had a live entry; nothing changed
    AlreadyRegistered,
    /// The window has an orphaned entry; it stays orphaned
    Orphaned,
}

/// Window interception subsystem
pub struct Interceptor<P: WindowPlatform> {
    platform: P,
    strategy: Box<dyn InterceptStrategy<P>>,
    lifecycle: Mutex<Lifecycle>,
    table: Mutex<RegistryTable>,
}

impl<P: WindowPlatform + 'static> Interceptor<P> {
    /// Interceptor that subclasses every registered window
    pub fn subclassing(platform: P) -> Self {
        Self::new(platform, Box::new(SubclassStrategy::new()))
    }

    /// Interceptor that observes through a thread-wide hook
    pub fn hooking(platform: P, hide_cursor: bool) -> Self {
        Self::new(
            platform,
            Box::new(HookStrategy::new().with_hidden_cursor(hide_cursor)),
        )
    }
}

impl<P: WindowPlatform> Interceptor<P> {
    pub fn new(platform: P, strategy: Box<dyn InterceptStrategy<P>>) -> Self {
        Self {
            platform,
            strategy,
            lifecycle: Mutex::new(Lifecycle::Uninitialized),
            table: Mutex::new(RegistryTable::new()),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lock_lifecycle()
    }

    /// Whether messages are currently routed through the registry
    pub fn is_active(&self) -> bool {
        self.lifecycle() == Lifecycle::Initialized
    }

    /// Start the strategy and begin routing messages.
    ///
    /// Only valid once; a torn down subsystem cannot be restarted.
    pub fn initialize(&self) -> Result<(), InterceptError> {
        let mut lifecycle = self.lock_lifecycle();
        if *lifecycle != Lifecycle::Uninitialized {
            return Err(InterceptError::AlreadyInitialized);
        }

        self.strategy.start(&self.platform)?;
        *lifecycle = Lifecycle::Initialized;
        debug!("Interception initialized with {} strategy", self.strategy.kind());
        Ok(())
    }

    /// Stop routing messages, remove observers and drop every entry.
    ///
    /// Entries still present at this point are reported: they are either
    /// orphaned or belong to a device that was never unregistered.
    /// Idempotent.
    pub fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.lock_lifecycle(), Lifecycle::TornDown);
        if previous != Lifecycle::Initialized {
            return;
        }

        self.strategy.stop(&self.platform);

        let leftovers = self.lock_table().close();
        for entry in &leftovers {
            warn!("Leftover registration at shutdown: {entry:?}");
        }
        debug!("Interception torn down, {} leftover entries", leftovers.len());
    }

    /// Register `window` for `device`.
    ///
    /// Registering a window that already has an entry succeeds without
    /// changing anything. An orphaned entry is never re-armed.
    pub fn register(
        &self,
        window: WindowHandle,
        device: &Arc<dyn MessageDevice>,
    ) -> Result<Registration, InterceptError> {
        if !self.is_active() {
            warn!("Refusing to register window {window}, interception is not running");
            return Err(InterceptError::Uninitialized);
        }

        let mut table = self.lock_table();
        // shutdown may have run since the lifecycle check
        if table.is_closed() {
            warn!("Refusing to register window {window}, interception was torn down");
            return Err(InterceptError::Uninitialized);
        }
        if let Some(entry) = table.find(window) {
            if entry.is_orphaned() {
                warn!("Window {window} is orphaned, not registering it again");
                return Ok(Registration::Orphaned);
            }
            warn!("Window {window} is already registered");
            return Ok(Registration::AlreadyRegistered);
        }

        table.reserve()?;
        let encoding = self.platform.window_encoding(window);
        let original = self.strategy.install(&self.platform, window, encoding);
        table.insert(RegistrationEntry::new(window, encoding, original, device))?;

        debug!("Registered window {window} ({encoding:?}), {} entries", table.len());
        Ok(Registration::Inserted)
    }

    /// Unregister `window`, restoring its procedure when that is still safe.
    ///
    /// If the application replaced the procedure after registration the
    /// entry is orphaned instead: its device is detached, it stays in the
    /// table, and no later call tries to restore it. A window that had no
    /// procedure to restore keeps a passive entry, so its messages still get
    /// default handling quietly.
    pub fn unregister(&self, window: WindowHandle) -> Result<Unregistration, InterceptError> {
        let mut table = self.lock_table();
        let Some(entry) = table.find_mut(window) else {
            warn!("Window {window} is not registered");
            return Err(InterceptError::NotRegistered(window));
        };

        if entry.is_orphaned() {
            let current = self.platform.active_procedure(window, entry.encoding());
            warn!("Window {window} is orphaned, not unregistering");
            return Err(InterceptError::ProcedureMismatch { window, current });
        }

        match self.strategy.uninstall(&self.platform, entry) {
            Ok(Unregistration::Detached) => {
                entry.release_device();
                debug!("Detached window {window}, dispatcher stays installed");
                Ok(Unregistration::Detached)
            }
            Ok(outcome) => {
                table.remove(window);
                debug!("Unregistered window {window} ({outcome:?})");
                Ok(outcome)
            }
            Err(err @ InterceptError::ProcedureMismatch { .. }) => {
                entry.orphan();
                warn!("Not unregistering window {window}: {err}");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Detach `device` from every entry it owns; returns how many.
    ///
    /// The entries stay registered and pass messages through.
    pub fn release_device(&self, device: &Arc<dyn MessageDevice>) -> usize {
        let mut released = 0;
        for entry in self.lock_table().iter_mut() {
            if entry.is_owned_by(device) {
                entry.release_device();
                released += 1;
            }
        }
        debug!("Released device from {released} entries");
        released
    }

    /// Route one message for `window`.
    ///
    /// The entry is copied out under the table lock and the lock released
    /// before the device or any saved procedure is called.
    pub fn dispatch(&self, window: WindowHandle, message: Message) -> Delivery {
        let lookup = self.lookup(window);
        trace!("Dispatching {:#06x} for window {window}: {lookup:?}", message.id);
        self.strategy.deliver(&self.platform, window, message, lookup)
    }

    /// Post-delivery notification from the platform
    pub fn after_delivery(&self, message: Message) {
        if self.is_active() {
            self.strategy.after_delivery(&self.platform, message);
        }
    }

    /// Copy of the entry for `window`
    pub fn entry(&self, window: WindowHandle) -> Option<RegistrationEntry> {
        self.lock_table().find(window).cloned()
    }

    pub fn entry_state(&self, window: WindowHandle) -> Option<EntryState> {
        self.lock_table().find(window).map(RegistrationEntry::state)
    }

    pub fn len(&self) -> usize {
        self.lock_table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_table().is_empty()
    }

    fn lookup(&self, window: WindowHandle) -> Lookup {
        if !self.is_active() {
            return Lookup::Inactive;
        }

        let mut table = self.lock_table();
        if table.is_closed() {
            return Lookup::Inactive;
        }
        match table.find_mut(window) {
            Some(entry) => Lookup::Registered(entry.snapshot()),
            None => Lookup::Unregistered,
        }
    }

    fn lock_table(&self) -> MutexGuard<'_, RegistryTable> {
        trace!("LOCK table");
        self.table.lock()
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock()
    }
}

impl<P: WindowPlatform> Drop for Interceptor<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{OnceLock, Weak};
    use std::thread;

    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;
    use crate::adapters::gateways::MemoryPlatform;
    use crate::application::ports::ObserverKind;
    use crate::domain::value_objects::{ProcedureRef, TextEncoding};

    const P0: ProcedureRef = ProcedureRef::from_address(0x4000);
    const P2: ProcedureRef = ProcedureRef::from_address(0x8000);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Call {
        window: WindowHandle,
        encoding: TextEncoding,
        message: Message,
        fallback: Option<ProcedureRef>,
    }

    #[derive(Default)]
    struct RecordingDevice {
        calls: parking_lot::Mutex<Vec<Call>>,
    }

    impl RecordingDevice {
        const RESULT: isize = 42;

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }
    }

    impl MessageDevice for RecordingDevice {
        fn handle_message(
            &self,
            window: WindowHandle,
            encoding: TextEncoding,
            message: Message,
            fallback: Option<ProcedureRef>,
        ) -> isize {
            self.calls.lock().push(Call {
                window,
                encoding,
                message,
                fallback,
            });
            Self::RESULT
        }
    }

    #[derive(Clone, Default)]
    struct WarningCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarningCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_warnings<R>(f: impl FnOnce() -> R) -> (R, usize) {
        let counter = WarningCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, counter.0.load(Ordering::SeqCst))
    }

    fn started_subclass() -> Interceptor<MemoryPlatform> {
        let interceptor = Interceptor::subclassing(MemoryPlatform::new());
        interceptor.initialize().unwrap();
        interceptor
    }

    fn started_hook(hide_cursor: bool) -> Interceptor<MemoryPlatform> {
        let interceptor = Interceptor::hooking(MemoryPlatform::new(), hide_cursor);
        interceptor.initialize().unwrap();
        interceptor
    }

    fn recorder() -> (Arc<RecordingDevice>, Arc<dyn MessageDevice>) {
        let recorder = Arc::new(RecordingDevice::default());
        let device: Arc<dyn MessageDevice> = recorder.clone();
        (recorder, device)
    }

    #[test]
    fn test_register_dispatch_unregister_narrow_window() {
        let interceptor = started_subclass();
        let a = interceptor.platform().create_window(TextEncoding::Narrow, P0);
        let (d1, device) = recorder();

        assert_eq!(interceptor.register(a, &device), Ok(Registration::Inserted));

        let entry = interceptor.entry(a).unwrap();
        assert_eq!(interceptor.len(), 1);
        assert_eq!(entry.window(), a);
        assert_eq!(entry.encoding(), TextEncoding::Narrow);
        assert_eq!(entry.original_procedure(), Some(P0));
        assert_eq!(entry.state(), EntryState::Active);
        assert_eq!(
            interceptor.platform().procedure_of(a),
            Some(MemoryPlatform::DISPATCHER)
        );

        let message = Message::new(0x0100, 0x41, 7);
        assert_eq!(
            interceptor.dispatch(a, message),
            Delivery::Handled(RecordingDevice::RESULT)
        );
        assert_eq!(
            d1.calls(),
            vec![Call {
                window: a,
                encoding: TextEncoding::Narrow,
                message,
                fallback: Some(P0),
            }]
        );

        assert_eq!(interceptor.unregister(a), Ok(Unregistration::Restored));
        assert!(interceptor.is_empty());
        assert_eq!(interceptor.platform().procedure_of(a), Some(P0));
    }

    #[test]
    fn test_replaced_procedure_orphans_entry() {
        let interceptor = started_subclass();
        let a = interceptor.platform().create_window(TextEncoding::Narrow, P0);
        let (d1, device) = recorder();
        interceptor.register(a, &device).unwrap();

        interceptor.platform().set_procedure(a, P2);
        let (result, warnings) = count_warnings(|| interceptor.unregister(a));

        assert_eq!(
            result,
            Err(InterceptError::ProcedureMismatch {
                window: a,
                current: Some(P2)
            })
        );
        assert!(warnings >= 1);
        assert_eq!(interceptor.len(), 1);
        assert_eq!(interceptor.entry_state(a), Some(EntryState::Orphaned));
        assert!(interceptor.entry(a).unwrap().device().is_none());
        assert_eq!(interceptor.platform().procedure_of(a), Some(P2));

        // the application's procedure still chains to ours; we pass through
        let message = Message::new(0x0005, 0, 0);
        assert_eq!(interceptor.dispatch(a, message), Delivery::Handled(P0.raw() as isize));
        assert!(d1.calls().is_empty());
    }

    #[test]
    fn test_orphan_is_never_restored_or_rearmed() {
        let interceptor = started_subclass();
        let a = interceptor.platform().create_window(TextEncoding::Wide, P0);
        let (_d1, device) = recorder();
        interceptor.register(a, &device).unwrap();
        interceptor.platform().set_procedure(a, P2);
        assert!(interceptor.unregister(a).is_err());

        // the application puts our dispatcher back; still no restoration
        interceptor
            .platform()
            .set_procedure(a, MemoryPlatform::DISPATCHER);
        let result = interceptor.unregister(a);
        assert!(matches!(
            result,
            Err(InterceptError::ProcedureMismatch { .. })
        ));
        assert_eq!(
            interceptor.platform().procedure_of(a),
            Some(MemoryPlatform::DISPATCHER)
        );

        let (_d2, other) = recorder();
        assert_eq!(interceptor.register(a, &other), Ok(Registration::Orphaned));
        assert_eq!(interceptor.entry_state(a), Some(EntryState::Orphaned));
        assert_eq!(interceptor.len(), 1);
    }

    #[test]
    fn test_double_registration_is_idempotent() {
        let interceptor = started_subclass();
        let a = interceptor.platform().create_window(TextEncoding::Narrow, P0);
        let (_d1, device) = recorder();

        assert_eq!(interceptor.register(a, &device), Ok(Registration::Inserted));
        let before = format!("{:?}", interceptor.entry(a).unwrap());

        let (second, warnings) = count_warnings(|| interceptor.register(a, &device));
        assert_eq!(second, Ok(Registration::AlreadyRegistered));
        assert!(warnings >= 1);

        assert_eq!(interceptor.len(), 1);
        assert_eq!(format!("{:?}", interceptor.entry(a).unwrap()), before);
        // the second call must not have subclassed our own dispatcher
        assert_eq!(interceptor.entry(a).unwrap().original_procedure(), Some(P0));
    }

    #[test]
    fn test_unregistered_window_gets_default_handling() {
        let interceptor = started_subclass();
        let a = interceptor.platform().create_window(TextEncoding::Narrow, P0);
        let b = interceptor.platform().create_window(TextEncoding::Narrow, P2);
        let (d1, device) = recorder();
        interceptor.register(a, &device).unwrap();

        let message = Message::new(0x0200, 1, 2);
        assert_eq!(
            interceptor.dispatch(b, message),
            Delivery::Handled(MemoryPlatform::DEFAULT_RESULT)
        );
        assert_eq!(interceptor.platform().default_deliveries(), vec![(b, message)]);
        assert!(d1.calls().is_empty());
    }

    #[test]
    fn test_unregister_unknown_window() {
        let interceptor = started_subclass();
        let window = WindowHandle::from_raw(0x99);

        let (result, warnings) = count_warnings(|| interceptor.unregister(window));
        assert_eq!(result, Err(InterceptError::NotRegistered(window)));
        assert!(result.unwrap_err().is_benign());
        assert!(warnings >= 1);
    }

    #[test]
    fn test_uninitialized_bypasses_and_refuses() {
        let interceptor = Interceptor::subclassing(MemoryPlatform::new());
        let a = interceptor.platform().create_window(TextEncoding::Narrow, P0);
        let (_d1, device) = recorder();

        assert_eq!(interceptor.lifecycle(), Lifecycle::Uninitialized);
        assert_eq!(
            interceptor.register(a, &device),
            Err(InterceptError::Uninitialized)
        );
        assert_eq!(interceptor.platform().procedure_of(a), Some(P0));

        let message = Message::new(0x000f, 0, 0);
        assert_eq!(
            interceptor.dispatch(a, message),
            Delivery::Handled(MemoryPlatform::DEFAULT_RESULT)
        );
    }

    #[test]
    fn test_shutdown_bypasses_and_reports_leftovers() {
        let interceptor = started_subclass();
        let a = interceptor.platform().create_window(TextEncoding::Narrow, P0);
        let (d1, device) = recorder();
        interceptor.register(a, &device).unwrap();

        let ((), warnings) = count_warnings(|| interceptor.shutdown());
        assert!(warnings >= 1);
        assert_eq!(interceptor.lifecycle(), Lifecycle::TornDown);
        assert!(interceptor.is_empty());

        let message = Message::new(0x0010, 0, 0);
        assert_eq!(
            interceptor.dispatch(a, message),
            Delivery::Handled(MemoryPlatform::DEFAULT_RESULT)
        );
        assert!(d1.calls().is_empty());

        assert_eq!(
            interceptor.initialize(),
            Err(InterceptError::AlreadyInitialized)
        );
        interceptor.shutdown();
    }

    #[test]
    fn test_dropped_device_passes_through_with_window_encoding() {
        let interceptor = started_subclass();
        let a = interceptor.platform().create_window(TextEncoding::Wide, P0);
        let (recorder, device) = recorder();
        interceptor.register(a, &device).unwrap();
        drop(device);
        drop(recorder);

        let message = Message::new(0x0102, 0x61, 0);
        assert_eq!(interceptor.dispatch(a, message), Delivery::Handled(P0.raw() as isize));
        assert_eq!(interceptor.entry_state(a), Some(EntryState::Passive));

        let forwarded = interceptor.platform().forwarded_calls();
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0].procedure, P0);
        assert_eq!(forwarded[0].encoding, TextEncoding::Wide);
        assert_eq!(forwarded[0].message, message);
    }

    #[test]
    fn test_self_chaining_procedure_falls_back_to_default() {
        let interceptor = started_subclass();
        let a = interceptor
            .platform()
            .create_window(TextEncoding::Narrow, MemoryPlatform::DISPATCHER);
        let (_recorder, device) = recorder();
        interceptor.register(a, &device).unwrap();
        interceptor.release_device(&device);

        let message = Message::new(0x0001, 0, 0);
        assert_eq!(
            interceptor.dispatch(a, message),
            Delivery::Handled(MemoryPlatform::DEFAULT_RESULT)
        );
        assert!(interceptor.platform().forwarded_calls().is_empty());
    }

    #[test]
    fn test_release_device_detaches_all_its_windows() {
        let interceptor = started_subclass();
        let a = interceptor.platform().create_window(TextEncoding::Narrow, P0);
        let b = interceptor.platform().create_window(TextEncoding::Narrow, P2);
        let c = interceptor.platform().create_window(TextEncoding::Narrow, P2);
        let (_d1, device) = recorder();
        let (_d2, other) = recorder();
        interceptor.register(a, &device).unwrap();
        interceptor.register(b, &device).unwrap();
        interceptor.register(c, &other).unwrap();

        assert_eq!(interceptor.release_device(&device), 2);
        assert_eq!(interceptor.entry_state(a), Some(EntryState::Passive));
        assert_eq!(interceptor.entry_state(b), Some(EntryState::Passive));
        assert_eq!(interceptor.entry_state(c), Some(EntryState::Active));

        // passive windows still unregister cleanly
        assert_eq!(interceptor.unregister(a), Ok(Unregistration::Restored));
        assert_eq!(interceptor.platform().procedure_of(a), Some(P0));
    }

    struct ReentrantDevice {
        interceptor: OnceLock<Weak<Interceptor<MemoryPlatform>>>,
        other_window: WindowHandle,
        other_device: Arc<dyn MessageDevice>,
        calls: AtomicUsize,
    }

    impl MessageDevice for ReentrantDevice {
        fn handle_message(
            &self,
            window: WindowHandle,
            _encoding: TextEncoding,
            _message: Message,
            _fallback: Option<ProcedureRef>,
        ) -> isize {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(interceptor) = self.interceptor.get().and_then(Weak::upgrade) {
                let registered = interceptor.register(self.other_window, &self.other_device);
                assert_eq!(registered, Ok(Registration::Inserted));
                assert_eq!(interceptor.unregister(window), Ok(Unregistration::Restored));
            }
            1
        }
    }

    #[test]
    fn test_device_may_reenter_registry() {
        let interceptor = Arc::new(started_subclass());
        let a = interceptor.platform().create_window(TextEncoding::Narrow, P0);
        let b = interceptor.platform().create_window(TextEncoding::Wide, P2);
        let (_d2, other_device) = recorder();

        let reentrant = Arc::new(ReentrantDevice {
            interceptor: OnceLock::new(),
            other_window: b,
            other_device,
            calls: AtomicUsize::new(0),
        });
        let _ = reentrant.interceptor.set(Arc::downgrade(&interceptor));
        let device: Arc<dyn MessageDevice> = reentrant.clone();
        interceptor.register(a, &device).unwrap();

        assert_eq!(
            interceptor.dispatch(a, Message::new(0x0100, 0, 0)),
            Delivery::Handled(1)
        );
        assert_eq!(reentrant.calls.load(Ordering::SeqCst), 1);
        assert!(interceptor.entry(a).is_none());
        assert_eq!(interceptor.entry_state(b), Some(EntryState::Active));
        assert_eq!(interceptor.platform().procedure_of(a), Some(P0));
    }

    #[test]
    fn test_concurrent_registration_from_many_threads() {
        let interceptor = Arc::new(started_subclass());
        let (_recorder, device) = recorder();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let interceptor = Arc::clone(&interceptor);
                let device = Arc::clone(&device);
                thread::spawn(move || {
                    let mut kept = Vec::new();
                    for i in 0..50 {
                        let window = interceptor
                            .platform()
                            .create_window(TextEncoding::Narrow, P0);
                        interceptor.register(window, &device).unwrap();
                        interceptor.dispatch(window, Message::new(0x0100, i, 0));
                        if i % 2 == 0 {
                            interceptor.unregister(window).unwrap();
                        } else {
                            kept.push(window);
                        }
                    }
                    kept
                })
            })
            .collect();

        let kept: Vec<WindowHandle> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(interceptor.len(), kept.len());
        for window in kept {
            assert_eq!(interceptor.entry_state(window), Some(EntryState::Active));
        }
    }

    #[test]
    fn test_hook_observes_and_chains() {
        let interceptor = started_hook(false);
        assert_eq!(interceptor.strategy_kind(), StrategyKind::Hook);
        assert_eq!(
            interceptor.platform().observers(),
            vec![ObserverKind::BeforeDelivery]
        );

        let a = interceptor.platform().create_window(TextEncoding::Wide, P0);
        let (d1, device) = recorder();
        assert_eq!(interceptor.register(a, &device), Ok(Registration::Inserted));
        assert_eq!(interceptor.entry(a).unwrap().original_procedure(), None);
        assert_eq!(interceptor.platform().procedure_of(a), Some(P0));

        let message = Message::new(0x0100, 0, 0);
        assert_eq!(interceptor.dispatch(a, message), Delivery::Chain);
        assert_eq!(d1.calls().len(), 1);
        assert_eq!(d1.calls()[0].fallback, None);

        let b = interceptor.platform().create_window(TextEncoding::Wide, P2);
        assert_eq!(interceptor.dispatch(b, message), Delivery::Chain);
        assert!(interceptor.platform().default_deliveries().is_empty());

        assert_eq!(interceptor.unregister(a), Ok(Unregistration::Removed));
        assert!(interceptor.is_empty());

        interceptor.shutdown();
        assert!(interceptor.platform().observers().is_empty());
    }

    #[test]
    fn test_hook_hides_cursor_after_set_cursor() {
        let interceptor = started_hook(true);
        let mut observers = interceptor.platform().observers();
        observers.sort_by_key(|k| *k == ObserverKind::AfterDelivery);
        assert_eq!(
            observers,
            vec![ObserverKind::BeforeDelivery, ObserverKind::AfterDelivery]
        );

        interceptor.after_delivery(Message::new(Message::SET_CURSOR, 0, 0));
        interceptor.after_delivery(Message::new(0x0200, 0, 0));
        assert_eq!(interceptor.platform().cursor_hides(), 1);

        interceptor.shutdown();
        interceptor.after_delivery(Message::new(Message::SET_CURSOR, 0, 0));
        assert_eq!(interceptor.platform().cursor_hides(), 1);
        assert!(interceptor.platform().observers().is_empty());
    }

    #[test]
    fn test_hook_start_failure_leaves_uninitialized() {
        let platform = MemoryPlatform::new();
        platform.refuse_observers(true);
        let interceptor = Interceptor::hooking(platform, true);

        assert!(matches!(
            interceptor.initialize(),
            Err(InterceptError::ObserverInstall(_))
        ));
        assert_eq!(interceptor.lifecycle(), Lifecycle::Uninitialized);
        assert!(interceptor.platform().observers().is_empty());
    }

    #[test]
    fn test_register_racing_shutdown_is_refused() {
        let interceptor = Arc::new(started_subclass());
        let a = interceptor.platform().create_window(TextEncoding::Narrow, P0);
        let (d1, device) = recorder();

        // park a registration behind the table lock, then tear down underneath it
        let mut table = interceptor.table.lock();
        let pending = {
            let interceptor = Arc::clone(&interceptor);
            thread::spawn(move || interceptor.register(a, &device))
        };
        thread::sleep(std::time::Duration::from_millis(50));
        *interceptor.lifecycle.lock() = Lifecycle::TornDown;
        assert!(table.close().is_empty());
        drop(table);

        assert_eq!(pending.join().unwrap(), Err(InterceptError::Uninitialized));
        assert!(interceptor.is_empty());
        assert_eq!(interceptor.platform().procedure_of(a), Some(P0));

        let message = Message::new(0x0100, 0, 0);
        assert_eq!(
            interceptor.dispatch(a, message),
            Delivery::Handled(MemoryPlatform::DEFAULT_RESULT)
        );
        assert!(d1.calls().is_empty());
    }

    #[test]
    fn test_hook_chains_when_not_running() {
        let interceptor = Interceptor::hooking(MemoryPlatform::new(), false);
        let a = interceptor.platform().create_window(TextEncoding::Wide, P0);
        let (d1, device) = recorder();
        let message = Message::new(0x0100, 0, 0);

        assert_eq!(interceptor.dispatch(a, message), Delivery::Chain);

        interceptor.initialize().unwrap();
        interceptor.register(a, &device).unwrap();
        interceptor.shutdown();

        assert_eq!(interceptor.dispatch(a, message), Delivery::Chain);
        assert!(interceptor.platform().default_deliveries().is_empty());
        assert!(interceptor.platform().forwarded_calls().is_empty());
        assert!(d1.calls().is_empty());
    }

    #[test]
    fn test_window_without_procedure_stays_passive() {
        let interceptor = started_subclass();
        let a = interceptor.platform().create_bare_window(TextEncoding::Narrow);
        let (d1, device) = recorder();

        assert_eq!(interceptor.register(a, &device), Ok(Registration::Inserted));
        assert_eq!(interceptor.entry(a).unwrap().original_procedure(), None);

        assert_eq!(interceptor.unregister(a), Ok(Unregistration::Detached));
        assert_eq!(interceptor.entry_state(a), Some(EntryState::Passive));
        assert_eq!(
            interceptor.platform().procedure_of(a),
            Some(MemoryPlatform::DISPATCHER)
        );

        let message = Message::new(0x0100, 0, 0);
        let (delivery, warnings) = count_warnings(|| interceptor.dispatch(a, message));
        assert_eq!(delivery, Delivery::Handled(MemoryPlatform::DEFAULT_RESULT));
        assert_eq!(warnings, 0);
        assert!(d1.calls().is_empty());

        assert_eq!(interceptor.unregister(a), Ok(Unregistration::Detached));
        assert_eq!(interceptor.len(), 1);
    }
}
