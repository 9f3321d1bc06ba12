//! RegistryTable - the set of registered windows
//!
//! Unordered and keyed by window. Cardinality is tiny (one entry per
//! rendering window) so lookups are a linear scan.

use tracing::error;

use crate::domain::entities::RegistrationEntry;
use crate::domain::errors::InterceptError;
use crate::domain::value_objects::WindowHandle;

/// Growable table of registration entries, unique by window.
///
/// Capacity doubles on overflow (1, 2, 4, ...). Removal swaps the last entry
/// into the freed slot; iteration order carries no meaning. Once closed, the
/// table stays empty for good.
#[derive(Debug, Default)]
pub struct RegistryTable {
    entries: Vec<RegistrationEntry>,
    closed: bool,
}

impl RegistryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn find(&self, window: WindowHandle) -> Option<&RegistrationEntry> {
        self.entries.iter().find(|e| e.window() == window)
    }

    pub fn find_mut(&mut self, window: WindowHandle) -> Option<&mut RegistrationEntry> {
        self.entries.iter_mut().find(|e| e.window() == window)
    }

    pub fn contains(&self, window: WindowHandle) -> bool {
        self.find(window).is_some()
    }

    /// Make room for one more entry, doubling capacity when full.
    ///
    /// Fails only if the allocation fails, in which case the table is left
    /// untouched.
    pub fn reserve(&mut self) -> Result<(), InterceptError> {
        let len = self.entries.len();
        let capacity = self.entries.capacity();
        if len < capacity {
            return Ok(());
        }

        let requested = (capacity * 2).max(1);
        self.entries
            .try_reserve_exact(requested - len)
            .map_err(|e| {
                error!("Failed to grow registration table to {requested} entries: {e}");
                InterceptError::AllocationFailure { requested }
            })
    }

    /// Insert a new entry, growing the table first if needed.
    ///
    /// Callers guarantee the window is not present yet.
    pub fn insert(&mut self, entry: RegistrationEntry) -> Result<(), InterceptError> {
        if self.closed {
            return Err(InterceptError::Uninitialized);
        }
        debug_assert!(
            !self.contains(entry.window()),
            "window {} registered twice",
            entry.window()
        );
        self.reserve()?;
        self.entries.push(entry);
        Ok(())
    }

    /// Remove the entry for `window`, moving the last entry into its slot
    pub fn remove(&mut self, window: WindowHandle) -> Option<RegistrationEntry> {
        let index = self.entries.iter().position(|e| e.window() == window)?;
        Some(self.entries.swap_remove(index))
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &RegistrationEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RegistrationEntry> {
        self.entries.iter_mut()
    }

    /// Remove every entry and refuse further inserts
    pub fn close(&mut self) -> Vec<RegistrationEntry> {
        self.closed = true;
        std::mem::take(&mut self.entries)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
