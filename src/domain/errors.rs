//! Domain layer error types
//!
//! All errors that can occur while registering, unregistering or
//! dispatching for a window.

use thiserror::Error;

use super::value_objects::{ProcedureRef, WindowHandle};

/// Main interception error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterceptError {
    /// Growing the registration table failed
    #[error("Failed to grow the registration table to {requested} entries")]
    AllocationFailure { requested: usize },

    /// Operation on a window that has no registration entry
    #[error("Window {0} is not registered")]
    NotRegistered(WindowHandle),

    /// The application replaced the window procedure after registration
    #[error(
        "Window {window} procedure {} no longer matches the dispatcher, entry orphaned",
        display_procedure(.current)
    )]
    ProcedureMismatch {
        window: WindowHandle,
        current: Option<ProcedureRef>,
    },

    /// Registration attempted while the subsystem is not running
    #[error("Interception subsystem is not initialized")]
    Uninitialized,

    /// `initialize` called on a subsystem that already left the
    /// uninitialized state
    #[error("Interception subsystem was already initialized")]
    AlreadyInitialized,

    /// The platform refused to install a message observer
    #[error("Failed to install message observer: {0}")]
    ObserverInstall(String),

    /// Unrecognized strategy name
    #[error("Unknown interception strategy: {0}")]
    UnknownStrategy(String),
}

impl InterceptError {
    /// Errors that are logged and otherwise ignored; they never leave the
    /// subsystem in a worse state than before the call.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            InterceptError::NotRegistered(_) | InterceptError::ProcedureMismatch { .. }
        )
    }
}

fn display_procedure(procedure: &Option<ProcedureRef>) -> String {
    match procedure {
        Some(p) => p.to_string(),
        None => "(none)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_errors() {
        let window = WindowHandle::from_raw(1);
        assert!(InterceptError::NotRegistered(window).is_benign());
        assert!(InterceptError::ProcedureMismatch {
            window,
            current: None
        }
        .is_benign());
        assert!(!InterceptError::AllocationFailure { requested: 2 }.is_benign());
        assert!(!InterceptError::Uninitialized.is_benign());
    }

    #[test]
    fn test_mismatch_message() {
        let err = InterceptError::ProcedureMismatch {
            window: WindowHandle::from_raw(0x10),
            current: Some(ProcedureRef::from_address(0xbeef)),
        };
        assert_eq!(
            err.to_string(),
            "Window 0x10 procedure 0xbeef no longer matches the dispatcher, entry orphaned"
        );
    }
}
