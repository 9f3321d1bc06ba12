//! Window value objects - handles, procedures and messages
//!
//! These mirror the platform's native types as plain integers so they can be
//! copied across threads and compared without touching the platform.

use std::fmt;

/// Opaque identifier of a platform window.
///
/// The platform owns the window; this is only its address, widened to an
/// integer so it is `Send` and `Hash`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(usize);

impl WindowHandle {
    /// Wrap a raw native handle value
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// The raw native handle value
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Text encoding a window was created with.
///
/// Decides which of the two procedure entrypoints (narrow or wide) is used to
/// install and call procedures for that window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// Single-byte / ANSI code page messages
    Narrow,
    /// UTF-16 messages
    Wide,
}

impl TextEncoding {
    /// Map the platform's "is this window unicode" flag
    pub fn from_unicode_flag(unicode: bool) -> Self {
        if unicode {
            TextEncoding::Wide
        } else {
            TextEncoding::Narrow
        }
    }

    pub fn is_wide(self) -> bool {
        self == TextEncoding::Wide
    }
}

/// Address of a window procedure.
///
/// Never zero; a zero address read from the platform is represented as
/// `None` via [`ProcedureRef::from_raw`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProcedureRef(usize);

impl ProcedureRef {
    /// Wrap a raw procedure address, mapping zero to `None`
    pub fn from_raw(raw: usize) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Wrap the address of a procedure that is known to exist (a function
    /// item or a constant used by tests)
    pub const fn from_address(address: usize) -> Self {
        Self(address)
    }

    /// The raw procedure address
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProcedureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A message delivered by the platform to a window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Message {
    /// Message identifier
    pub id: u32,
    /// First machine-word parameter
    pub wparam: usize,
    /// Second machine-word parameter
    pub lparam: isize,
}

impl Message {
    /// Sent to a window when the cursor moves over it and needs a shape
    pub const SET_CURSOR: u32 = 0x0020;

    pub fn new(id: u32, wparam: usize, lparam: isize) -> Self {
        Self { id, wparam, lparam }
    }

    pub fn is_set_cursor(&self) -> bool {
        self.id == Self::SET_CURSOR
    }
}
