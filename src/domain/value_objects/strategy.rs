//! StrategyKind value object - which interception strategy is in force

use std::fmt;
use std::str::FromStr;

use crate::domain::errors::InterceptError;

/// The two mutually exclusive ways of intercepting window messages.
///
/// Chosen once when the subsystem is composed; never mixed at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Replace each registered window's procedure with the dispatcher
    #[default]
    Subclass,
    /// Install one thread-wide observer that sees every window's messages
    Hook,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Subclass => "subclass",
            StrategyKind::Hook => "hook",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = InterceptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subclass" | "wndproc" => Ok(StrategyKind::Subclass),
            "hook" | "hooks" => Ok(StrategyKind::Hook),
            other => Err(InterceptError::UnknownStrategy(other.to_string())),
        }
    }
}
