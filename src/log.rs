//! File-based logging for debugging
//!
//! Installs a `tracing` subscriber that writes plain text to a file next to
//! the executable, or wherever the configuration points.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::shared::config::LogSettings;

/// Log file used when none is configured
pub const DEFAULT_LOG_FILE: &str = "hwnd-intercept.log";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log filter '{directive}': {source}")]
    Filter {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error("Failed to open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A global subscriber is already installed")]
    AlreadyInstalled,
}

/// Get the directory where the executable is located
pub fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Where `settings` puts the log file. Relative paths are taken from the
/// executable's directory.
pub fn log_path(settings: &LogSettings) -> PathBuf {
    match &settings.file {
        Some(file) if file.is_absolute() => file.clone(),
        Some(file) => exe_dir().join(file),
        None => exe_dir().join(DEFAULT_LOG_FILE),
    }
}

/// Initialize logging; returns the file being written
pub fn init(settings: &LogSettings) -> Result<PathBuf, LogError> {
    let filter = EnvFilter::try_new(&settings.level).map_err(|source| LogError::Filter {
        directive: settings.level.clone(),
        source,
    })?;

    let path = log_path(settings);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .map_err(|source| LogError::Open {
            path: path.clone(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_ids(true)
        .try_init()
        .map_err(|_| LogError::AlreadyInstalled)?;

    tracing::info!("=== hwnd-intercept log started ===");
    Ok(path)
}
