//! Interception Configuration
//!
//! Settings come from `intercept.toml`. Every key is looked up in the scope of
//! the running executable first (`[apps."name.exe"]`) and then in
//! `[defaults]`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::domain::value_objects::StrategyKind;

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "intercept.toml";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    defaults: toml::Table,
    #[serde(default)]
    apps: toml::Table,
}

// ============================================================================
// LAYERED SETTINGS
// ============================================================================

/// Raw settings with per-application override
#[derive(Clone, Debug, Default)]
pub struct LayeredSettings {
    defaults: toml::Table,
    app: Option<toml::Table>,
}

impl LayeredSettings {
    /// Parse settings, selecting the scope of `app_name` if the file has one.
    ///
    /// Application names are matched case-insensitively.
    pub fn parse(content: &str, app_name: Option<&str>) -> Result<Self, ConfigError> {
        let file: SettingsFile = toml::from_str(content)?;

        let app = app_name.and_then(|name| {
            file.apps
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .and_then(|(key, value)| match value.as_table() {
                    Some(table) => Some(table.clone()),
                    None => {
                        warn!("Ignoring [apps.\"{key}\"]: not a table");
                        None
                    }
                })
        });

        Ok(Self {
            defaults: file.defaults,
            app,
        })
    }

    /// Value of `key`, application scope first
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.app
            .as_ref()
            .and_then(|table| table.get(key))
            .or_else(|| self.defaults.get(key))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        let value = self.get(key)?;
        let text = value.as_str();
        if text.is_none() {
            warn!("Setting {key} = {value} is not a string, ignoring");
        }
        text
    }

    /// Whether an application scope was selected
    pub fn has_app_scope(&self) -> bool {
        self.app.is_some()
    }
}

// ============================================================================
// TYPED CONFIGURATION
// ============================================================================

/// Logging settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. "warn" or "hwnd_intercept=trace"
    pub level: String,
    /// Log file; `None` puts it next to the executable
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

/// Resolved interception settings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterceptConfig {
    pub strategy: StrategyKind,
    /// Clear the cursor after every set-cursor message (hook strategy only)
    pub hide_cursor: bool,
    pub log: LogSettings,
}

impl InterceptConfig {
    /// Build a typed snapshot; invalid values are logged and left at default
    pub fn resolve(settings: &LayeredSettings) -> Self {
        let mut config = Self::default();

        if let Some(name) = settings.get_str("strategy") {
            match name.parse() {
                Ok(strategy) => config.strategy = strategy,
                Err(e) => warn!("{e}, using {}", config.strategy),
            }
        }

        if let Some(value) = settings.get("hide_cursor") {
            match parse_switch(value) {
                Some(enabled) => config.hide_cursor = enabled,
                None => warn!("Invalid hide_cursor value {value}, leaving it disabled"),
            }
        }

        if let Some(level) = settings.get_str("log_level") {
            config.log.level = level.trim().to_string();
        }

        if let Some(file) = settings.get_str("log_file") {
            config.log.file = Some(PathBuf::from(file));
        }

        config
    }

    /// Find intercept.toml in standard locations
    pub fn find_config_path() -> Option<PathBuf> {
        // Check in order: %APPDATA%/hwnd-intercept, exe dir, cwd
        let candidates = [
            dirs::config_dir().map(|p| p.join("hwnd-intercept").join(CONFIG_FILE_NAME)),
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join(CONFIG_FILE_NAME))),
            Some(PathBuf::from(CONFIG_FILE_NAME)),
        ];

        candidates.into_iter().flatten().find(|c| c.exists())
    }

    /// Load configuration for the running executable, defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::find_config_path() else {
            return Self::default();
        };

        let app_name = current_app_name();
        Self::load_from_path(&path, app_name.as_deref()).unwrap_or_else(|e| {
            warn!("Failed to load {}: {e}", path.display());
            Self::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path, app_name: Option<&str>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let settings = LayeredSettings::parse(&content, app_name)?;
        Ok(Self::resolve(&settings))
    }
}

/// File name of the running executable, used to pick the application scope
pub fn current_app_name() -> Option<String> {
    std::env::current_exe()
        .ok()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// "enabled"/"disabled", a boolean, or an integer (bare or quoted) where
/// > 0 means on
fn parse_switch(value: &toml::Value) -> Option<bool> {
    match value {
        toml::Value::Boolean(b) => Some(*b),
        toml::Value::Integer(n) => Some(*n > 0),
        toml::Value::String(s) => match s.trim() {
            "enabled" => Some(true),
            "disabled" => Some(false),
            other => other.parse::<i64>().ok().map(|n| n > 0),
        },
        _ => None,
    }
}
