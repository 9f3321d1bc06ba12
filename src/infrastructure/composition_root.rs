//! CompositionRoot - Dependency Injection Container
//!
//! Wires the configured strategy and a windowing layer into one interceptor
//! and owns it for the lifetime of the process.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapters::gateways::MemoryPlatform;
use crate::application::ports::WindowPlatform;
use crate::application::services::Interceptor;
use crate::application::strategies::{HookStrategy, InterceptStrategy, SubclassStrategy};
use crate::domain::errors::InterceptError;
use crate::domain::value_objects::StrategyKind;
use crate::shared::config::InterceptConfig;

/// Owns the interceptor and the configuration it was built from
pub struct CompositionRoot<P: WindowPlatform + 'static> {
    config: InterceptConfig,
    interceptor: Arc<Interceptor<P>>,
}

impl<P: WindowPlatform + 'static> CompositionRoot<P> {
    /// Compose against an arbitrary windowing layer
    pub fn with_platform(platform: P, config: InterceptConfig) -> Self {
        let strategy = build_strategy::<P>(&config);
        debug!("Composed interceptor with {} strategy", config.strategy);

        Self {
            interceptor: Arc::new(Interceptor::new(platform, strategy)),
            config,
        }
    }

    /// Start interception
    pub fn start(&self) -> Result<(), InterceptError> {
        self.interceptor.initialize()
    }

    /// Stop interception; safe to call more than once
    pub fn shutdown(&self) {
        self.interceptor.shutdown();
    }

    pub fn interceptor(&self) -> &Arc<Interceptor<P>> {
        &self.interceptor
    }

    pub fn config(&self) -> &InterceptConfig {
        &self.config
    }
}

impl CompositionRoot<MemoryPlatform> {
    /// Compose against the in-memory windowing layer
    pub fn in_memory(config: InterceptConfig) -> Self {
        Self::with_platform(MemoryPlatform::new(), config)
    }
}

#[cfg(target_os = "windows")]
impl CompositionRoot<crate::platform::win32::Win32Platform> {
    /// Compose against the real windowing layer and make the interceptor
    /// reachable from the window procedure and hook callbacks.
    pub fn win32(config: InterceptConfig) -> Self {
        let root = Self::with_platform(crate::platform::win32::Win32Platform::new(), config);
        crate::platform::win32::callbacks::publish(&root.interceptor);
        root
    }
}

fn build_strategy<P: WindowPlatform + 'static>(
    config: &InterceptConfig,
) -> Box<dyn InterceptStrategy<P>> {
    match config.strategy {
        StrategyKind::Subclass => {
            if config.hide_cursor {
                warn!("hide_cursor only applies to the hook strategy, ignoring it");
            }
            Box::new(SubclassStrategy::new())
        }
        StrategyKind::Hook => {
            Box::new(HookStrategy::new().with_hidden_cursor(config.hide_cursor))
        }
    }
}
