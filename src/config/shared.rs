//! Lock-free sharing of the live configuration.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::loader::{load_config, ConfigError, LoadedConfig};

/// The configuration every request handler reads.
///
/// Readers take a snapshot with [`SharedConfig::load`] and keep it for the
/// duration of their work. A reload builds and validates a complete new
/// value first and only then swaps the pointer; the live value is never
/// mutated.
pub struct SharedConfig {
    inner: ArcSwap<LoadedConfig>,
}

impl SharedConfig {
    pub fn new(initial: LoadedConfig) -> Self {
        Self {
            inner: ArcSwap::from_pointee(initial),
        }
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<LoadedConfig> {
        self.inner.load_full()
    }

    /// Install `next`, returning the snapshot it replaced.
    pub fn replace(&self, next: LoadedConfig) -> Arc<LoadedConfig> {
        self.inner.swap(Arc::new(next))
    }

    /// Load `path` and install it if, and only if, it is valid.
    pub fn reload_from(&self, path: &Path) -> Result<(), ConfigError> {
        let next = load_config(path)?;
        self.replace(next);
        tracing::info!(path = %path.display(), "Configuration reloaded");
        Ok(())
    }
}
