//! Plugin resolution by name.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::plugin::memory::MemoryPlugin;
use crate::plugin::StoragePlugin;

/// Errors raised while loading a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// No plugin is registered under this name.
    #[error("no storage plugin named '{0}'")]
    NotFound(String),

    /// The plugin exists but failed to initialize.
    #[error("storage plugin '{name}' failed to initialize: {reason}")]
    Init { name: String, reason: String },
}

/// Resolves and instantiates storage plugins.
pub trait PluginLoader: Send + Sync {
    fn load_plugin(&self, name: &str) -> Result<Arc<dyn StoragePlugin>, LoadError>;
}

type PluginFactory = Arc<dyn Fn() -> Result<Arc<dyn StoragePlugin>, String> + Send + Sync>;

/// Table of plugin factories keyed by name.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    factories: HashMap<String, PluginFactory>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the plugins compiled into this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(MemoryPlugin::NAME, || {
            Ok(Arc::new(MemoryPlugin::new()) as Arc<dyn StoragePlugin>)
        });
        registry
    }

    /// Register a factory, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Arc<dyn StoragePlugin>, String> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Registered plugin names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl PluginLoader for PluginRegistry {
    fn load_plugin(&self, name: &str) -> Result<Arc<dyn StoragePlugin>, LoadError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| LoadError::NotFound(name.to_string()))?;

        let plugin = factory().map_err(|reason| LoadError::Init {
            name: name.to_string(),
            reason,
        })?;
        tracing::info!(plugin = %name, "Loaded storage plugin");
        Ok(plugin)
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}
