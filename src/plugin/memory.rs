//! In-memory storage plugin.

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::plugin::{PluginError, StoragePlugin};

/// Built-in backend keeping the latest value of each configuration category.
#[derive(Debug, Default)]
pub struct MemoryPlugin {
    settings: DashMap<String, String>,
    shut_down: AtomicBool,
}

impl MemoryPlugin {
    pub const NAME: &'static str = "memory";

    pub fn new() -> Self {
        Self::default()
    }

    /// Last value applied for `category`.
    pub fn setting(&self, category: &str) -> Option<String> {
        self.settings.get(category).map(|r| r.value().clone())
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl StoragePlugin for MemoryPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn reconfigure(&self, category: &str, value: &str) -> Result<(), PluginError> {
        if self.is_shut_down() {
            return Err(PluginError::ShutDown(Self::NAME.to_string()));
        }
        if value.trim().is_empty() {
            return Err(PluginError::InvalidConfig {
                category: category.to_string(),
                reason: "empty value".to_string(),
            });
        }

        self.settings.insert(category.to_string(), value.to_string());
        tracing::debug!(category = %category, "Memory plugin applied configuration");
        Ok(())
    }

    fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        self.settings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconfigure_keeps_latest_value() {
        let plugin = MemoryPlugin::new();
        plugin.reconfigure("Storage", r#"{"poolSize":"5"}"#).unwrap();
        plugin.reconfigure("Storage", r#"{"poolSize":"10"}"#).unwrap();
        assert_eq!(plugin.setting("Storage").unwrap(), r#"{"poolSize":"10"}"#);
        assert!(plugin.setting("Other").is_none());
    }

    #[test]
    fn test_rejects_empty_and_post_shutdown() {
        let plugin = MemoryPlugin::new();
        let err = plugin.reconfigure("Storage", "  ").unwrap_err();
        assert!(matches!(err, PluginError::InvalidConfig { .. }));

        plugin.shutdown();
        assert!(plugin.is_shut_down());
        let err = plugin.reconfigure("Storage", "{}").unwrap_err();
        assert_eq!(err, PluginError::ShutDown("memory".to_string()));
    }
}
