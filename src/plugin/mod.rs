//! Storage plugin subsystem.
//!
//! # Data Flow
//! ```text
//! storage.plugin (config)
//!     → loader.rs (name → factory lookup)
//!     → Arc<dyn StoragePlugin> owned by the lifecycle controller
//!     → reconfigure() on every configuration change
//!     → shutdown() when the service stops
//! ```
//!
//! # Design Decisions
//! - Plugins are resolved by name at startup, never swapped while running
//! - Data operations live behind the plugin and are not modelled here

pub mod loader;
pub mod memory;

use thiserror::Error;

pub use loader::{LoadError, PluginLoader, PluginRegistry};
pub use memory::MemoryPlugin;

/// A storage backend implementation.
pub trait StoragePlugin: Send + Sync {
    /// Name the plugin was registered under.
    fn name(&self) -> &str;

    /// Apply a new value for a configuration category.
    fn reconfigure(&self, category: &str, value: &str) -> Result<(), PluginError>;

    /// Release backend resources. Called once, when the service stops.
    fn shutdown(&self) {}
}

/// Errors raised by a loaded plugin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    /// The plugin refused a configuration value.
    #[error("invalid value for category '{category}': {reason}")]
    InvalidConfig { category: String, reason: String },

    /// The plugin has already been shut down.
    #[error("plugin '{0}' is shut down")]
    ShutDown(String),
}
