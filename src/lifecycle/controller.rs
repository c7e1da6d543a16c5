//! Service lifecycle controller.
//!
//! # Responsibilities
//! - Load the storage plugin and register with the core on start
//! - Subscribe to the configured categories (failures are non-fatal)
//! - Route configuration changes to the plugin
//! - Unsubscribe and unregister on the way down
//!
//! # Design Decisions
//! - `start`/`stop`/`shutdown` are serialized by an async mutex
//! - `config_change` never waits on that mutex and never talks to the core
//! - A failed `start` leaves the controller in `Initializing` with no plugin held
//! - `shutdown` from `Running` performs `stop` first

use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::schema::StorageConfig;
use crate::lifecycle::state::LifecycleState;
use crate::observability::metrics;
use crate::plugin::{LoadError, PluginError, PluginLoader, StoragePlugin};
use crate::registration::{RegistrationClient, RegistrationError, ServiceIdentity, ServiceRecord};

/// Errors raised by lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The operation is not allowed in the current state.
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: LifecycleState,
    },

    /// The storage plugin could not be loaded.
    #[error("startup failed during plugin load: {0}")]
    PluginLoad(#[source] LoadError),

    /// Registration with the core failed.
    #[error("startup failed during registration: {0}")]
    Registration(#[source] RegistrationError),

    /// The plugin refused a configuration change.
    #[error("configuration change rejected: {0}")]
    Plugin(#[source] PluginError),
}

/// Drives the service through its lifecycle.
pub struct ServiceController {
    storage: StorageConfig,
    record: ServiceRecord,
    registration: Arc<RegistrationClient>,
    loader: Arc<dyn PluginLoader>,
    plugin: RwLock<Option<Arc<dyn StoragePlugin>>>,
    state: RwLock<LifecycleState>,
    transition: Mutex<()>,
}

impl ServiceController {
    pub fn new(
        storage: StorageConfig,
        record: ServiceRecord,
        registration: Arc<RegistrationClient>,
        loader: Arc<dyn PluginLoader>,
    ) -> Self {
        metrics::record_lifecycle_state(LifecycleState::Initializing);
        Self {
            storage,
            record,
            registration,
            loader,
            plugin: RwLock::new(None),
            state: RwLock::new(LifecycleState::Initializing),
            transition: Mutex::new(()),
        }
    }

    /// Load the plugin, register, subscribe, and enter `Running`.
    pub async fn start(&self) -> Result<ServiceIdentity, LifecycleError> {
        let _transition = self.transition.lock().await;
        self.expect_state("start", LifecycleState::Initializing)?;

        let plugin = self
            .loader
            .load_plugin(&self.storage.plugin)
            .map_err(LifecycleError::PluginLoad)?;

        let identity = self
            .registration
            .register(&self.record)
            .await
            .map_err(LifecycleError::Registration)?;

        *self.plugin.write().unwrap_or_else(PoisonError::into_inner) = Some(plugin);

        for category in &self.storage.categories {
            if let Err(e) = self.registration.subscribe_category(&identity, category).await {
                tracing::error!(
                    phase = "category subscription",
                    category = %category,
                    error = %e,
                    "Category subscription failed, changes to it will not be delivered"
                );
            }
        }

        self.set_state(LifecycleState::Running);
        tracing::info!(
            identity = %identity,
            plugin = %self.storage.plugin,
            subscriptions = self.registration.subscription_count(),
            "Service running"
        );
        Ok(identity)
    }

    /// Route a configuration change to the storage plugin.
    ///
    /// A change that loses a race with `shutdown` fails with
    /// `InvalidTransition` naming the state it lost to.
    pub fn config_change(&self, category: &str, value: &str) -> Result<(), LifecycleError> {
        const OPERATION: &str = "apply configuration change";
        self.expect_state(OPERATION, LifecycleState::Running)?;

        let Some(plugin) = self.plugin() else {
            return Err(self.wound_down(OPERATION));
        };

        match plugin.reconfigure(category, value) {
            Ok(()) => {
                metrics::record_config_change(category, "applied");
                tracing::info!(category = %category, plugin = %plugin.name(), "Configuration change applied");
                Ok(())
            }
            Err(PluginError::ShutDown(_)) => {
                metrics::record_config_change(category, "not_running");
                Err(self.wound_down(OPERATION))
            }
            Err(e) => {
                metrics::record_config_change(category, "rejected");
                tracing::warn!(category = %category, error = %e, "Configuration change rejected");
                Err(LifecycleError::Plugin(e))
            }
        }
    }

    /// Unsubscribe every category and enter `Stopping`.
    pub async fn stop(&self) -> Result<(), LifecycleError> {
        let _transition = self.transition.lock().await;
        self.expect_state("stop", LifecycleState::Running)?;
        self.stop_locked().await;
        Ok(())
    }

    /// Unregister and enter `Stopped`.
    pub async fn shutdown(&self) -> Result<(), LifecycleError> {
        let _transition = self.transition.lock().await;
        match self.state() {
            LifecycleState::Running => self.stop_locked().await,
            LifecycleState::Stopping => {}
            state => {
                return Err(LifecycleError::InvalidTransition {
                    operation: "shut down",
                    state,
                })
            }
        }

        match self.registration.identity() {
            Some(identity) => {
                if let Err(e) = self.registration.unregister(&identity).await {
                    tracing::warn!(identity = %identity, error = %e, "Unregistration failed, exiting anyway");
                }
            }
            None => tracing::warn!("No identity held at shutdown, skipping unregistration"),
        }
        self.registration.forget_identity();

        let leftover = self.registration.subscribed_categories();
        if !leftover.is_empty() {
            tracing::warn!(categories = ?leftover, "Subscriptions may remain at the core");
        }

        let plugin = self
            .plugin
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(plugin) = plugin {
            plugin.shutdown();
        }

        self.set_state(LifecycleState::Stopped);
        tracing::info!("Service stopped");
        Ok(())
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn identity(&self) -> Option<ServiceIdentity> {
        self.registration.identity()
    }

    pub fn registration(&self) -> &Arc<RegistrationClient> {
        &self.registration
    }

    pub fn plugin(&self) -> Option<Arc<dyn StoragePlugin>> {
        self.plugin
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn record(&self) -> &ServiceRecord {
        &self.record
    }

    /// Best-effort unsubscribe of every mapped category. Caller holds `transition`.
    async fn stop_locked(&self) {
        for category in self.registration.subscribed_categories() {
            if let Err(e) = self.registration.unsubscribe_category(&category).await {
                tracing::warn!(category = %category, error = %e, "Unsubscribe failed, continuing");
            }
        }
        self.set_state(LifecycleState::Stopping);
    }

    fn expect_state(
        &self,
        operation: &'static str,
        expected: LifecycleState,
    ) -> Result<(), LifecycleError> {
        let state = self.state();
        if state == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition { operation, state })
        }
    }

    /// Error for an operation overtaken by shutdown. The plugin is released
    /// only after `Stopping` is entered, so `Running` is never reported.
    fn wound_down(&self, operation: &'static str) -> LifecycleError {
        let state = match self.state() {
            LifecycleState::Running => LifecycleState::Stopping,
            state => state,
        };
        LifecycleError::InvalidTransition { operation, state }
    }

    fn set_state(&self, next: LifecycleState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let previous = *state;
        *state = next;
        drop(state);
        tracing::debug!(from = %previous, to = %next, "Lifecycle transition");
        metrics::record_lifecycle_state(next);
    }
}

impl std::fmt::Debug for ServiceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceController")
            .field("state", &self.state())
            .field("plugin", &self.storage.plugin)
            .field("registration", &self.registration)
            .finish()
    }
}
