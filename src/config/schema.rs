//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::registration::ServiceRecord;

/// Root configuration for the storage service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// How this service describes itself to the core.
    pub service: ServiceSection,

    /// Location of the management core.
    pub core: CoreConfig,

    /// Storage plugin and the categories it depends on.
    pub storage: StorageConfig,

    /// Inbound management API.
    pub management: ManagementConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServiceConfig {
    /// Build the record sent to the core on registration.
    pub fn service_record(&self) -> ServiceRecord {
        ServiceRecord::new(
            self.service.name.clone(),
            self.service.service_type.clone(),
            self.service.address.clone(),
            self.service.port,
        )
        .with_protocol(self.service.protocol.clone())
    }
}

/// Service identity as advertised to the core.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceSection {
    /// Service name (unique within the core).
    pub name: String,

    /// Service type.
    pub service_type: String,

    /// Protocol spoken on the service port.
    pub protocol: String,

    /// Address the service is reachable on.
    pub address: String,

    /// Service port.
    pub port: u16,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: "FogLAMP Storage".to_string(),
            service_type: "Storage".to_string(),
            protocol: "http".to_string(),
            address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Management core connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Core hostname or IP.
    pub host: String,

    /// Core management port.
    pub port: u16,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8082,
            request_timeout_secs: 10,
        }
    }
}

/// Storage backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Name of the storage plugin to load.
    pub plugin: String,

    /// Configuration categories to subscribe to at startup.
    pub categories: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            plugin: "memory".to_string(),
            categories: vec!["Storage".to_string()],
        }
    }
}

/// Inbound management API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ManagementConfig {
    /// Bind address; port 0 picks an ephemeral port.
    pub bind_address: String,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
