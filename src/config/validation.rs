//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Detect duplicate or empty category names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("duplicate category '{0}'")]
    DuplicateCategory(String),

    #[error("{field} is not a valid socket address: '{value}'")]
    InvalidAddress { field: &'static str, value: String },
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service.name.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "service.name" });
    }
    if config.service.port == 0 {
        errors.push(ValidationError::Zero { field: "service.port" });
    }
    if config.core.host.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "core.host" });
    }
    if config.core.port == 0 {
        errors.push(ValidationError::Zero { field: "core.port" });
    }
    if config.core.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "core.request_timeout_secs" });
    }
    if config.storage.plugin.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "storage.plugin" });
    }

    let mut seen = HashSet::new();
    for category in &config.storage.categories {
        if category.trim().is_empty() {
            errors.push(ValidationError::Empty { field: "storage.categories" });
        } else if !seen.insert(category.as_str()) {
            errors.push(ValidationError::DuplicateCategory(category.clone()));
        }
    }

    if config.management.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "management.bind_address",
            value: config.management.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
