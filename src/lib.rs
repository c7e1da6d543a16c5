//! Storage service bootstrap library.
//!
//! Registers the storage service with the management core, subscribes to its
//! configuration categories, and drives the service lifecycle around a
//! pluggable storage backend.

pub mod config;
pub mod lifecycle;
pub mod management;
pub mod observability;
pub mod plugin;
pub mod registration;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::schema::ServiceConfig;
pub use lifecycle::{LifecycleState, ServiceController, Shutdown};
pub use registration::{RegistrationClient, RegistrationError};
