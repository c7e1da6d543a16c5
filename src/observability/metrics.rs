//! Metrics collection and exposition.
//!
//! # Metrics
//! - `storage_core_requests_total` (counter): calls to the core by operation, outcome
//! - `storage_category_subscriptions` (gauge): categories currently subscribed
//! - `storage_lifecycle_state` (gauge): 0=initializing, 1=running, 2=stopping, 3=stopped
//! - `storage_config_changes_total` (counter): configuration changes by category, outcome
//!
//! # Design Decisions
//! - Recording is a no-op until `init_metrics` installs the Prometheus recorder
//! - Labels stay low-cardinality (operations and outcomes are fixed sets)

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::lifecycle::state::LifecycleState;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record one request to the core.
pub fn record_core_request(operation: &'static str, outcome: &'static str) {
    counter!(
        "storage_core_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record the size of the category subscription map.
pub fn record_subscription_count(count: usize) {
    gauge!("storage_category_subscriptions").set(count as f64);
}

/// Record a lifecycle transition.
pub fn record_lifecycle_state(state: LifecycleState) {
    gauge!("storage_lifecycle_state").set(state.code() as f64);
}

/// Record a configuration change routed to the plugin.
pub fn record_config_change(category: &str, outcome: &'static str) {
    counter!(
        "storage_config_changes_total",
        "category" => category.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
