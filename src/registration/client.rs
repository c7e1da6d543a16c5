//! Registration client for the management core.
//!
//! # Responsibilities
//! - Register and unregister this service's identity
//! - Subscribe and unsubscribe configuration-category interests
//! - Own the identity and the category → subscription mapping
//!
//! # Design Decisions
//! - Identity sits behind a `RwLock` that is never held across an await
//! - `register` and `unregister` are serialized by an async mutex held across
//!   the core round trip, so at most one identity is ever assigned
//! - Subscriptions live in a `DashMap`, so different categories never contend
//! - Every failure is returned to the caller; nothing is retried here
//! - Unsubscribe drops the local entry only after the core confirms it

use dashmap::DashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

use crate::observability::metrics;
use crate::registration::protocol::{
    interest_path, parse_acknowledgement, service_path, INTEREST_PATH, SERVICE_PATH,
};
use crate::registration::transport::{Method, Transport};
use crate::registration::types::{
    RegistrationError, RegistrationResult, ServiceIdentity, ServiceRecord, SubscriptionId,
};

/// Client side of the core's service registry and interest endpoints.
pub struct RegistrationClient {
    transport: Arc<dyn Transport>,
    identity: RwLock<Option<ServiceIdentity>>,
    identity_ops: Mutex<()>,
    categories: DashMap<String, SubscriptionId>,
}

impl RegistrationClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            identity: RwLock::new(None),
            identity_ops: Mutex::new(()),
            categories: DashMap::new(),
        }
    }

    /// Register this service, storing and returning the assigned identity.
    pub async fn register(&self, record: &ServiceRecord) -> RegistrationResult<ServiceIdentity> {
        let _serialized = self.identity_ops.lock().await;
        if let Some(existing) = self.identity() {
            return Err(RegistrationError::AlreadyRegistered(existing));
        }

        let payload = serde_json::to_string(record).map_err(|e| {
            RegistrationError::ProtocolError(format!("failed to encode service record: {}", e))
        })?;

        let id = self
            .exchange("register", Method::Post, SERVICE_PATH, Some(payload))
            .await?;
        let identity = ServiceIdentity::new(id).ok_or_else(|| {
            RegistrationError::ProtocolError("core assigned an unusable identity".to_string())
        })?;

        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        tracing::info!(identity = %identity, name = %record.name, "Registered service");
        Ok(identity)
    }

    /// Unregister `identity`, clearing the stored identity on success.
    ///
    /// A success response carrying a different `id` is still a confirmation;
    /// the returned value is discarded rather than adopted.
    pub async fn unregister(&self, identity: &ServiceIdentity) -> RegistrationResult<()> {
        let _serialized = self.identity_ops.lock().await;
        let acknowledged = self
            .exchange("unregister", Method::Delete, &service_path(identity.as_str()), None)
            .await?;

        if acknowledged != identity.as_str() {
            tracing::warn!(
                identity = %identity,
                returned_id = %acknowledged,
                "Core returned a different id on unregistration, discarding it"
            );
        }

        let mut stored = self.identity.write().unwrap_or_else(PoisonError::into_inner);
        if stored.as_ref() == Some(identity) {
            *stored = None;
        }
        drop(stored);

        tracing::info!(identity = %identity, "Unregistered service");
        Ok(())
    }

    /// Register interest in `category` on behalf of `identity`.
    pub async fn subscribe_category(
        &self,
        identity: &ServiceIdentity,
        category: &str,
    ) -> RegistrationResult<SubscriptionId> {
        let payload = serde_json::json!({
            "category": category,
            "service": identity.as_str(),
        })
        .to_string();

        let id = self
            .exchange("subscribe", Method::Post, INTEREST_PATH, Some(payload))
            .await?;
        let subscription = SubscriptionId::new(id).ok_or_else(|| {
            RegistrationError::ProtocolError("core assigned an unusable subscription id".to_string())
        })?;

        if let Some(previous) = self
            .categories
            .insert(category.to_string(), subscription.clone())
        {
            if previous != subscription {
                tracing::warn!(
                    category = %category,
                    previous = %previous,
                    subscription_id = %subscription,
                    "Replaced existing subscription, previous one may remain at the core"
                );
            }
        }
        metrics::record_subscription_count(self.categories.len());

        tracing::info!(category = %category, subscription_id = %subscription, "Subscribed to category");
        Ok(subscription)
    }

    /// Cancel interest in `category`.
    ///
    /// The local entry survives any failure, so the caller may retry with the
    /// same subscription id.
    pub async fn unsubscribe_category(&self, category: &str) -> RegistrationResult<()> {
        let subscription = self
            .categories
            .get(category)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistrationError::UnknownCategory(category.to_string()))?;

        if let Err(e) = self
            .exchange("unsubscribe", Method::Delete, &interest_path(subscription.as_str()), None)
            .await
        {
            tracing::warn!(
                category = %category,
                subscription_id = %subscription,
                "Subscription kept locally after failed unsubscribe"
            );
            return Err(e);
        }

        self.categories
            .remove_if(category, |_, current| *current == subscription);
        metrics::record_subscription_count(self.categories.len());

        tracing::info!(category = %category, subscription_id = %subscription, "Unsubscribed from category");
        Ok(())
    }

    /// Current identity, if registered.
    pub fn identity(&self) -> Option<ServiceIdentity> {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the stored identity without talking to the core.
    pub fn forget_identity(&self) -> Option<ServiceIdentity> {
        self.identity
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Subscription id recorded for `category`.
    pub fn subscription(&self, category: &str) -> Option<SubscriptionId> {
        self.categories.get(category).map(|entry| entry.value().clone())
    }

    /// Snapshot of the categories with a recorded subscription, sorted.
    pub fn subscribed_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> =
            self.categories.iter().map(|entry| entry.key().clone()).collect();
        categories.sort();
        categories
    }

    pub fn subscription_count(&self) -> usize {
        self.categories.len()
    }

    /// One request/response round trip, returning the acknowledged id.
    async fn exchange(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> RegistrationResult<String> {
        let result = match self.transport.request(method, path, body).await {
            Ok(response) => parse_acknowledgement(&response),
            Err(e) => Err(RegistrationError::Unreachable(e.to_string())),
        };

        match &result {
            Ok(_) => metrics::record_core_request(operation, "success"),
            Err(e) => {
                metrics::record_core_request(operation, e.kind());
                tracing::error!(operation, path = %path, error = %e, "Core request failed");
            }
        }
        result
    }
}

impl std::fmt::Debug for RegistrationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationClient")
            .field("identity", &self.identity())
            .field("categories", &self.subscribed_categories())
            .finish()
    }
}
