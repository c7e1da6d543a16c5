//! Identity, record and error types shared by the registration protocol.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether `token` can name a single path segment on the core.
///
/// Empty tokens and dot segments are refused: URL normalization would make
/// them address a different resource, escaped or not.
fn is_addressable(token: &str) -> bool {
    !matches!(token, "" | "." | "..")
}

/// Identity assigned to this service by the core on registration.
///
/// Never empty: the protocol layer refuses to build one from an empty `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceIdentity(String);

impl ServiceIdentity {
    /// Wrap a token, returning `None` for an empty or dot-segment one.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        is_addressable(&token).then_some(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a category-interest registration held by the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    /// Wrap a token, returning `None` for an empty or dot-segment one.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        is_addressable(&token).then_some(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Description of this service, sent as the registration request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Service name as shown by the core.
    pub name: String,

    /// Service type (e.g., "Storage").
    #[serde(rename = "type")]
    pub service_type: String,

    /// Protocol the service speaks on its service port.
    pub protocol: String,

    /// Address the service is reachable on.
    pub address: String,

    /// Port the service accepts requests on.
    #[serde(rename = "service_port")]
    pub port: u16,

    /// Port of the service's own management API, once bound.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub management_port: Option<u16>,
}

impl ServiceRecord {
    pub fn new(
        name: impl Into<String>,
        service_type: impl Into<String>,
        address: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            service_type: service_type.into(),
            protocol: "http".to_string(),
            address: address.into(),
            port,
            management_port: None,
        }
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn with_management_port(mut self, port: u16) -> Self {
        self.management_port = Some(port);
        self
    }
}

/// Errors surfaced by the registration client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The core could not be reached (connection refused, timeout, ...).
    #[error("management core unreachable: {0}")]
    Unreachable(String),

    /// The response was absent, unparseable or missing the expected fields.
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// The core explicitly declined the request.
    #[error("request rejected by management core: {0}")]
    Rejected(String),

    /// No subscription is recorded locally for this category.
    #[error("no subscription recorded for category '{0}'")]
    UnknownCategory(String),

    /// An identity is already held; it must be unregistered first.
    #[error("service already registered as {0}")]
    AlreadyRegistered(ServiceIdentity),
}

impl RegistrationError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistrationError::Unreachable(_) => "unreachable",
            RegistrationError::ProtocolError(_) => "protocol_error",
            RegistrationError::Rejected(_) => "rejected",
            RegistrationError::UnknownCategory(_) => "unknown_category",
            RegistrationError::AlreadyRegistered(_) => "already_registered",
        }
    }
}

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_rejects_empty() {
        assert!(ServiceIdentity::new("").is_none());
        assert_eq!(ServiceIdentity::new("svc-42").unwrap().as_str(), "svc-42");
        assert!(SubscriptionId::new(String::new()).is_none());
        assert!(ServiceIdentity::new("..").is_none());
        assert!(SubscriptionId::new(".").is_none());
        assert!(SubscriptionId::new("sub.7").is_some());
    }

    #[test]
    fn test_record_wire_shape() {
        let record = ServiceRecord::new("storage-1", "Storage", "127.0.0.1", 8080);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "storage-1",
                "type": "Storage",
                "protocol": "http",
                "address": "127.0.0.1",
                "service_port": 8080,
            })
        );

        let json = serde_json::to_value(record.with_management_port(9000)).unwrap();
        assert_eq!(json["management_port"], 9000);
    }

    #[test]
    fn test_error_display() {
        let err = RegistrationError::Rejected("Duplicate service name".into());
        assert_eq!(
            err.to_string(),
            "request rejected by management core: Duplicate service name"
        );
        assert_eq!(err.kind(), "rejected");

        let err = RegistrationError::UnknownCategory("Storage".into());
        assert!(err.to_string().contains("'Storage'"));
    }
}
