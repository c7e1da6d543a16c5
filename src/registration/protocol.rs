//! Response interpretation for the core's registration endpoints.
//!
//! # Outcomes
//! ```text
//! body has "id" (non-empty string)       → Acknowledged(id)
//! body has "message", no "id"            → Rejected(message)
//! anything else / unparseable body       → ProtocolError
//! ```
//!
//! The same rules apply to all four endpoints; callers decide what the
//! acknowledged `id` means for them.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::registration::types::RegistrationError;

/// Endpoint paths on the core.
pub const SERVICE_PATH: &str = "/foglamp/service";
pub const INTEREST_PATH: &str = "/foglamp/interest";

/// Parse a response body into the acknowledged `id`.
pub fn parse_acknowledgement(body: &str) -> Result<String, RegistrationError> {
    let doc: Value = serde_json::from_str(body).map_err(|e| {
        RegistrationError::ProtocolError(format!("unparseable response body ({}): {}", e, body))
    })?;

    let Some(object) = doc.as_object() else {
        return Err(RegistrationError::ProtocolError(format!(
            "response is not a JSON object: {}",
            body
        )));
    };

    if let Some(id) = object.get("id") {
        return match id.as_str() {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(RegistrationError::ProtocolError(format!(
                "response carries an invalid id: {}",
                id
            ))),
        };
    }

    match object.get("message") {
        Some(Value::String(message)) => Err(RegistrationError::Rejected(message.clone())),
        Some(other) => Err(RegistrationError::Rejected(other.to_string())),
        None => Err(RegistrationError::ProtocolError(format!(
            "response has neither id nor message: {}",
            body
        ))),
    }
}

/// Characters escaped when a core-assigned id becomes a path segment.
/// Everything except RFC 3986 unreserved characters.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Path addressing a single registered service.
pub fn service_path(identity: &str) -> String {
    format!("{}/{}", SERVICE_PATH, utf8_percent_encode(identity, ID_SEGMENT))
}

/// Path addressing a single category interest.
pub fn interest_path(subscription_id: &str) -> String {
    format!("{}/{}", INTEREST_PATH, utf8_percent_encode(subscription_id, ID_SEGMENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_success() {
        assert_eq!(parse_acknowledgement(r#"{"id":"svc-42"}"#).unwrap(), "svc-42");
        // Extra fields next to an id do not turn it into a rejection.
        assert_eq!(
            parse_acknowledgement(r#"{"id":"sub-7","message":"Interest registered"}"#).unwrap(),
            "sub-7"
        );
    }

    #[test]
    fn test_message_only_is_rejection_verbatim() {
        let err = parse_acknowledgement(r#"{"message":"Service  'storage-1' already exists!"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::Rejected("Service  'storage-1' already exists!".to_string())
        );
    }

    #[test]
    fn test_neither_field_is_protocol_error() {
        let err = parse_acknowledgement(r#"{"status":"ok"}"#).unwrap_err();
        assert!(matches!(err, RegistrationError::ProtocolError(_)));

        let err = parse_acknowledgement("{}").unwrap_err();
        assert!(matches!(err, RegistrationError::ProtocolError(_)));
    }

    #[test]
    fn test_malformed_bodies() {
        for body in ["", "not json", "[1,2]", "\"svc-42\"", r#"{"id":""}"#, r#"{"id":42}"#] {
            let err = parse_acknowledgement(body).unwrap_err();
            assert!(
                matches!(err, RegistrationError::ProtocolError(_)),
                "body {:?} gave {:?}",
                body,
                err
            );
        }
    }

    #[test]
    fn test_paths() {
        assert_eq!(service_path("svc-42"), "/foglamp/service/svc-42");
        assert_eq!(interest_path("sub-7"), "/foglamp/interest/sub-7");
        assert_eq!(service_path("svc_1.2~x"), "/foglamp/service/svc_1.2~x");
    }

    #[test]
    fn test_ids_stay_inside_their_segment() {
        assert_eq!(service_path("a/../../admin"), "/foglamp/service/a%2F..%2F..%2Fadmin");
        assert_eq!(interest_path("sub?all=1#x"), "/foglamp/interest/sub%3Fall%3D1%23x");
        assert_eq!(interest_path("s b%"), "/foglamp/interest/s%20b%25");

        let base = url::Url::parse("http://127.0.0.1:8082/").unwrap();
        let joined = base.join(&service_path("../interest/sub-7")).unwrap();
        assert_eq!(joined.path(), "/foglamp/service/..%2Finterest%2Fsub-7");
        assert_eq!(joined.query(), None);
    }
}
