use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lifecycle::{LifecycleError, LifecycleState};
use crate::management::ManagementState;

#[derive(Serialize)]
pub struct PingResponse {
    pub uptime: u64,
    pub state: LifecycleState,
    pub shutdown_requested: bool,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of a configuration change notification.
#[derive(Debug, Deserialize)]
pub struct ChangeRequest {
    pub category: String,
    pub items: Value,
}

impl ChangeRequest {
    /// Value handed to the plugin: strings verbatim, anything else as JSON text.
    pub fn value(&self) -> String {
        match &self.items {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

pub async fn ping(State(state): State<ManagementState>) -> Json<PingResponse> {
    Json(PingResponse {
        uptime: state.started.elapsed().as_secs(),
        state: state.controller.state(),
        shutdown_requested: state.shutdown.is_triggered(),
    })
}

pub async fn shutdown(State(state): State<ManagementState>) -> Json<MessageResponse> {
    tracing::info!("Shutdown requested through management API");
    state.shutdown.trigger();
    Json(MessageResponse {
        message: "Shutdown initiated".to_string(),
    })
}

pub async fn config_change(
    State(state): State<ManagementState>,
    Json(request): Json<ChangeRequest>,
) -> (StatusCode, Json<MessageResponse>) {
    match state.controller.config_change(&request.category, &request.value()) {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Configuration change applied".to_string(),
            }),
        ),
        Err(e) => {
            let status = match e {
                LifecycleError::Plugin(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::CONFLICT,
            };
            (status, Json(MessageResponse { message: e.to_string() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_value_rendering() {
        let request: ChangeRequest =
            serde_json::from_str(r#"{"category":"Storage","items":"plain"}"#).unwrap();
        assert_eq!(request.value(), "plain");

        let request: ChangeRequest =
            serde_json::from_str(r#"{"category":"Storage","items":{"poolSize":{"value":"5"}}}"#)
                .unwrap();
        assert_eq!(request.value(), r#"{"poolSize":{"value":"5"}}"#);
    }
}
