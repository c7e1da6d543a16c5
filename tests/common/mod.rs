//! Shared utilities for integration testing.

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    Router,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use storage_service::config::CoreConfig;
use storage_service::{LifecycleState, ServiceController};

/// A request received by the mock core.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

#[allow(dead_code)]
impl SeenRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

type Responder = Arc<dyn Fn(&SeenRequest) -> (u16, String) + Send + Sync>;

#[derive(Clone)]
struct MockState {
    respond: Responder,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// A programmable management core listening on an ephemeral port.
pub struct MockCore {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

#[allow(dead_code)]
impl MockCore {
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn core_config(&self) -> CoreConfig {
        CoreConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            request_timeout_secs: 5,
        }
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    body: String,
) -> (StatusCode, String) {
    let request = SeenRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        body,
    };
    let (status, response) = (state.respond)(&request);
    state.seen.lock().unwrap().push(request);
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        response,
    )
}

/// Start a mock core answering every request with `respond`.
pub async fn start_mock_core<F>(respond: F) -> MockCore
where
    F: Fn(&SeenRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let state = MockState {
        respond: Arc::new(respond),
        seen: seen.clone(),
    };
    let app = Router::new().fallback(handle).with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockCore { addr, seen }
}

/// Core config pointing at a port nothing listens on.
#[allow(dead_code)]
pub fn unreachable_core() -> CoreConfig {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    CoreConfig {
        host: "127.0.0.1".to_string(),
        port,
        request_timeout_secs: 2,
    }
}

/// Poll until the controller reaches `state`.
#[allow(dead_code)]
pub async fn wait_for_state(controller: &ServiceController, state: LifecycleState) {
    for _ in 0..200 {
        if controller.state() == state {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("controller never reached {}, stuck in {}", state, controller.state());
}
