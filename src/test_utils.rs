//! Test doubles for the core transport and the plugin loader.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::plugin::{LoadError, MemoryPlugin, PluginLoader, StoragePlugin};
use crate::registration::{Method, Transport, TransportError};

/// A request seen by `ScriptedTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

/// Transport that replays queued outcomes in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<String, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    yields: bool,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Like `new`, but every request yields to the scheduler before it
    /// completes, so concurrent callers interleave mid-request.
    pub fn yielding() -> Arc<Self> {
        Arc::new(Self {
            yields: true,
            ..Self::default()
        })
    }

    /// Queue a response body.
    pub fn respond(&self, body: &str) {
        self.outcomes.lock().unwrap().push_back(Ok(body.to_string()));
    }

    /// Queue a transport failure.
    pub fn fail(&self, description: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(TransportError(description.to_string())));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.to_string(),
            body,
        });
        if self.yields {
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".to_string())))
    }
}

/// Loader handing out one shared `MemoryPlugin` and counting loads.
pub struct CountingLoader {
    plugin: Arc<MemoryPlugin>,
    loads: AtomicUsize,
    fail: bool,
}

impl CountingLoader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            plugin: Arc::new(MemoryPlugin::new()),
            loads: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            plugin: Arc::new(MemoryPlugin::new()),
            loads: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn plugin(&self) -> Arc<MemoryPlugin> {
        self.plugin.clone()
    }
}

impl PluginLoader for CountingLoader {
    fn load_plugin(&self, name: &str) -> Result<Arc<dyn StoragePlugin>, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LoadError::Init {
                name: name.to_string(),
                reason: "backend unavailable".to_string(),
            });
        }
        Ok(self.plugin.clone() as Arc<dyn StoragePlugin>)
    }
}
