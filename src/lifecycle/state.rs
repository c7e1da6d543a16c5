//! Service lifecycle states.
//!
//! # State Transitions
//! ```text
//! Initializing → Running:  start() succeeded
//! Running      → Stopping: stop()
//! Stopping     → Stopped:  shutdown()
//! Running      → Stopped:  shutdown() (runs stop first)
//! ```

use serde::Serialize;

/// Lifecycle state of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Initializing,
    Running,
    Stopping,
    Stopped,
}

impl LifecycleState {
    /// Numeric code used by the lifecycle gauge.
    pub fn code(self) -> u8 {
        match self {
            LifecycleState::Initializing => 0,
            LifecycleState::Running => 1,
            LifecycleState::Stopping => 2,
            LifecycleState::Stopped => 3,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == LifecycleState::Stopped
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LifecycleState::Initializing => "initializing",
            LifecycleState::Running => "running",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
