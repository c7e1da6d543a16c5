//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Bind management API → controller.start()
//!         → load plugin → register → subscribe categories → Running
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT or POST /foglamp/service/shutdown
//!         → controller.shutdown()
//!         → unsubscribe categories → unregister → Stopped
//! ```
//!
//! # Design Decisions
//! - Ordered startup: plugin first, then registration, then subscriptions
//! - Registration failure is fatal; subscription failure is not
//! - Unregistration failure never blocks exit

pub mod controller;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use controller::{LifecycleError, ServiceController};
pub use shutdown::Shutdown;
pub use state::LifecycleState;
