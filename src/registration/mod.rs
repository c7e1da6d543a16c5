//! Registration with the management core.
//!
//! # Data Flow
//! ```text
//! ServiceRecord
//!     → client.rs (register / subscribe / unsubscribe / unregister)
//!     → transport.rs (POST/DELETE to core host:port)
//!     → protocol.rs (id → success, message → rejected, else protocol error)
//!     → identity + category → subscription mapping held by the client
//! ```
//!
//! # Design Decisions
//! - Four-way outcome: success, rejected, protocol error, unreachable
//! - No retries; retry policy belongs to whoever drives the client
//! - State is only reachable through client methods

pub mod client;
pub mod protocol;
pub mod transport;
pub mod types;

pub use client::RegistrationClient;
pub use transport::{HttpTransport, Method, Transport, TransportError};
pub use types::{RegistrationError, ServiceIdentity, ServiceRecord, SubscriptionId};
