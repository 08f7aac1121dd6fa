//! Server connection and typed session for the Embershell client.
//!
//! This crate owns the one TCP link to a remote game authority:
//!
//! 1. **Connection** — dials the server, writes one request per line,
//!    and runs a background read loop that decodes incoming lines and
//!    queues them for whoever holds the response receiver.
//! 2. **Session** — a typed façade over the connection: one method per
//!    action kind, each building exactly one request envelope.
//!
//! # How it fits in the stack
//!
//! ```text
//! Game facade (above)  ← drains the response queue, forwards actions
//!     ↕
//! Session / Connection (this crate)  ← framing, dispatch, lifecycle
//!     ↕
//! Protocol (below)  ← envelope types and the line codec
//! ```

mod connection;
mod error;
mod session;

pub use connection::{Connection, RESPONSE_QUEUE_CAPACITY};
pub use error::ConnectError;
pub use session::Session;
