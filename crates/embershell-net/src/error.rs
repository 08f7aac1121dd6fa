//! Error types for the connection layer.

use embershell_protocol::ProtocolError;

/// Errors that can occur on the server connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The TCP handshake with the server failed.
    #[error("unable to dial server: {0}")]
    Dial(#[source] std::io::Error),

    /// Writing a request to the stream failed.
    #[error("unable to write request: {0}")]
    Write(#[source] std::io::Error),

    /// The connection was closed; no further requests can be sent.
    #[error("connection closed")]
    Closed,

    /// Encoding a request failed before anything hit the wire.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
