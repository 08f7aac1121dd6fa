//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire envelopes.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed — the envelope holds a value the wire text
    /// format cannot represent.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed: malformed text, missing fields, wrong
    /// types. One bad line never corrupts decoding of the next.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The encoded text would span more than one line. Line framing is
    /// the transport's only delimiter, so this is unrepresentable.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
