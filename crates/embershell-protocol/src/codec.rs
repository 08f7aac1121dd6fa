//! Codec trait and the JSON Lines implementation.
//!
//! A codec converts one envelope to exactly one line of text and back.
//! The protocol layer does not care how — it only needs something that
//! implements [`LineCodec`], so a binary-over-base64 or s-expression
//! codec could be swapped in without touching the session or transport.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec mapping envelopes to single lines of text.
///
/// `Send + Sync + 'static` because the connection's read loop holds the
/// codec inside a long-lived Tokio task.
pub trait LineCodec: Send + Sync + 'static {
    /// Serializes a value into one line of text (no embedded newlines).
    ///
    /// # Errors
    /// [`ProtocolError::Encode`] if the value cannot be represented;
    /// [`ProtocolError::InvalidMessage`] if the output would span lines.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes one received line back into a value.
    ///
    /// # Errors
    /// [`ProtocolError::Decode`] if the line is malformed or does not
    /// match the expected envelope shape.
    fn decode<T: DeserializeOwned>(&self, line: &str) -> Result<T, ProtocolError>;
}

/// A [`LineCodec`] emitting one compact JSON object per line.
///
/// JSON escapes all control characters inside strings, so a serialized
/// envelope can never contain a raw newline — the framing invariant
/// holds by construction, and the explicit check below only guards
/// against a misbehaving `Serialize` impl.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLineCodec;

impl LineCodec for JsonLineCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        let line = serde_json::to_string(value).map_err(ProtocolError::Encode)?;
        if line.contains('\n') || line.contains('\r') {
            return Err(ProtocolError::InvalidMessage(
                "encoded envelope spans multiple lines".into(),
            ));
        }
        Ok(line)
    }

    fn decode<T: DeserializeOwned>(&self, line: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(line.trim_end_matches(['\r', '\n']))
            .map_err(ProtocolError::Decode)
    }
}
