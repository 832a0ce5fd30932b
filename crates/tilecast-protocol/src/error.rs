//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or interpreting
/// messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON or a payload that does
    /// not match the expected shape for its event tag.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but violates the envelope contract, e.g. a
    /// known event tag with no data payload.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
