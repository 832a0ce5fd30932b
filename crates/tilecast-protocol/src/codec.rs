//! Codec trait and the JSON implementation.
//!
//! The relay speaks JSON on the wire and JSON to the store; the codec
//! is the one place bytes become typed messages and back.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back into values.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientEnvelope;

    #[test]
    fn round_trips_an_envelope() {
        let codec = JsonCodec;
        let env: ClientEnvelope = codec
            .decode(br#"{"event":"connect","room":"table1"}"#)
            .unwrap();
        let bytes = codec.encode(&env).unwrap();
        let again: ClientEnvelope = codec.decode(&bytes).unwrap();
        assert_eq!(env, again);
    }

    #[test]
    fn garbage_fails_to_decode() {
        let codec = JsonCodec;
        let result: Result<ClientEnvelope, _> = codec.decode(b"not json at all");
        assert!(result.is_err());
    }
}
