//! Incoming payload codecs.

use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Turns a response body into a typed value.
///
/// Decoding must be deterministic and side-effect free: the same bytes are
/// decoded again when served from the cache.
pub trait ReceiveResource: Send + Sync {
    type Output: Send;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Output, DecodeError>;
}

/// Ignores the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyReceiveResource;

impl ReceiveResource for EmptyReceiveResource {
    type Output = ();

    fn decode(&self, _bytes: &[u8]) -> Result<(), DecodeError> {
        Ok(())
    }
}

/// Raw body bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataReceiveResource;

impl ReceiveResource for DataReceiveResource {
    type Output = Bytes;

    fn decode(&self, bytes: &[u8]) -> Result<Bytes, DecodeError> {
        Ok(Bytes::copy_from_slice(bytes))
    }
}

/// JSON body.
pub struct JsonReceiveResource<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonReceiveResource<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonReceiveResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonReceiveResource<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for JsonReceiveResource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JsonReceiveResource<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned + Send> ReceiveResource for JsonReceiveResource<T> {
    type Output = T;

    fn decode(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        serde_json::from_slice(bytes).map_err(|e| DecodeError::new("json", bytes.len(), e.to_string()))
    }
}

/// Protocol-buffer body parsed as message `M`.
pub struct ProtobufReceiveResource<M> {
    _marker: PhantomData<fn() -> M>,
}

impl<M> ProtobufReceiveResource<M> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<M> Default for ProtobufReceiveResource<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for ProtobufReceiveResource<M> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for ProtobufReceiveResource<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProtobufReceiveResource<{}>", std::any::type_name::<M>())
    }
}

impl<M: prost::Message + Default> ReceiveResource for ProtobufReceiveResource<M> {
    type Output = M;

    fn decode(&self, bytes: &[u8]) -> Result<M, DecodeError> {
        M::decode(bytes).map_err(|e| DecodeError::new("protobuf", bytes.len(), e.to_string()))
    }
}

/// A decoded value together with the body it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub bytes: Bytes,
    pub value: T,
}

/// Wraps a codec so the raw body is kept next to the decoded value.
///
/// Fields the inner codec skips (unknown protobuf fields, for instance) are
/// still present in `bytes`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeepBytes<R>(pub R);

impl<R: ReceiveResource> ReceiveResource for KeepBytes<R> {
    type Output = Decoded<R::Output>;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Output, DecodeError> {
        let value = self.0.decode(bytes)?;
        Ok(Decoded {
            bytes: Bytes::copy_from_slice(bytes),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{ApplicationConfiguration, SemanticVersion};
    use crate::send::{JsonSendResource, ProtobufSendResource, SendResource};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct RegistrationToken {
        token: String,
        expires_in: u32,
    }

    #[test]
    fn test_json_round_trip() {
        let token = RegistrationToken {
            token: "8f2c".to_string(),
            expires_in: 3600,
        };
        let bytes = JsonSendResource::new(token.clone()).encode().unwrap();
        let decoded = JsonReceiveResource::<RegistrationToken>::new()
            .decode(&bytes)
            .unwrap();
        assert_eq!(decoded, token);
    }

    #[test]
    fn test_protobuf_round_trip() {
        let config = ApplicationConfiguration {
            min_version: Some(SemanticVersion {
                major: 2,
                minor: 14,
                patch: 0,
            }),
            supported_countries: vec!["DE".to_string(), "NL".to_string()],
            ..Default::default()
        };
        let bytes = ProtobufSendResource::new(config.clone()).encode().unwrap();
        let decoded = ProtobufReceiveResource::<ApplicationConfiguration>::new()
            .decode(&bytes)
            .unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_json_decode_error_reports_length() {
        let err = JsonReceiveResource::<RegistrationToken>::new()
            .decode(b"{\"token\":")
            .unwrap_err();
        assert_eq!(err.kind, "json");
        assert_eq!(err.len, 9);
    }

    #[test]
    fn test_protobuf_decode_error() {
        // Field 3 (string) claims 16 bytes but only 1 follows.
        let err = ProtobufReceiveResource::<ApplicationConfiguration>::new()
            .decode(&[0x1a, 0x10, 0x44])
            .unwrap_err();
        assert_eq!(err.kind, "protobuf");
        assert_eq!(err.len, 3);
    }

    #[test]
    fn test_protobuf_empty_body_is_default_message() {
        let decoded = ProtobufReceiveResource::<ApplicationConfiguration>::new()
            .decode(&[])
            .unwrap();
        assert_eq!(decoded, ApplicationConfiguration::default());
    }

    #[test]
    fn test_keep_bytes_retains_unknown_fields() {
        let config = ApplicationConfiguration {
            supported_countries: vec!["DE".to_string()],
            ..Default::default()
        };
        let mut body = ProtobufSendResource::new(config.clone())
            .encode()
            .unwrap()
            .to_vec();
        // Field 9, varint 1: not declared on the message.
        body.extend_from_slice(&[0x48, 0x01]);

        let decoded = KeepBytes(ProtobufReceiveResource::<ApplicationConfiguration>::new())
            .decode(&body)
            .unwrap();
        assert_eq!(decoded.value, config);
        assert_eq!(decoded.bytes.as_ref(), body.as_slice());
    }

    #[test]
    fn test_keep_bytes_propagates_errors() {
        let err = KeepBytes(JsonReceiveResource::<RegistrationToken>::new())
            .decode(b"[")
            .unwrap_err();
        assert_eq!(err.kind, "json");
    }

    #[test]
    fn test_data_receive_copies_bytes() {
        let data = DataReceiveResource.decode(&[1, 2, 3]).unwrap();
        assert_eq!(data.as_ref(), &[1, 2, 3]);
    }
}
