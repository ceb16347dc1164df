//! Outgoing payload codecs.

use bytes::Bytes;
use serde::Serialize;

use crate::error::EncodeError;

/// Produces the request body of a resource.
pub trait SendResource: Send + Sync {
    /// Serialize the held value.
    fn encode(&self) -> Result<Bytes, EncodeError>;

    /// Content type of the encoded body, if any.
    fn content_type(&self) -> Option<&'static str> {
        None
    }
}

/// Zero-length body for GET-style fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptySendResource;

impl SendResource for EmptySendResource {
    fn encode(&self) -> Result<Bytes, EncodeError> {
        Ok(Bytes::new())
    }
}

/// JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSendResource<T> {
    value: T,
}

impl<T> JsonSendResource<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Serialize + Send + Sync> SendResource for JsonSendResource<T> {
    fn encode(&self) -> Result<Bytes, EncodeError> {
        serde_json::to_vec(&self.value)
            .map(Bytes::from)
            .map_err(|e| EncodeError::new("json", e.to_string()))
    }

    fn content_type(&self) -> Option<&'static str> {
        Some("application/json")
    }
}

/// Protocol-buffer body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtobufSendResource<M> {
    message: M,
}

impl<M> ProtobufSendResource<M> {
    pub fn new(message: M) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &M {
        &self.message
    }
}

impl<M: prost::Message> SendResource for ProtobufSendResource<M> {
    fn encode(&self) -> Result<Bytes, EncodeError> {
        Ok(Bytes::from(self.message.encode_to_vec()))
    }

    fn content_type(&self) -> Option<&'static str> {
        Some("application/x-protobuf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_encodes_nothing() {
        let body = EmptySendResource.encode().unwrap();
        assert!(body.is_empty());
        assert_eq!(EmptySendResource.content_type(), None);
    }

    #[test]
    fn test_json_encode() {
        let resource = JsonSendResource::new(HashMap::from([("token", "abc")]));
        assert_eq!(resource.encode().unwrap().as_ref(), br#"{"token":"abc"}"#);
        assert_eq!(resource.content_type(), Some("application/json"));
    }

    #[test]
    fn test_json_encode_failure() {
        // Map keys must be strings in JSON.
        let resource = JsonSendResource::new(HashMap::from([((1, 2), "pair")]));
        let err = resource.encode().unwrap_err();
        assert_eq!(err.kind, "json");
    }
}
