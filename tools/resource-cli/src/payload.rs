//! Codecs for resources declared in the config file.

use bytes::Bytes;
use resource_codec::{DecodeError, EncodeError, ReceiveResource, SendResource};
use serde::{Deserialize, Serialize};

/// How a configured resource's response body is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    Json,
    #[default]
    Raw,
}

/// Decoded body of a configured resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Raw(Bytes),
}

/// Decodes a response body per `PayloadFormat`.
#[derive(Debug, Clone, Copy)]
pub struct PayloadReceiveResource {
    format: PayloadFormat,
}

impl PayloadReceiveResource {
    pub fn new(format: PayloadFormat) -> Self {
        Self { format }
    }
}

impl ReceiveResource for PayloadReceiveResource {
    type Output = Payload;

    fn decode(&self, bytes: &[u8]) -> Result<Payload, DecodeError> {
        match self.format {
            PayloadFormat::Json => serde_json::from_slice(bytes)
                .map(Payload::Json)
                .map_err(|e| DecodeError::new("json", bytes.len(), e.to_string())),
            PayloadFormat::Raw => Ok(Payload::Raw(Bytes::copy_from_slice(bytes))),
        }
    }
}

/// Optional JSON request body.
#[derive(Debug, Clone, Default)]
pub struct RequestBody(Option<serde_json::Value>);

impl RequestBody {
    pub fn new(body: Option<serde_json::Value>) -> Self {
        Self(body)
    }
}

impl SendResource for RequestBody {
    fn encode(&self) -> Result<Bytes, EncodeError> {
        match &self.0 {
            Some(value) => serde_json::to_vec(value)
                .map(Bytes::from)
                .map_err(|e| EncodeError::new("json", e.to_string())),
            None => Ok(Bytes::new()),
        }
    }

    fn content_type(&self) -> Option<&'static str> {
        self.0.as_ref().map(|_| "application/json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_payload() {
        let receive = PayloadReceiveResource::new(PayloadFormat::Json);
        let payload = receive.decode(br#"{"cases": 12}"#).unwrap();
        assert_eq!(payload, Payload::Json(serde_json::json!({ "cases": 12 })));
    }

    #[test]
    fn test_invalid_json_payload() {
        let receive = PayloadReceiveResource::new(PayloadFormat::Json);
        let err = receive.decode(b"<html>").unwrap_err();
        assert_eq!(err.len, 6);
        assert_eq!(err.kind, "json");
    }

    #[test]
    fn test_raw_payload() {
        let receive = PayloadReceiveResource::new(PayloadFormat::Raw);
        assert_eq!(
            receive.decode(b"\x00\x01").unwrap(),
            Payload::Raw(Bytes::from_static(b"\x00\x01"))
        );
    }

    #[test]
    fn test_request_body() {
        let empty = RequestBody::default();
        assert!(empty.encode().unwrap().is_empty());
        assert_eq!(empty.content_type(), None);

        let json = RequestBody::new(Some(serde_json::json!([1, 2])));
        assert_eq!(json.encode().unwrap().as_ref(), b"[1,2]");
        assert_eq!(json.content_type(), Some("application/json"));
    }
}
