//! Codec error types.

use thiserror::Error;

/// An outgoing value could not be serialized.
///
/// This is a contract violation by the caller and is never retried.
#[derive(Error, Debug)]
#[error("failed to encode {kind} payload: {message}")]
pub struct EncodeError {
    /// Codec that failed (e.g. "json").
    pub kind: &'static str,
    pub message: String,
}

impl EncodeError {
    pub fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Bytes did not parse as the expected wire format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to decode {len} byte {kind} payload: {message}")]
pub struct DecodeError {
    /// Codec that failed (e.g. "protobuf").
    pub kind: &'static str,
    /// Length of the rejected payload.
    pub len: usize,
    /// Schema violation reported by the parser.
    pub message: String,
}

impl DecodeError {
    pub fn new(kind: &'static str, len: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            len,
            message: message.into(),
        }
    }
}
