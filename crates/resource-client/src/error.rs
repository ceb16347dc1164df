//! Fetch error types.

use std::fmt;

use resource_codec::{DecodeError, EncodeError};
use resource_core::ConfigError;
use thiserror::Error;

/// The request could not be completed, or the server refused it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Server answered with a status outside 2xx.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// No response within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Could not connect to the server.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Request could not be built or sent.
    #[error("Request failed: {0}")]
    Request(String),

    /// Server reported "not modified" for a request that carried no
    /// validator.
    #[error("Unexpected not-modified response from {url}")]
    UnexpectedNotModified { url: String },
}

impl TransportError {
    /// HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Where the bytes that failed to decode came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeSource {
    FromNetwork,
    FromCache,
}

impl fmt::Display for DecodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeSource::FromNetwork => write!(f, "network"),
            DecodeSource::FromCache => write!(f, "cache"),
        }
    }
}

/// Errors returned by `ResourceClient::fetch`.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid payload from {origin}: {error}")]
    Decode {
        origin: DecodeSource,
        #[source]
        error: DecodeError,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Produced by a resource's error hook.
    #[error("{message}")]
    Domain {
        message: String,
        #[source]
        cause: Box<ResourceError>,
    },
}

impl ResourceError {
    pub fn decode(origin: DecodeSource, error: DecodeError) -> Self {
        ResourceError::Decode { origin, error }
    }

    /// Origin of the undecodable bytes, looking through domain wrapping.
    pub fn decode_origin(&self) -> Option<DecodeSource> {
        match self {
            ResourceError::Decode { origin, .. } => Some(*origin),
            ResourceError::Domain { cause, .. } => cause.decode_origin(),
            _ => None,
        }
    }

    /// Wrap `cause` in a domain error.
    pub fn domain(message: impl Into<String>, cause: ResourceError) -> Self {
        ResourceError::Domain {
            message: message.into(),
            cause: Box::new(cause),
        }
    }

    /// Transport failure behind this error, looking through domain wrapping.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            ResourceError::Transport(e) => Some(e),
            ResourceError::Domain { cause, .. } => cause.transport(),
            _ => None,
        }
    }

    /// HTTP status behind this error, if any.
    pub fn status(&self) -> Option<u16> {
        self.transport().and_then(TransportError::status)
    }

    pub fn is_decode(&self) -> bool {
        self.decode_origin().is_some()
    }
}
