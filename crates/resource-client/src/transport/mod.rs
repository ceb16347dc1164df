//! Request executor seam.

mod remote;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use resource_core::Method;

use crate::error::TransportError;

pub use remote::ReqwestTransport;

/// An outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Response with `status` and no headers.
    pub fn with_status(status: u16, body: impl Into<Bytes>) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, HashMap::new(), body)
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header(http::header::CONTENT_TYPE.as_str())
    }
}

/// Executes HTTP requests.
///
/// Implementations report every non-2xx answer as a response, not an error;
/// the client decides what a status means.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Request Tests ===

    #[test]
    fn test_request_builder() {
        let req = HttpRequest::new(Method::Post, "https://example.org/v1/submit")
            .with_header("Content-Type", "application/x-protobuf")
            .with_body(&b"\x08\x01"[..]);

        assert_eq!(req.method, Method::Post);
        assert_eq!(req.header("content-type"), Some("application/x-protobuf"));
        assert_eq!(req.body.as_ref(), b"\x08\x01");
    }

    #[test]
    fn test_request_header_missing() {
        let req = HttpRequest::new(Method::Get, "https://example.org");
        assert_eq!(req.header("If-None-Match"), None);
        assert!(req.body.is_empty());
    }

    // === Response Tests ===

    #[test]
    fn test_response_is_success() {
        assert!(HttpResponse::with_status(200, "").is_success());
        assert!(HttpResponse::with_status(204, "").is_success());
        assert!(!HttpResponse::with_status(304, "").is_success());
        assert!(!HttpResponse::with_status(500, "").is_success());
    }

    #[test]
    fn test_response_header_case_insensitive() {
        let resp = HttpResponse::with_status(200, "").with_header("ETag", "\"abc\"");
        assert_eq!(resp.header("etag"), Some("\"abc\""));
        assert_eq!(resp.header("ETAG"), Some("\"abc\""));
        assert_eq!(resp.header("X-Missing"), None);
    }

    #[test]
    fn test_response_content_type() {
        let resp =
            HttpResponse::with_status(200, "").with_header("Content-Type", "application/json");
        assert_eq!(resp.content_type(), Some("application/json"));
    }
}
