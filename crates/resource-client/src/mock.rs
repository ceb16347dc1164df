//! Scripted transport for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpResponse, Transport};

type Outcome = Result<HttpResponse, TransportError>;

/// Answers requests from a queue and records what it was asked.
///
/// An exhausted queue answers with a connection error, so an unexpected
/// network call fails the fetch instead of hanging.
#[derive(Debug, Default)]
pub struct MockTransport {
    outcomes: Mutex<VecDeque<Outcome>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a response.
    pub fn push_response(&self, response: HttpResponse) {
        self.push(Ok(response));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.push(Err(error));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .map(|requests| requests.len())
            .unwrap_or(0)
    }

    /// Number of queued outcomes not yet consumed.
    pub fn pending(&self) -> usize {
        self.outcomes
            .lock()
            .map(|outcomes| outcomes.len())
            .unwrap_or(0)
    }

    fn push(&self, outcome: Outcome) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(outcome);
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self
            .outcomes
            .lock()
            .ok()
            .and_then(|mut outcomes| outcomes.pop_front());
        next.unwrap_or_else(|| {
            Err(TransportError::Connection(format!(
                "no scripted response for {}",
                url
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_core::Method;

    #[tokio::test]
    async fn test_scripted_outcomes_in_order() {
        let transport = MockTransport::new();
        transport.push_response(HttpResponse::with_status(200, "first"));
        transport.push_error(TransportError::Timeout);

        let first = transport
            .send(HttpRequest::new(Method::Get, "https://example.org/a"))
            .await
            .unwrap();
        assert_eq!(first.body.as_ref(), b"first");

        let second = transport
            .send(HttpRequest::new(Method::Get, "https://example.org/b"))
            .await;
        assert_eq!(second.unwrap_err(), TransportError::Timeout);

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["https://example.org/a", "https://example.org/b"]);
    }

    #[tokio::test]
    async fn test_exhausted_queue_is_connection_error() {
        let transport = MockTransport::new();
        let err = transport
            .send(HttpRequest::new(Method::Get, "https://example.org/a"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
        assert_eq!(transport.call_count(), 1);
    }
}
