//! The fetch-and-cache engine.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use resource_cache::{
    Cache, CacheDecision, CacheEntry, CacheKey, CachePolicy, PersistenceBackend,
};
use resource_codec::{ReceiveResource, SendResource};
use resource_core::{ClientConfig, Clock, SystemClock};
use tracing::{debug, info, warn};

use crate::error::{DecodeSource, ResourceError, TransportError};
use crate::resource::Resource;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// How a fetch was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Uncached resource, fetched from the network.
    Bypass,
    /// Served from a fresh cache entry without a network call.
    Hit,
    /// Nothing usable was cached; fetched and stored.
    Miss,
    /// Server confirmed the cached entry; stored bytes served.
    Revalidated,
    /// A stale entry was replaced with a new body from the server.
    Refreshed,
}

impl FetchStatus {
    /// Whether the returned value came from the network.
    pub fn from_network(&self) -> bool {
        matches!(
            self,
            FetchStatus::Bypass | FetchStatus::Miss | FetchStatus::Refreshed
        )
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStatus::Bypass => write!(f, "BYPASS"),
            FetchStatus::Hit => write!(f, "HIT"),
            FetchStatus::Miss => write!(f, "MISS"),
            FetchStatus::Revalidated => write!(f, "REVALIDATED"),
            FetchStatus::Refreshed => write!(f, "REFRESHED"),
        }
    }
}

/// A fetched value with the way it was served.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub status: FetchStatus,
    pub elapsed: Duration,
}

/// Fetches resources through a transport, consulting and updating a cache
/// according to each resource's service type.
///
/// The client holds no per-fetch state; share it through an `Arc` to fetch
/// from many tasks at once.
pub struct ResourceClient<T, B> {
    transport: T,
    cache: Cache<B>,
    config: ClientConfig,
    clock: Arc<dyn Clock>,
}

impl<T: Transport, B: PersistenceBackend> ResourceClient<T, B> {
    pub fn new(transport: T, backend: B, config: ClientConfig) -> Self {
        Self {
            transport,
            cache: Cache::new(backend),
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for freshness decisions and entry timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cache(&self) -> &Cache<B> {
        &self.cache
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `resource`, serving it from the cache when its policy allows.
    pub async fn fetch<S, R>(&self, resource: &Resource<S, R>) -> Result<R::Output, ResourceError>
    where
        S: SendResource,
        R: ReceiveResource,
    {
        self.fetch_with_status(resource)
            .await
            .map(|fetched| fetched.value)
    }

    /// Fetch `resource` and report how it was served.
    pub async fn fetch_with_status<S, R>(
        &self,
        resource: &Resource<S, R>,
    ) -> Result<Fetched<R::Output>, ResourceError>
    where
        S: SendResource,
        R: ReceiveResource,
    {
        let started = Instant::now();
        match self.execute(resource).await {
            Ok((value, status)) => {
                let elapsed = started.elapsed();
                info!(
                    locator = %resource.locator(),
                    status = %status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Fetched resource"
                );
                Ok(Fetched {
                    value,
                    status,
                    elapsed,
                })
            }
            Err(e) => {
                warn!(locator = %resource.locator(), error = %e, "Fetch failed");
                Err(resource.map_error(e))
            }
        }
    }

    async fn execute<S, R>(
        &self,
        resource: &Resource<S, R>,
    ) -> Result<(R::Output, FetchStatus), ResourceError>
    where
        S: SendResource,
        R: ReceiveResource,
    {
        let Some(policy) = resource.service_type().policy() else {
            let response = self.send(resource, None).await?;
            let value = decode(resource, &response.body, DecodeSource::FromNetwork)?;
            return Ok((value, FetchStatus::Bypass));
        };

        let key = CacheKey::from_locator(resource.locator());
        let entry = match self.cache.get(&key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        };

        let decision = policy.is_valid(entry.as_ref(), self.clock.now());
        debug!(key = %key, decision = %decision, "Cache decision");

        match (decision, entry) {
            (CacheDecision::UseCached, Some(entry)) => {
                let value = self.decode_cached(resource, &entry).await?;
                Ok((value, FetchStatus::Hit))
            }
            (CacheDecision::MustRevalidate(tag), Some(entry)) => {
                self.revalidate(resource, policy, entry, &tag).await
            }
            (_, entry) => {
                let value = self.fetch_and_store(resource, policy, &key).await?;
                let status = if entry.is_some() {
                    FetchStatus::Refreshed
                } else {
                    FetchStatus::Miss
                };
                Ok((value, status))
            }
        }
    }

    async fn revalidate<S, R>(
        &self,
        resource: &Resource<S, R>,
        policy: &CachePolicy,
        entry: CacheEntry,
        tag: &str,
    ) -> Result<(R::Output, FetchStatus), ResourceError>
    where
        S: SendResource,
        R: ReceiveResource,
    {
        let response = self.send(resource, Some(tag)).await?;

        if !self.is_not_modified(&response) {
            let value = decode(resource, &response.body, DecodeSource::FromNetwork)?;
            self.store(policy, &entry.key, &response).await;
            return Ok((value, FetchStatus::Refreshed));
        }

        let value = self.decode_cached(resource, &entry).await?;

        let now = self.clock.now();
        let new_tag = self.validator_tag(&response);
        match self
            .cache
            .touch(&entry, now, policy.expiry_for(now), new_tag)
            .await
        {
            Ok(_) => debug!(key = %entry.key, "Revalidated cache entry"),
            Err(e) => warn!(key = %entry.key, error = %e, "Failed to refresh cache entry"),
        }

        Ok((value, FetchStatus::Revalidated))
    }

    async fn fetch_and_store<S, R>(
        &self,
        resource: &Resource<S, R>,
        policy: &CachePolicy,
        key: &CacheKey,
    ) -> Result<R::Output, ResourceError>
    where
        S: SendResource,
        R: ReceiveResource,
    {
        let response = self.send(resource, None).await?;
        let value = decode(resource, &response.body, DecodeSource::FromNetwork)?;
        self.store(policy, key, &response).await;
        Ok(value)
    }

    /// Decode stored bytes; an undecodable entry is dropped so the next
    /// fetch goes to the network.
    async fn decode_cached<S, R>(
        &self,
        resource: &Resource<S, R>,
        entry: &CacheEntry,
    ) -> Result<R::Output, ResourceError>
    where
        S: SendResource,
        R: ReceiveResource,
    {
        match decode(resource, &entry.data, DecodeSource::FromCache) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key = %entry.key, error = %e, "Cached entry failed to decode, invalidating");
                if let Err(e) = self.cache.invalidate(&entry.key).await {
                    warn!(key = %entry.key, error = %e, "Failed to invalidate cache entry");
                }
                Err(e)
            }
        }
    }

    async fn store(&self, policy: &CachePolicy, key: &CacheKey, response: &HttpResponse) {
        let now = self.clock.now();
        let entry = CacheEntry::new(key.clone(), response.body.clone(), now)
            .with_validator_tag(self.validator_tag(response))
            .with_expiry(policy.expiry_for(now));

        match self.cache.put(key, entry).await {
            Ok(()) => debug!(key = %key, size = response.body.len(), "Stored cache entry"),
            Err(e) => warn!(key = %key, error = %e, "Failed to store cache entry"),
        }
    }

    /// Send the request for `resource`, conditional on `validator` if given.
    ///
    /// Returns only 2xx responses, or the not-modified response of a
    /// conditional request.
    async fn send<S, R>(
        &self,
        resource: &Resource<S, R>,
        validator: Option<&str>,
    ) -> Result<HttpResponse, ResourceError>
    where
        S: SendResource,
        R: ReceiveResource,
    {
        let locator = resource.locator();
        let url = self.config.url_for(locator)?;
        let body = resource.send_resource().encode()?;

        let mut request = HttpRequest::new(locator.method(), url.as_str()).with_body(body);
        if let Some(content_type) = resource.send_resource().content_type() {
            request = request.with_header(http::header::CONTENT_TYPE.as_str(), content_type);
        }
        for (name, value) in locator.headers() {
            request = request.with_header(name.as_str(), value.as_str());
        }
        if let Some(tag) = validator {
            request = request.with_header(self.config.validation.request_header.as_str(), tag);
        }

        debug!(
            method = %locator.method(),
            url = %url,
            conditional = validator.is_some(),
            "Requesting resource"
        );
        let response = self.transport.send(request).await?;

        if self.is_not_modified(&response) {
            return match validator {
                Some(_) => Ok(response),
                None => Err(TransportError::UnexpectedNotModified {
                    url: url.to_string(),
                }
                .into()),
            };
        }

        if !response.is_success() {
            return Err(TransportError::Status {
                status: response.status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        Ok(response)
    }

    fn is_not_modified(&self, response: &HttpResponse) -> bool {
        response.status.as_u16() == self.config.validation.not_modified_status
    }

    fn validator_tag(&self, response: &HttpResponse) -> Option<String> {
        response
            .header(&self.config.validation.response_header)
            .map(str::to_string)
    }
}

fn decode<S: SendResource, R: ReceiveResource>(
    resource: &Resource<S, R>,
    bytes: &[u8],
    origin: DecodeSource,
) -> Result<R::Output, ResourceError> {
    resource
        .receive_resource()
        .decode(bytes)
        .map_err(|error| ResourceError::decode(origin, error))
}

impl<T, B> fmt::Debug for ResourceClient<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
