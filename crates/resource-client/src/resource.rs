//! Declarative resource descriptions.

use std::fmt;
use std::sync::Arc;

use resource_cache::CachePolicy;
use resource_codec::{KeepBytes, ReceiveResource, SendResource};
use resource_core::Locator;

use crate::error::ResourceError;

/// Whether a resource goes through the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceType {
    /// Always fetched from the network; the cache is never read or written.
    #[default]
    Default,
    /// Cached under the given policy.
    Caching(CachePolicy),
}

impl ServiceType {
    /// Cache policy, if the resource is cached.
    pub fn policy(&self) -> Option<&CachePolicy> {
        match self {
            ServiceType::Default => None,
            ServiceType::Caching(policy) => Some(policy),
        }
    }
}

/// Maps engine errors into resource-specific errors before they reach the
/// caller.
pub type ErrorHook = Arc<dyn Fn(ResourceError) -> ResourceError + Send + Sync>;

/// A server-backed resource: where it lives, how it is cached, and how its
/// payloads are encoded and decoded.
///
/// Resources are plain values; the same `Resource` can be fetched any
/// number of times, concurrently.
pub struct Resource<S, R> {
    locator: Locator,
    service_type: ServiceType,
    send_resource: S,
    receive_resource: R,
    error_hook: Option<ErrorHook>,
}

impl<S: SendResource, R: ReceiveResource> Resource<S, R> {
    pub fn new(
        locator: Locator,
        service_type: ServiceType,
        send_resource: S,
        receive_resource: R,
    ) -> Self {
        Self {
            locator,
            service_type,
            send_resource,
            receive_resource,
            error_hook: None,
        }
    }

    /// Install a hook that rewrites every error this resource's fetches
    /// return.
    pub fn with_error_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(ResourceError) -> ResourceError + Send + Sync + 'static,
    {
        self.error_hook = Some(Arc::new(hook));
        self
    }

    /// Same resource, decoding to the value plus the body it came from.
    ///
    /// The locator is unchanged, so cached entries are shared with `self`.
    pub fn keeping_bytes(self) -> Resource<S, KeepBytes<R>> {
        Resource {
            locator: self.locator,
            service_type: self.service_type,
            send_resource: self.send_resource,
            receive_resource: KeepBytes(self.receive_resource),
            error_hook: self.error_hook,
        }
    }

    /// Replace the service type.
    pub fn with_service_type(mut self, service_type: ServiceType) -> Self {
        self.service_type = service_type;
        self
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn service_type(&self) -> &ServiceType {
        &self.service_type
    }

    pub fn send_resource(&self) -> &S {
        &self.send_resource
    }

    pub fn receive_resource(&self) -> &R {
        &self.receive_resource
    }

    /// Apply the error hook, if any.
    pub fn map_error(&self, error: ResourceError) -> ResourceError {
        match &self.error_hook {
            Some(hook) => hook(error),
            None => error,
        }
    }
}

impl<S: Clone, R: Clone> Clone for Resource<S, R> {
    fn clone(&self) -> Self {
        Self {
            locator: self.locator.clone(),
            service_type: self.service_type,
            send_resource: self.send_resource.clone(),
            receive_resource: self.receive_resource.clone(),
            error_hook: self.error_hook.clone(),
        }
    }
}

impl<S, R> fmt::Debug for Resource<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("locator", &self.locator)
            .field("service_type", &self.service_type)
            .field("error_hook", &self.error_hook.is_some())
            .finish()
    }
}
