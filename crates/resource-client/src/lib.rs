//! Resource declarations and the fetch-and-cache engine.
//!
//! This crate provides:
//! - `Resource` - Declarative description of a server-backed resource
//! - `ServiceType` - Whether (and how) a resource is cached
//! - `ResourceClient` - Cache lookup, conditional fetch, decode and cache update
//! - `Transport` - Request executor seam, with `ReqwestTransport` and
//!   `mock::MockTransport`
//! - `ResourceError` - Transport / decode / encode failure taxonomy
//!
//! # Example
//!
//! ```ignore
//! use resource_client::{Resource, ResourceClient, ReqwestTransport};
//! use resource_cache::FileBackend;
//! use resource_core::{ClientConfig, Endpoint};
//!
//! let config = ClientConfig::default()
//!     .with_endpoint(Endpoint::Distribution, "https://svc90.main.px.t-online.de");
//! let client = ResourceClient::new(
//!     ReqwestTransport::new(&config)?,
//!     FileBackend::new("/var/cache/resources"),
//!     config,
//! );
//!
//! let app_config = client.fetch(&Resource::app_configuration()).await?;
//! ```

mod client;
mod error;
pub mod mock;
mod resource;
pub mod resources;
mod transport;

pub use client::*;
pub use error::*;
pub use resource::*;
pub use transport::*;
