//! Core abstractions for the remote resource layer.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `Locator` - Endpoint identity of a server-backed resource
//! - `Endpoint` / `Method` - Request addressing
//! - `ClientConfig` - Base URLs, timeouts and the conditional-request contract
//! - `Clock` - Injectable time source for freshness decisions

mod clock;
mod config;
mod locator;

pub use clock::*;
pub use config::*;
pub use locator::*;
