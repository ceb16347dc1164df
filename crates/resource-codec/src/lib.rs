//! Payload codecs for remote resources.
//!
//! A resource pairs one `SendResource` (produces the outgoing body) with one
//! `ReceiveResource` (turns the response body into a typed value):
//! - `EmptySendResource` / `JsonSendResource` / `ProtobufSendResource`
//! - `EmptyReceiveResource` / `DataReceiveResource` / `JsonReceiveResource` /
//!   `ProtobufReceiveResource`
//!
//! The `messages` module holds the protocol-buffer payloads of the built-in
//! resources.

mod error;
pub mod messages;
mod receive;
mod send;

pub use error::*;
pub use receive::*;
pub use send::*;
