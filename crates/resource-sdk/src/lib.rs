//! Public SDK for the remote resource fetch-and-cache layer.
//!
//! This crate re-exports all layer functionality:
//!
//! ```ignore
//! use resource_sdk::prelude::*;
//!
//! let config = ClientConfig::load("resource.toml")?;
//! let client = ResourceClient::new(
//!     ReqwestTransport::new(&config)?,
//!     FileBackend::new(".resource-cache"),
//!     config,
//! );
//!
//! let stats = client.fetch(&Resource::statistics()).await?;
//! for card in &stats.key_figure_cards {
//!     println!("{:?}", card.header);
//! }
//! ```

pub use resource_cache;
pub use resource_client;
pub use resource_codec;
pub use resource_core;

/// Prelude for convenient imports.
pub mod prelude {
    pub use resource_cache::*;
    pub use resource_client::*;
    pub use resource_codec::*;
    pub use resource_core::*;
}
