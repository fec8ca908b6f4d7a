//! # gateway-manager
//!
//! The orchestration layer: fetch the active rollout and service
//! configuration, resolve JWKS documents, run the generator, and publish
//! the result to the snapshot cache — once synchronously at startup, then
//! on a refresh interval when the rollout strategy is managed.
//!
//! ```rust,ignore
//! use gateway_config::{BackendProtocol, GeneratorOptions};
//! use gateway_manager::{ConfigManager, ManagerOptions, RolloutStrategy, TokenSource};
//!
//! let mut options = ManagerOptions::new(GeneratorOptions::new(BackendProtocol::Grpc));
//! options.rollout_strategy = RolloutStrategy::Managed;
//!
//! let manager = ConfigManager::new(
//!     "bookstore.endpoints.project123.cloud.goog",
//!     "2019-03-02r0",
//!     options,
//!     TokenSource::metadata_default()?,
//! )
//! .await?;
//!
//! // Hand the cache to the xDS server.
//! let cache = manager.cache();
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod fetch;
mod jwks;
mod manager;
mod token;

pub use fetch::{HttpFetcher, ServiceManagementClient};
pub use jwks::{JwksFailurePolicy, JwksResolver};
pub use manager::{ConfigManager, ManagerOptions, RolloutStrategy};
pub use token::TokenSource;
