//! # gateway-control-plane
//!
//! Configuration-generation core for an API-gateway control plane.
//!
//! Upstream, Service Management publishes versioned service
//! configurations and rollouts; downstream, a data-plane proxy fetches
//! its runtime configuration over xDS. This library is the translation
//! pipeline in between:
//!
//! - the **config manager** fetches configs and rollouts, selects the
//!   active version, and refreshes it under the managed rollout strategy
//! - the **config generator** maps a service configuration into ordered
//!   HTTP filters, routes, and cluster definitions
//! - the **snapshot cache** atomically publishes versioned resource sets
//!   per proxy node
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gateway_control_plane::prelude::*;
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
//! // The xDS server reads from here.
//! let cache = manager.cache();
//! let response = cache.fetch(&DiscoveryRequest::new("api_proxy", TypeUrl::Listener))?;
//! assert_eq!(response.version, manager.current_config_id());
//! ```
//!
//! ## Architecture
//!
//! - `gateway-core` - shared types, errors, the `Resource` trait
//! - `gateway-cache` - node-keyed snapshot cache with watches
//! - `gateway-envoy` - the serializable resource model
//! - `gateway-config` - document model, rollout resolver, generator
//! - `gateway-manager` - fetch, token, JWKS, and the refresh loop
//!
//! This crate re-exports all public APIs for convenience.
//!
//! ## Design Principles
//!
//! 1. **No panics in library code** - errors are returned as `Result`
//! 2. **No locks across await points** - snapshots swap atomically
//! 3. **Pure generation** - same config in, byte-identical resources out
//! 4. **Observable** - tracing on every publish and dropped cycle

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub use gateway_cache as cache;
pub use gateway_config as config;
pub use gateway_core as core;
pub use gateway_envoy as envoy;
pub use gateway_manager as manager;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use gateway_control_plane::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use gateway_core::{
        BoxResource, ConfigVersion, GatewayError, NodeHash, Resource, TypeUrl,
    };

    // Cache types
    pub use gateway_cache::{
        Cache, CacheStats, DiscoveryRequest, DiscoveryResponse, Snapshot, SnapshotCache, Watch,
        WatchId,
    };

    // Configuration and generation
    pub use gateway_config::{
        generate, resolve_active, BackendProtocol, CorsOptions, GeneratorOptions, Rollout,
        ServiceConfig,
    };

    // Manager
    pub use gateway_manager::{
        ConfigManager, JwksFailurePolicy, ManagerOptions, RolloutStrategy, TokenSource,
    };
}

/// Version information for this crate.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Minimum supported Rust version.
    pub const MSRV: &str = "1.75";

    /// Get version info as a string.
    pub fn version_string() -> String {
        format!("gateway-control-plane {} (MSRV {})", VERSION, MSRV)
    }
}
