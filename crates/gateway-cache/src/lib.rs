//! # gateway-cache
//!
//! Versioned, node-keyed publication of generated resources to the xDS
//! server.
//!
//! The cache stores one immutable [`Snapshot`] per proxy node. The config
//! manager replaces a node's snapshot atomically on each successful
//! generation cycle; the xDS server reads through [`SnapshotCache::fetch`]
//! and observes either the entire old snapshot or the entire new one,
//! never a mix.
//!
//! ```rust
//! use gateway_cache::{Cache, DiscoveryRequest, Snapshot, SnapshotCache};
//! use gateway_core::{NodeHash, TypeUrl};
//!
//! let cache = SnapshotCache::new();
//! let node = NodeHash::from_id("ingress-proxy");
//!
//! cache.set_snapshot(node, Snapshot::builder().version("2019-03-02r0").build());
//!
//! // A fetch for a type the snapshot does not carry is not-found.
//! let request = DiscoveryRequest::new("ingress-proxy", TypeUrl::Listener);
//! assert!(cache.fetch(&request).is_err());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod discovery;
mod snapshot;
mod stats;
mod watch;

pub use cache::{Cache, CacheBuilder, SnapshotCache};
pub use discovery::{DiscoveryRequest, DiscoveryResponse, Node};
pub use snapshot::{SharedSnapshot, Snapshot, SnapshotBuilder};
pub use stats::CacheStats;
pub use watch::{Watch, WatchId, WatchManager};
