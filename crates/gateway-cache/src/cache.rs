//! Cache trait and the DashMap-backed snapshot cache.
//!
//! Snapshots are stored behind `Arc` in a `DashMap`, so replacing one is a
//! pointer swap: a concurrent [`SnapshotCache::fetch`] sees either the old
//! snapshot or the new one in its entirety. No lock is ever held across an
//! await point.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use gateway_core::{GatewayError, NodeHash, Result};

use crate::discovery::{DiscoveryRequest, DiscoveryResponse};
use crate::snapshot::Snapshot;
use crate::stats::CacheStats;
use crate::watch::WatchManager;

/// Interface the config manager publishes through and the xDS server
/// reads from.
pub trait Cache: Send + Sync {
    /// Get the current snapshot for a node.
    fn get_snapshot(&self, node: NodeHash) -> Option<Arc<Snapshot>>;

    /// Atomically replace the snapshot for a node and notify its watches.
    fn set_snapshot(&self, node: NodeHash, snapshot: Snapshot);

    /// Remove the snapshot for a node.
    fn clear_snapshot(&self, node: NodeHash);

    /// Number of nodes with a published snapshot.
    fn snapshot_count(&self) -> usize;

    /// Answer a discovery request from the current snapshot.
    ///
    /// # Errors
    ///
    /// [`GatewayError::SnapshotMissing`] when the node has no snapshot or
    /// the snapshot does not carry the requested type.
    fn fetch(&self, request: &DiscoveryRequest) -> Result<DiscoveryResponse>;
}

/// Concurrent snapshot cache keyed by proxy node hash.
///
/// Readers are lock-free; the single writer (the config manager's
/// refresher) replaces whole snapshots. `Arc` references cloned out of the
/// map stay valid after replacement, which is what makes in-flight fetches
/// coherent.
#[derive(Debug)]
pub struct SnapshotCache {
    snapshots: DashMap<NodeHash, Arc<Snapshot>>,
    watches: WatchManager,
    stats: CacheStats,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache {
    /// Create a cache with default settings.
    pub fn new() -> Self {
        CacheBuilder::new().build()
    }

    /// The watch manager, for subscribing to snapshot replacements.
    #[inline]
    pub fn watches(&self) -> &WatchManager {
        &self.watches
    }

    /// Cache statistics.
    #[inline]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Subscribe to snapshot replacements for a node.
    #[inline]
    pub fn create_watch(&self, node: NodeHash) -> crate::watch::Watch {
        self.watches.create_watch(node)
    }

    /// Whether a node has a published snapshot.
    pub fn has_snapshot(&self, node: NodeHash) -> bool {
        self.snapshots.contains_key(&node)
    }
}

impl Cache for SnapshotCache {
    fn get_snapshot(&self, node: NodeHash) -> Option<Arc<Snapshot>> {
        // The DashMap Ref holds a shard read lock; clone the Arc and drop
        // the Ref immediately.
        let result = self.snapshots.get(&node).map(|r| Arc::clone(&*r));

        if result.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
            trace!(node = %node, "no snapshot for node");
        }

        result
    }

    fn set_snapshot(&self, node: NodeHash, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);

        self.snapshots.insert(node, Arc::clone(&snapshot));
        self.stats.record_set();

        debug!(
            node = %node,
            version = %snapshot.version(),
            resources = snapshot.total_resources(),
            "published snapshot"
        );

        // Notify watches without holding any map lock.
        self.watches.notify(node, snapshot);
    }

    fn clear_snapshot(&self, node: NodeHash) {
        if self.snapshots.remove(&node).is_some() {
            self.stats.record_clear();
            debug!(node = %node, "cleared snapshot");
        }
    }

    fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    fn fetch(&self, request: &DiscoveryRequest) -> Result<DiscoveryResponse> {
        let node = NodeHash::from_id(&request.node.id);

        let missing = || GatewayError::SnapshotMissing {
            node_id: request.node.id.clone(),
            type_url: request.type_url.to_string(),
        };

        let snapshot = self.get_snapshot(node).ok_or_else(missing)?;
        let resources = snapshot.resources(request.type_url).ok_or_else(missing)?;

        let encoded = resources
            .iter()
            .map(|r| r.encode())
            .collect::<Result<Vec<_>>>()?;

        Ok(DiscoveryResponse {
            version: snapshot.version().to_string(),
            resources: encoded,
            request: request.clone(),
        })
    }
}

/// Builder for a configured cache.
#[derive(Debug, Default)]
pub struct CacheBuilder {
    capacity: Option<usize>,
    watch_buffer_size: Option<usize>,
}

impl CacheBuilder {
    /// Create a new cache builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial node capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Watch channel buffer size.
    pub fn watch_buffer_size(mut self, size: usize) -> Self {
        self.watch_buffer_size = Some(size);
        self
    }

    /// Build the cache.
    pub fn build(self) -> SnapshotCache {
        SnapshotCache {
            snapshots: DashMap::with_capacity(self.capacity.unwrap_or(16)),
            watches: WatchManager::with_buffer_size(self.watch_buffer_size.unwrap_or(16)),
            stats: CacheStats::new(),
        }
    }
}
