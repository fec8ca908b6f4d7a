//! Snapshot: immutable, ordered collection of generated resources.
//!
//! A snapshot is a consistent view of everything one proxy node should see
//! at a single configuration version:
//!
//! - **Immutable**: once built, a snapshot never changes
//! - **Versioned**: the version is the active service-config id
//! - **Ordered**: resources are served in the order they were supplied

use std::collections::HashMap;
use std::sync::Arc;

use gateway_core::{BoxResource, ConfigVersion, TypeUrl};

/// An immutable snapshot of resources for one proxy node.
///
/// A type with no resources is not carried at all: fetching it fails with
/// not-found rather than returning an empty response, so the xDS server
/// can distinguish "not published yet" from "published empty".
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: ConfigVersion,
    resources: HashMap<TypeUrl, Vec<BoxResource>>,
}

impl Snapshot {
    /// Create a new snapshot builder.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Build a snapshot directly from the four resource lists the config
    /// manager publishes. Empty lists are not carried.
    pub fn from_resources(
        version: impl Into<ConfigVersion>,
        listeners: Vec<BoxResource>,
        clusters: Vec<BoxResource>,
        routes: Vec<BoxResource>,
        endpoints: Vec<BoxResource>,
    ) -> Self {
        Self::builder()
            .version(version)
            .resources(TypeUrl::Listener, listeners)
            .resources(TypeUrl::Cluster, clusters)
            .resources(TypeUrl::RouteConfiguration, routes)
            .resources(TypeUrl::ClusterLoadAssignment, endpoints)
            .build()
    }

    /// The config id this snapshot was generated from.
    #[inline]
    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Resources of one type, in the order they were supplied.
    #[inline]
    pub fn resources(&self, type_url: TypeUrl) -> Option<&[BoxResource]> {
        self.resources.get(&type_url).map(Vec::as_slice)
    }

    /// Whether this snapshot carries the given resource type.
    #[inline]
    pub fn contains_type(&self, type_url: TypeUrl) -> bool {
        self.resources.contains_key(&type_url)
    }

    /// Type URLs present in this snapshot.
    pub fn type_urls(&self) -> impl Iterator<Item = TypeUrl> + '_ {
        self.resources.keys().copied()
    }

    /// Total number of resources across all types.
    pub fn total_resources(&self) -> usize {
        self.resources.values().map(Vec::len).sum()
    }

    /// Whether the snapshot carries no resources at all.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Builder for creating snapshots.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    version: ConfigVersion,
    resources: HashMap<TypeUrl, Vec<BoxResource>>,
}

impl SnapshotBuilder {
    /// Set the version (the active config id).
    pub fn version(mut self, version: impl Into<ConfigVersion>) -> Self {
        self.version = version.into();
        self
    }

    /// Add resources of a type, preserving their order. Adding an empty
    /// collection leaves the type uncarried.
    pub fn resources(
        mut self,
        type_url: TypeUrl,
        resources: impl IntoIterator<Item = BoxResource>,
    ) -> Self {
        let resources: Vec<BoxResource> = resources.into_iter().collect();
        if !resources.is_empty() {
            self.resources.insert(type_url, resources);
        }
        self
    }

    /// Add a single resource, appending to any already added for its type.
    pub fn resource(mut self, resource: BoxResource) -> Self {
        self.resources
            .entry(resource.type_url())
            .or_default()
            .push(resource);
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> Snapshot {
        Snapshot {
            version: self.version,
            resources: self.resources,
        }
    }
}

/// Shared snapshot handle as stored in the cache.
pub type SharedSnapshot = Arc<Snapshot>;
