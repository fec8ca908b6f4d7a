//! Proxy node identification for the snapshot cache.
//!
//! The cache is keyed by the data-plane proxy's node id. [`NodeHash`]
//! converts the id string into a fixed-size FNV-1a hash for cheap map keys
//! and copies.

use std::fmt;
use std::hash::{Hash, Hasher};

use fnv::FnvHasher;

/// Hash-based proxy node identifier.
///
/// # Example
///
/// ```rust
/// use gateway_core::NodeHash;
///
/// let a = NodeHash::from_id("ingress-proxy-1");
/// let b = NodeHash::from_id("ingress-proxy-2");
/// assert_ne!(a, b);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeHash(u64);

impl NodeHash {
    /// Create a node hash from a proxy node id.
    #[must_use]
    pub fn from_id(node_id: &str) -> Self {
        let mut hasher = FnvHasher::default();
        node_id.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Get the raw hash value.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
