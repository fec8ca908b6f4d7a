//! Discovery request and response types.
//!
//! The slice of the xDS discovery protocol the cache itself answers: a
//! request names a node and a resource type, the response carries the
//! snapshot version, the resources of that type, and the request echoed
//! back verbatim so the transport can correlate.

use gateway_core::TypeUrl;

/// The node identity carried in a discovery request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// The proxy node id.
    pub id: String,
}

/// A request for one resource type on behalf of one proxy node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveryRequest {
    /// The requesting node.
    pub node: Node,
    /// The requested resource type.
    pub type_url: TypeUrl,
}

impl DiscoveryRequest {
    /// Create a request for `type_url` on behalf of `node_id`.
    pub fn new(node_id: impl Into<String>, type_url: TypeUrl) -> Self {
        Self {
            node: Node {
                id: node_id.into(),
            },
            type_url,
        }
    }
}

/// The answer to a [`DiscoveryRequest`].
#[derive(Clone, Debug, PartialEq)]
pub struct DiscoveryResponse {
    /// The snapshot version the resources were drawn from (the active
    /// config id).
    pub version: String,
    /// Resources of the requested type, in snapshot order, each wrapped in
    /// its `Any` envelope.
    pub resources: Vec<prost_types::Any>,
    /// The originating request, echoed verbatim.
    pub request: DiscoveryRequest,
}
