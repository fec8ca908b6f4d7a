//! Discovery type URLs.
//!
//! The core serves exactly four resource kinds over the discovery protocol.
//! [`TypeUrl`] is the closed enumeration of them; parsing an unknown URL is
//! an error rather than a silent passthrough.

use std::fmt;
use std::str::FromStr;

use crate::GatewayError;

/// The resource kinds a discovery request can ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeUrl {
    /// Listener Discovery Service (LDS).
    Listener,
    /// Cluster Discovery Service (CDS).
    Cluster,
    /// Route Discovery Service (RDS).
    RouteConfiguration,
    /// Endpoint Discovery Service (EDS).
    ClusterLoadAssignment,
}

impl TypeUrl {
    /// Every type URL the core serves.
    pub const ALL: [TypeUrl; 4] = [
        TypeUrl::Listener,
        TypeUrl::Cluster,
        TypeUrl::RouteConfiguration,
        TypeUrl::ClusterLoadAssignment,
    ];

    /// The full `type.googleapis.com/...` URL string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeUrl::Listener => "type.googleapis.com/envoy.config.listener.v3.Listener",
            TypeUrl::Cluster => "type.googleapis.com/envoy.config.cluster.v3.Cluster",
            TypeUrl::RouteConfiguration => {
                "type.googleapis.com/envoy.config.route.v3.RouteConfiguration"
            }
            TypeUrl::ClusterLoadAssignment => {
                "type.googleapis.com/envoy.config.endpoint.v3.ClusterLoadAssignment"
            }
        }
    }

    /// The trailing message name, e.g. `Cluster`.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        match self {
            TypeUrl::Listener => "Listener",
            TypeUrl::Cluster => "Cluster",
            TypeUrl::RouteConfiguration => "RouteConfiguration",
            TypeUrl::ClusterLoadAssignment => "ClusterLoadAssignment",
        }
    }
}

impl fmt::Display for TypeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeUrl {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GatewayError::InvalidTypeUrl {
                type_url: s.to_string(),
            })
    }
}
