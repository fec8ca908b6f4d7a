//! The backend cluster resource.

use std::time::Duration;

use serde::Serialize;

use gateway_core::{encode_json, GatewayError, Resource, TypeUrl};

use crate::address::Address;

/// A backend cluster.
///
/// One cluster is emitted per generation, named after the first API's
/// fully qualified name so routes can reference it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Cluster name, referenced by every generated route.
    pub name: String,
    /// Service-discovery type.
    #[serde(rename = "type")]
    pub discovery_type: DiscoveryType,
    /// Upstream connect timeout.
    #[serde(with = "crate::duration")]
    pub connect_timeout: Duration,
    /// Backend hosts.
    pub hosts: Vec<Address>,
    /// Present for HTTP/2 upstreams (gRPC and http2 backends).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http2_protocol_options: Option<Http2ProtocolOptions>,
}

/// Cluster service-discovery types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiscoveryType {
    /// Resolve the host via DNS and use every returned address.
    #[serde(rename = "STRICT_DNS")]
    StrictDns,
}

/// Marker for HTTP/2 upstream support; serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Http2ProtocolOptions {}

impl Resource for Cluster {
    fn type_url(&self) -> TypeUrl {
        TypeUrl::Cluster
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self) -> Result<prost_types::Any, GatewayError> {
        encode_json(self.type_url(), self)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
