//! The ingress listener resource.

use serde::Serialize;

use gateway_core::{encode_json, GatewayError, Resource, TypeUrl};

use crate::address::Address;
use crate::filters::HttpFilter;
use crate::route::RouteConfiguration;

/// Stat prefix for the generated connection manager.
pub const INGRESS_STAT_PREFIX: &str = "ingress_http";

/// Resource name the listener is cached under.
pub const INGRESS_LISTENER_NAME: &str = "ingress_listener";

/// The ingress listener: one filter chain whose sole network filter is the
/// HTTP connection manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    /// Bind address.
    pub address: Address,
    /// Filter chains; exactly one is generated.
    pub filter_chains: Vec<FilterChain>,
}

/// A filter chain holding network filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterChain {
    /// Network filters, in order.
    pub filters: Vec<NetworkFilter>,
}

/// A named network filter. Only the HTTP connection manager is emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkFilter {
    /// Filter name.
    pub name: String,
    /// Filter configuration.
    pub config: HttpConnectionManager,
}

/// The HTTP connection manager configuration.
///
/// This is a filter `config` block, so its keys stay snake_case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpConnectionManager {
    /// Stat prefix; always [`INGRESS_STAT_PREFIX`].
    pub stat_prefix: String,
    /// HTTP filters in execution order; the router is always last.
    pub http_filters: Vec<HttpFilter>,
    /// The embedded route configuration.
    pub route_config: RouteConfiguration,
}

impl Listener {
    /// Build the ingress listener from its bind address, filters, and
    /// route config.
    pub fn ingress(
        address: Address,
        http_filters: Vec<HttpFilter>,
        route_config: RouteConfiguration,
    ) -> Self {
        Self {
            address,
            filter_chains: vec![FilterChain {
                filters: vec![NetworkFilter {
                    name: crate::filters::HTTP_CONNECTION_MANAGER.to_string(),
                    config: HttpConnectionManager {
                        stat_prefix: INGRESS_STAT_PREFIX.to_string(),
                        http_filters,
                        route_config,
                    },
                }],
            }],
        }
    }

    /// The connection manager inside the single generated filter chain.
    pub fn connection_manager(&self) -> Option<&HttpConnectionManager> {
        self.filter_chains
            .first()
            .and_then(|chain| chain.filters.first())
            .map(|filter| &filter.config)
    }
}

impl Resource for Listener {
    fn type_url(&self) -> TypeUrl {
        TypeUrl::Listener
    }

    fn name(&self) -> &str {
        INGRESS_LISTENER_NAME
    }

    fn encode(&self) -> Result<prost_types::Any, GatewayError> {
        encode_json(self.type_url(), self)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
