//! Route configuration and CORS policy.
//!
//! These types live inside the HTTP connection manager's `route_config`
//! block, so they serialize with snake_case keys.

use serde::Serialize;

use gateway_core::{encode_json, GatewayError, Resource, TypeUrl};

/// Name of the generated route configuration.
pub const ROUTE_CONFIG_NAME: &str = "local_route";

/// Name of the single generated virtual host.
pub const VIRTUAL_HOST_NAME: &str = "backend";

/// A route configuration with its virtual hosts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteConfiguration {
    /// Route configuration name.
    pub name: String,
    /// Virtual hosts, in match order.
    pub virtual_hosts: Vec<VirtualHost>,
}

/// A virtual host matching a set of domains.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualHost {
    /// Virtual host name.
    pub name: String,
    /// Domains this host matches; `*` matches all.
    pub domains: Vec<String>,
    /// Routes, in match order.
    pub routes: Vec<Route>,
    /// CORS policy, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors: Option<CorsPolicy>,
}

/// A single route: a match and the cluster it forwards to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// What requests this route matches.
    #[serde(rename = "match")]
    pub route_match: RouteMatch,
    /// Where matched requests go.
    pub route: RouteAction,
}

/// Path-prefix route matching.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMatch {
    /// Path prefix to match.
    pub prefix: String,
}

/// Forwarding target of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteAction {
    /// Target cluster name.
    pub cluster: String,
}

/// CORS policy attached to the virtual host.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorsPolicy {
    /// Exact allowed origins (`basic` preset).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allow_origin: Vec<String>,
    /// Allowed-origin regexes (`cors_with_regex` preset).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allow_origin_regex: Vec<String>,
    /// Comma-separated allowed methods.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub allow_methods: String,
    /// Comma-separated allowed headers.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub allow_headers: String,
    /// Comma-separated exposed headers.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expose_headers: String,
    /// Whether credentials are allowed.
    pub allow_credentials: bool,
}

impl RouteConfiguration {
    /// The generated route config: one virtual host named
    /// [`VIRTUAL_HOST_NAME`] over all domains, routing `/` to `cluster`.
    pub fn for_backend(cluster: impl Into<String>, cors: Option<CorsPolicy>) -> Self {
        Self {
            name: ROUTE_CONFIG_NAME.to_string(),
            virtual_hosts: vec![VirtualHost {
                name: VIRTUAL_HOST_NAME.to_string(),
                domains: vec!["*".to_string()],
                routes: vec![Route {
                    route_match: RouteMatch {
                        prefix: "/".to_string(),
                    },
                    route: RouteAction {
                        cluster: cluster.into(),
                    },
                }],
                cors,
            }],
        }
    }
}

impl Resource for RouteConfiguration {
    fn type_url(&self) -> TypeUrl {
        TypeUrl::RouteConfiguration
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
