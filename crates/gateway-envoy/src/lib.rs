//! # gateway-envoy
//!
//! The resource model the config generator emits: listeners, clusters, and
//! route configurations, with the HTTP filter configs they embed.
//!
//! Serialization is the contract here. Resources serialize to the
//! canonical JSON the data plane consumes: top-level resource messages use
//! camelCase proto-JSON field names (`socketAddress`, `filterChains`,
//! `connectTimeout` as `"20s"`), while filter `config` blocks keep their
//! snake_case keys (`stat_prefix`, `http_filters`, `local_jwks`). Test
//! harnesses compare resources as canonicalized JSON documents, so the
//! same input must always serialize identically — ordered maps only.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod address;
mod cluster;
pub mod duration;
pub mod filters;
mod listener;
mod route;

pub use address::{Address, SocketAddress};
pub use cluster::{Cluster, DiscoveryType, Http2ProtocolOptions};
pub use filters::{FilterConfig, HttpFilter};
pub use listener::{
    FilterChain, HttpConnectionManager, Listener, NetworkFilter, INGRESS_LISTENER_NAME,
    INGRESS_STAT_PREFIX,
};
pub use route::{
    CorsPolicy, Route, RouteAction, RouteConfiguration, RouteMatch, VirtualHost,
    ROUTE_CONFIG_NAME, VIRTUAL_HOST_NAME,
};
