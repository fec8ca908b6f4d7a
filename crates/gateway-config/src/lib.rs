//! # gateway-config
//!
//! The service-configuration side of the control plane: the upstream
//! document model, rollout resolution, and the pure generator that maps a
//! service configuration into the listener and cluster resources the data
//! plane consumes.
//!
//! The generator has no I/O and no hidden state; given the same service
//! configuration, JWKS documents, and options it always produces the same
//! resources. Everything network-shaped (fetching configs, rollouts, and
//! JWKS documents) lives in `gateway-manager`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod generator;
mod options;
mod rollout;
mod service;
mod template;

pub use generator::{generate, GeneratedConfig, JwksMap};
pub use options::{BackendProtocol, CorsOptions, GeneratorOptions};
pub use rollout::{
    resolve_active, ActiveRollout, Rollout, RolloutsResponse, TrafficPercentStrategy,
    STATUS_SUCCESS,
};
pub use service::{
    split_audiences, Api, AuthProvider, AuthRequirement, AuthRule, Authentication, ConfigFile,
    Control, HttpRule, HttpRules, HttpVerb, Method, ServiceConfig, SourceInfo,
    FILE_DESCRIPTOR_SET_PROTO,
};
pub use template::PathMatch;
