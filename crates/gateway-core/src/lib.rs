//! # gateway-core
//!
//! Core types, traits, and error handling for the gateway control plane.
//!
//! This crate provides the foundational types used across all other gateway
//! crates:
//!
//! - [`GatewayError`] - Error type covering every failure mode, with gRPC
//!   status code mapping for the xDS transport
//! - [`ConfigVersion`] - Service-configuration version identifiers with the
//!   lexicographic ordering rollout resolution relies on
//! - [`NodeHash`] - Efficient proxy node identification using FNV-1a hashing
//! - [`Resource`] - Trait implemented by every resource the snapshot cache
//!   can store and serve
//! - [`TypeUrl`] - The closed set of discovery type URLs the core serves
//!
//! ## Example
//!
//! ```rust
//! use gateway_core::{ConfigVersion, NodeHash};
//!
//! let node = NodeHash::from_id("ingress-proxy");
//! let version = ConfigVersion::new("2019-03-02r0");
//!
//! assert!(!version.is_empty());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod node;
mod resource;
mod type_url;
mod version;

pub use error::GatewayError;
pub use node::NodeHash;
pub use resource::{encode_json, BoxResource, Resource};
pub use type_url::TypeUrl;
pub use version::ConfigVersion;

/// Result type alias using [`GatewayError`].
pub type Result<T> = std::result::Result<T, GatewayError>;
