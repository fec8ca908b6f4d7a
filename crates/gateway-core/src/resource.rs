//! Resource trait for cacheable discovery resources.
//!
//! Everything the snapshot cache stores and the discovery surface serves
//! implements [`Resource`]: it names itself, declares its [`TypeUrl`], and
//! encodes into a `prost_types::Any` envelope. The canonical encoding is
//! JSON — test harnesses and the transport both compare resources as
//! canonicalized JSON documents.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{GatewayError, TypeUrl};

/// Trait for resources served over the discovery protocol.
///
/// # Example
///
/// ```rust
/// use gateway_core::{encode_json, GatewayError, Resource, TypeUrl};
///
/// #[derive(Debug, serde::Serialize)]
/// struct Probe {
///     name: String,
/// }
///
/// impl Resource for Probe {
///     fn type_url(&self) -> TypeUrl {
///         TypeUrl::Cluster
///     }
///
///     fn name(&self) -> &str {
///         &self.name
///     }
///
///     fn encode(&self) -> Result<prost_types::Any, GatewayError> {
///         encode_json(self.type_url(), self)
///     }
///
///     fn as_any(&self) -> &dyn std::any::Any {
///         self
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// The discovery type this resource belongs to.
    fn type_url(&self) -> TypeUrl;

    /// The resource name.
    fn name(&self) -> &str;

    /// Encode the resource into its `Any` envelope.
    fn encode(&self) -> Result<prost_types::Any, GatewayError>;

    /// Downcasting support.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a resource. `Arc` keeps snapshots cheap to clone.
pub type BoxResource = Arc<dyn Resource>;

/// Encode a serializable resource as canonical JSON inside an `Any`
/// envelope carrying the resource's type URL.
pub fn encode_json<T: serde::Serialize>(
    type_url: TypeUrl,
    resource: &T,
) -> Result<prost_types::Any, GatewayError> {
    let value = serde_json::to_vec(resource).map_err(|e| GatewayError::Encoding {
        type_url: type_url.to_string(),
        message: e.to_string(),
    })?;
    Ok(prost_types::Any {
        type_url: type_url.as_str().to_string(),
        value,
    })
}
