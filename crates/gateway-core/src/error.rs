//! Error types for the gateway control plane.
//!
//! This module provides [`GatewayError`], the error type shared by every
//! crate in the workspace. Each variant maps to one of the failure classes
//! the control plane distinguishes: invalid configuration (fatal to the
//! cycle that saw it), transient fetch failures (retried on the next
//! refresh tick), rollout resolution failures, and missing snapshots.

/// Error type for gateway control-plane operations.
///
/// Designed to:
/// - Cover all failure modes without panics
/// - Convert to [`tonic::Status`] for the xDS transport
/// - Support error chaining via `source` fields
///
/// # Example
///
/// ```rust
/// use gateway_core::GatewayError;
///
/// fn require_api(apis: &[String]) -> Result<(), GatewayError> {
///     if apis.is_empty() {
///         return Err(GatewayError::invalid_config(
///             "service config must list at least one api",
///         ));
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Malformed service configuration, missing required fields, or an
    /// invalid option combination. Fatal at startup, drops the cycle on
    /// refresh.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// Non-2xx response, I/O timeout, or connection failure on an outbound
    /// HTTP fetch. Retried at the next refresh tick.
    #[error("fetch failed for {url}: {message}")]
    FetchFailure {
        /// The URL that was being fetched.
        url: String,
        /// Description of the failure.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No usable rollout could be selected for the service. Transient at
    /// refresh time, fatal at startup.
    #[error("rollout resolution failed for {service_name}: {reason}")]
    RolloutResolution {
        /// The managed service the rollouts were fetched for.
        service_name: String,
        /// Why no rollout was selected.
        reason: String,
    },

    /// A discovery fetch named a node or resource type the cache has no
    /// snapshot for. The xDS server decides retry behavior.
    #[error("no snapshot for node {node_id} and type {type_url}")]
    SnapshotMissing {
        /// Node id from the discovery request.
        node_id: String,
        /// Requested type URL.
        type_url: String,
    },

    /// A discovery request carried a type URL outside the served set.
    #[error("unknown type URL: {type_url}")]
    InvalidTypeUrl {
        /// The unrecognized type URL.
        type_url: String,
    },

    /// A resource failed to encode into its wire representation.
    #[error("encoding error for {type_url}: {message}")]
    Encoding {
        /// Type URL of the resource being encoded.
        type_url: String,
        /// Error message.
        message: String,
    },

    /// A watch subscription was closed by its receiver.
    #[error("watch closed: watch_id={watch_id}")]
    WatchClosed {
        /// Id of the closed watch.
        watch_id: u64,
    },
}

impl GatewayError {
    /// Create an [`GatewayError::InvalidConfig`] from a reason string.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a [`GatewayError::FetchFailure`] from any error type.
    pub fn fetch<E>(url: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::FetchFailure {
            url: url.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a [`GatewayError::FetchFailure`] from a bare message, for
    /// failures (like an unexpected HTTP status) with no underlying error.
    pub fn fetch_status(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FetchFailure {
            url: url.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error is transient: retrying at the next refresh tick
    /// may succeed without any configuration change.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::FetchFailure { .. } | Self::RolloutResolution { .. }
        )
    }
}

/// Convert to [`tonic::Status`] for gRPC responses.
///
/// The xDS transport returns these directly to the proxy.
impl From<GatewayError> for tonic::Status {
    fn from(err: GatewayError) -> Self {
        match &err {
            GatewayError::InvalidConfig { .. } | GatewayError::InvalidTypeUrl { .. } => {
                tonic::Status::invalid_argument(err.to_string())
            }
            GatewayError::SnapshotMissing { .. } => tonic::Status::not_found(err.to_string()),
            GatewayError::FetchFailure { .. } | GatewayError::RolloutResolution { .. } => {
                tonic::Status::unavailable(err.to_string())
            }
            GatewayError::Encoding { .. } => tonic::Status::internal(err.to_string()),
            GatewayError::WatchClosed { .. } => tonic::Status::cancelled(err.to_string()),
        }
    }
}
