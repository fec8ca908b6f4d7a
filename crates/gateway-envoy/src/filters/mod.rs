//! HTTP filter configurations.
//!
//! Filter configs serialize with snake_case keys, matching the connection
//! manager's `config` block.

pub mod jwt_authn;
pub mod service_control;
pub mod transcoder;

use serde::Serialize;

pub use jwt_authn::JwtAuthentication;
pub use service_control::ServiceControl;
pub use transcoder::GrpcJsonTranscoder;

/// Network filter name of the HTTP connection manager.
pub const HTTP_CONNECTION_MANAGER: &str = "envoy.http_connection_manager";

/// JWT authentication filter name.
pub const JWT_AUTHN: &str = "envoy.filters.http.jwt_authn";

/// Service-control filter name.
pub const SERVICE_CONTROL: &str = "envoy.filters.http.service_control";

/// gRPC-JSON transcoder filter name.
pub const GRPC_JSON_TRANSCODER: &str = "envoy.grpc_json_transcoder";

/// gRPC-Web filter name.
pub const GRPC_WEB: &str = "envoy.grpc_web";

/// Router filter name; always the terminal filter.
pub const ROUTER: &str = "envoy.router";

/// A named HTTP filter with its configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpFilter {
    /// Filter name.
    pub name: String,
    /// Filter configuration; `{}` for filters without one.
    pub config: FilterConfig,
}

/// The configuration payload of an HTTP filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterConfig {
    /// JWT authentication.
    JwtAuthn(JwtAuthentication),
    /// Service control.
    ServiceControl(ServiceControl),
    /// gRPC-JSON transcoding.
    Transcoder(GrpcJsonTranscoder),
    /// No configuration (`{}`).
    Empty(EmptyConfig),
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmptyConfig {}

impl HttpFilter {
    /// The JWT authentication filter.
    pub fn jwt_authn(config: JwtAuthentication) -> Self {
        Self {
            name: JWT_AUTHN.to_string(),
            config: FilterConfig::JwtAuthn(config),
        }
    }

    /// The service-control filter.
    pub fn service_control(config: ServiceControl) -> Self {
        Self {
            name: SERVICE_CONTROL.to_string(),
            config: FilterConfig::ServiceControl(config),
        }
    }

    /// The gRPC-JSON transcoder filter.
    pub fn transcoder(config: GrpcJsonTranscoder) -> Self {
        Self {
            name: GRPC_JSON_TRANSCODER.to_string(),
            config: FilterConfig::Transcoder(config),
        }
    }

    /// The gRPC-Web filter.
    pub fn grpc_web() -> Self {
        Self {
            name: GRPC_WEB.to_string(),
            config: FilterConfig::Empty(EmptyConfig {}),
        }
    }

    /// The router filter.
    pub fn router() -> Self {
        Self {
            name: ROUTER.to_string(),
            config: FilterConfig::Empty(EmptyConfig {}),
        }
    }
}
