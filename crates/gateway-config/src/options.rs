//! Generator options.
//!
//! Defaults mirror the deployment flags: backend cluster at
//! `127.0.0.1:8082` with a 20 s connect timeout, listener at
//! `0.0.0.0:8080`. The backend protocol is required and has no default.

use std::str::FromStr;
use std::time::Duration;

use gateway_core::{GatewayError, Result};
use gateway_envoy::CorsPolicy;

/// Protocol spoken by the backend the gateway fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendProtocol {
    /// gRPC backend; enables transcoding and gRPC-Web.
    Grpc,
    /// HTTP/1.1 backend.
    Http1,
    /// HTTP/2 backend.
    Http2,
}

impl BackendProtocol {
    /// Whether the backend is gRPC.
    #[must_use]
    pub fn is_grpc(&self) -> bool {
        matches!(self, BackendProtocol::Grpc)
    }

    /// Whether the upstream connection uses HTTP/2.
    #[must_use]
    pub fn uses_http2(&self) -> bool {
        matches!(self, BackendProtocol::Grpc | BackendProtocol::Http2)
    }
}

impl FromStr for BackendProtocol {
    type Err = GatewayError;

    /// Case-insensitive parse; the deployment flag is spelled `gRPC`,
    /// `grpc`, `HTTP1`, and so on in the wild.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "grpc" => Ok(BackendProtocol::Grpc),
            "http1" => Ok(BackendProtocol::Http1),
            "http2" => Ok(BackendProtocol::Http2),
            _ => Err(GatewayError::invalid_config(format!(
                "backend_protocol must be one of \"grpc\", \"http1\", \"http2\", got \"{s}\""
            ))),
        }
    }
}

/// CORS settings applied to the generated virtual host.
#[derive(Debug, Clone, Default)]
pub struct CorsOptions {
    /// `""`, `basic`, or `cors_with_regex`.
    pub preset: String,
    /// Exact allowed origin (`basic`).
    pub allow_origin: String,
    /// Allowed-origin regex (`cors_with_regex`).
    pub allow_origin_regex: String,
    /// Comma-separated allowed methods.
    pub allow_methods: String,
    /// Comma-separated allowed headers.
    pub allow_headers: String,
    /// Comma-separated exposed headers.
    pub expose_headers: String,
    /// Whether credentials are allowed.
    pub allow_credentials: bool,
}

impl CorsOptions {
    /// Validate the combination and build the CORS policy, if any.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InvalidConfig`] on the invalid combinations: CORS
    /// fields without a preset, `basic` without an origin, or an
    /// unrecognized preset.
    pub fn to_policy(&self) -> Result<Option<CorsPolicy>> {
        match self.preset.as_str() {
            "" => {
                let any_set = !self.allow_origin.is_empty()
                    || !self.allow_origin_regex.is_empty()
                    || !self.allow_methods.is_empty()
                    || !self.allow_headers.is_empty()
                    || !self.expose_headers.is_empty();
                if any_set {
                    return Err(GatewayError::invalid_config(
                        "cors_preset must be set in order to enable CORS support",
                    ));
                }
                Ok(None)
            }
            "basic" => {
                if self.allow_origin.is_empty() {
                    return Err(GatewayError::invalid_config(
                        "cors_allow_origin cannot be empty when cors_preset=basic",
                    ));
                }
                Ok(Some(CorsPolicy {
                    allow_origin: vec![self.allow_origin.clone()],
                    ..self.shared_policy()
                }))
            }
            "cors_with_regex" => Ok(Some(CorsPolicy {
                allow_origin_regex: vec![self.allow_origin_regex.clone()],
                ..self.shared_policy()
            })),
            _ => Err(GatewayError::invalid_config(
                "cors_preset must be either \"basic\" or \"cors_with_regex\"",
            )),
        }
    }

    fn shared_policy(&self) -> CorsPolicy {
        CorsPolicy {
            allow_methods: self.allow_methods.clone(),
            allow_headers: self.allow_headers.clone(),
            expose_headers: self.expose_headers.clone(),
            allow_credentials: self.allow_credentials,
            ..CorsPolicy::default()
        }
    }
}

/// Everything the generator needs besides the service configuration.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Backend protocol; required, no default.
    pub backend_protocol: BackendProtocol,
    /// Backend cluster host.
    pub cluster_address: String,
    /// Backend cluster port.
    pub cluster_port: u16,
    /// Backend connect timeout.
    pub cluster_connect_timeout: Duration,
    /// Listener bind host.
    pub listener_address: String,
    /// Listener bind port.
    pub listener_port: u16,
    /// CORS settings.
    pub cors: CorsOptions,
    /// Suppress the JWT filter even when providers are present.
    pub skip_jwt_authn_filter: bool,
    /// Suppress the service-control filter even when configured.
    pub skip_service_control_filter: bool,
}

impl GeneratorOptions {
    /// Options for a backend protocol, everything else defaulted.
    #[must_use]
    pub fn new(backend_protocol: BackendProtocol) -> Self {
        Self {
            backend_protocol,
            cluster_address: "127.0.0.1".to_string(),
            cluster_port: 8082,
            cluster_connect_timeout: Duration::from_secs(20),
            listener_address: "0.0.0.0".to_string(),
            listener_port: 8080,
            cors: CorsOptions::default(),
            skip_jwt_authn_filter: false,
            skip_service_control_filter: false,
        }
    }
}
