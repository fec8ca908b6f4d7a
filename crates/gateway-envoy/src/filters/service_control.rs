//! Service-control filter configuration.

use std::time::Duration;

use serde::Serialize;

/// Cluster the service-control filter reports through.
pub const SERVICE_CONTROL_CLUSTER: &str = "service_control_cluster";

/// Cluster the filter fetches access tokens from.
pub const TOKEN_CLUSTER: &str = "ads_cluster";

/// Timeout for service-control calls.
pub const SERVICE_CONTROL_TIMEOUT: Duration = Duration::from_secs(5);

/// Service-control filter config: one rule per request pattern, one
/// reporting service entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceControl {
    /// Request patterns and the operations they report as.
    pub rules: Vec<ServiceControlRule>,
    /// Reporting endpoints; exactly one is emitted.
    pub services: Vec<ServiceControlService>,
}

/// One request pattern mapped to its operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceControlRule {
    /// The request pattern.
    pub pattern: HttpPattern,
    /// Operation identity reported for matching requests.
    pub requires: OperationRequirement,
}

/// An HTTP method and URI template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpPattern {
    /// HTTP verb.
    pub http_method: String,
    /// URI template, e.g. `/v1/shelves/{shelf}`.
    pub uri_template: String,
}

/// The operation a pattern reports as.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRequirement {
    /// Fully qualified selector, e.g. `pkg.Service.Method`.
    pub operation_name: String,
    /// The managed service name.
    pub service_name: String,
}

/// One reporting service entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceControlService {
    /// The managed service name.
    pub service_name: String,
    /// Where check/report calls go.
    pub service_control_uri: HttpUri,
    /// Cluster access tokens are fetched through.
    pub token_cluster: String,
}

impl ServiceControlService {
    /// Build the reporting entry for a service-control environment host.
    ///
    /// The environment may be schemeless (`servicecontrol.googleapis.com`);
    /// `https://` is prepended when missing and the `/v1/services/` suffix
    /// is appended.
    pub fn for_environment(service_name: impl Into<String>, environment: &str) -> Self {
        let base = if environment.contains("://") {
            environment.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", environment.trim_end_matches('/'))
        };
        Self {
            service_name: service_name.into(),
            service_control_uri: HttpUri {
                uri: format!("{base}/v1/services/"),
                cluster: SERVICE_CONTROL_CLUSTER.to_string(),
                timeout: SERVICE_CONTROL_TIMEOUT,
            },
            token_cluster: TOKEN_CLUSTER.to_string(),
        }
    }
}

/// A URI reached through a named cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpUri {
    /// Full URI.
    pub uri: String,
    /// Cluster carrying the traffic.
    pub cluster: String,
    /// Call timeout.
    #[serde(with = "crate::duration")]
    pub timeout: Duration,
}
