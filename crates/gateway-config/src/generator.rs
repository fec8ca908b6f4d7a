//! The config generator.
//!
//! A pure function from one service configuration (plus pre-fetched JWKS
//! documents and options) to the listener and cluster resources published
//! for the proxy. Filter order inside the listener is fixed: JWT
//! authentication, service control, gRPC-JSON transcoding, gRPC-Web, then
//! the router; optional filters are omitted when their inputs are empty.

use std::collections::{BTreeMap, HashMap, HashSet};

use base64::Engine as _;
use tracing::debug;

use gateway_core::{GatewayError, Result};
use gateway_envoy::filters::jwt_authn::{
    DataSource, JwtAuthentication, JwtProvider, JwtRequirement, JwtRule, RequirementMatch,
};
use gateway_envoy::filters::service_control::{
    HttpPattern, OperationRequirement, ServiceControl, ServiceControlRule, ServiceControlService,
};
use gateway_envoy::filters::transcoder::GrpcJsonTranscoder;
use gateway_envoy::{Address, Cluster, DiscoveryType, HttpFilter, Http2ProtocolOptions, Listener, RouteConfiguration};

use crate::options::GeneratorOptions;
use crate::service::{split_audiences, ServiceConfig};
use crate::template::PathMatch;

/// Pre-fetched JWKS documents, keyed by provider id.
///
/// A provider id absent from the map is treated as a failed fetch and
/// dropped from the emitted filter.
pub type JwksMap = HashMap<String, String>;

/// The generator's output: the resources to publish as one snapshot.
#[derive(Debug, Clone)]
pub struct GeneratedConfig {
    /// Listeners; exactly one is generated.
    pub listeners: Vec<Listener>,
    /// Clusters; exactly one is generated.
    pub clusters: Vec<Cluster>,
}

/// Map a service configuration into listener and cluster resources.
///
/// # Errors
///
/// [`GatewayError::InvalidConfig`] when the configuration lists no APIs,
/// carries an undecodable proto descriptor, or the CORS options are an
/// invalid combination.
pub fn generate(
    cfg: &ServiceConfig,
    jwks: &JwksMap,
    options: &GeneratorOptions,
) -> Result<GeneratedConfig> {
    let backend = cfg.apis.first().ok_or_else(|| {
        GatewayError::invalid_config("service config must list at least one api")
    })?;

    let cluster = make_backend_cluster(&backend.name, options);
    let route_config =
        RouteConfiguration::for_backend(cluster.name.as_str(), options.cors.to_policy()?);

    let mut http_filters = Vec::new();
    if !options.skip_jwt_authn_filter {
        if let Some(jwt) = make_jwt_filter(cfg, jwks) {
            http_filters.push(HttpFilter::jwt_authn(jwt));
        }
    }
    if !options.skip_service_control_filter {
        if let Some(service_control) = make_service_control_filter(cfg) {
            http_filters.push(HttpFilter::service_control(service_control));
        }
    }
    if options.backend_protocol.is_grpc() {
        if let Some(transcoder) = make_transcoder_filter(cfg)? {
            http_filters.push(HttpFilter::transcoder(transcoder));
        }
        http_filters.push(HttpFilter::grpc_web());
    }
    http_filters.push(HttpFilter::router());

    let listener = Listener::ingress(
        Address::new(options.listener_address.as_str(), options.listener_port),
        http_filters,
        route_config,
    );

    Ok(GeneratedConfig {
        listeners: vec![listener],
        clusters: vec![cluster],
    })
}

fn make_backend_cluster(name: &str, options: &GeneratorOptions) -> Cluster {
    Cluster {
        name: name.to_string(),
        discovery_type: DiscoveryType::StrictDns,
        connect_timeout: options.cluster_connect_timeout,
        hosts: vec![Address::new(options.cluster_address.as_str(), options.cluster_port)],
        http2_protocol_options: options
            .backend_protocol
            .uses_http2()
            .then(Http2ProtocolOptions::default),
    }
}

/// Build the JWT filter, or `None` when no referenced provider survives.
fn make_jwt_filter(cfg: &ServiceConfig, jwks: &JwksMap) -> Option<JwtAuthentication> {
    let auth = &cfg.authentication;

    let referenced: HashSet<&str> = auth
        .rules
        .iter()
        .flat_map(|rule| rule.requirements.iter())
        .map(|req| req.provider_id.as_str())
        .collect();

    let mut providers = BTreeMap::new();
    for provider in &auth.providers {
        if !referenced.contains(provider.id.as_str()) {
            continue;
        }
        let Some(document) = jwks.get(&provider.id) else {
            debug!(provider = %provider.id, "dropping provider without a key set");
            continue;
        };
        providers.insert(
            provider.id.clone(),
            JwtProvider {
                issuer: provider.issuer.clone(),
                audiences: split_audiences(&provider.audiences),
                local_jwks: DataSource {
                    inline_string: document.clone(),
                },
            },
        );
    }
    if providers.is_empty() {
        return None;
    }

    let mut rules = Vec::new();
    for rule in &auth.rules {
        let requirements: Vec<JwtRequirement> = rule
            .requirements
            .iter()
            .filter(|req| providers.contains_key(&req.provider_id))
            .map(|req| {
                JwtRequirement::for_provider(&req.provider_id, split_audiences(&req.audiences))
            })
            .collect();

        // Zero requirements means the selector is explicitly
        // unauthenticated; it gets no rule.
        let Some(requires) = JwtRequirement::any_of(requirements) else {
            continue;
        };

        for rule_match in match_patterns(cfg, &rule.selector) {
            rules.push(JwtRule {
                rule_match,
                requires: requires.clone(),
            });
        }
    }

    Some(JwtAuthentication { providers, rules })
}

/// Match patterns for a selector: its HTTP bindings first, then its gRPC
/// path.
fn match_patterns(cfg: &ServiceConfig, selector: &str) -> Vec<RequirementMatch> {
    let mut patterns = Vec::new();
    for rule in cfg.http_rules_for(selector) {
        let Some((verb, template)) = rule.binding() else {
            continue;
        };
        patterns.push(match PathMatch::compile(template) {
            PathMatch::Exact(path) => RequirementMatch::http_path(verb.as_str(), path),
            PathMatch::Regex(regex) => RequirementMatch::http_regex(verb.as_str(), regex),
        });
    }
    if let Some(path) = grpc_path(selector) {
        patterns.push(RequirementMatch::grpc_path(path));
    }
    patterns
}

/// `pkg.Service.Method` → `/pkg.Service/Method`.
fn grpc_path(selector: &str) -> Option<String> {
    let (api, method) = selector.rsplit_once('.')?;
    Some(format!("/{api}/{method}"))
}

/// Build the service-control filter, or `None` without an environment.
fn make_service_control_filter(cfg: &ServiceConfig) -> Option<ServiceControl> {
    let environment = cfg
        .control
        .as_ref()
        .map(|c| c.environment.as_str())
        .filter(|e| !e.is_empty())?;

    let mut rules = Vec::new();
    for api in &cfg.apis {
        for method in &api.methods {
            let selector = format!("{}.{}", api.name, method.name);
            let requires = OperationRequirement {
                operation_name: selector.clone(),
                service_name: cfg.name.clone(),
            };

            // The gRPC pattern leads; the method's HTTP bindings follow.
            rules.push(ServiceControlRule {
                pattern: HttpPattern {
                    http_method: "POST".to_string(),
                    uri_template: format!("/{}/{}", api.name, method.name),
                },
                requires: requires.clone(),
            });
            for rule in cfg.http_rules_for(&selector) {
                if let Some((verb, template)) = rule.binding() {
                    rules.push(ServiceControlRule {
                        pattern: HttpPattern {
                            http_method: verb.as_str().to_string(),
                            uri_template: template.to_string(),
                        },
                        requires: requires.clone(),
                    });
                }
            }
        }
    }

    Some(ServiceControl {
        rules,
        services: vec![ServiceControlService::for_environment(
            cfg.name.as_str(),
            environment,
        )],
    })
}

/// Build the transcoder filter, or `None` without a descriptor set.
fn make_transcoder_filter(cfg: &ServiceConfig) -> Result<Option<GrpcJsonTranscoder>> {
    let Some(descriptor) = cfg.descriptor_set() else {
        return Ok(None);
    };
    base64::engine::general_purpose::STANDARD
        .decode(descriptor)
        .map_err(|e| {
            GatewayError::invalid_config(format!("proto descriptor is not valid base64: {e}"))
        })?;

    Ok(Some(GrpcJsonTranscoder {
        proto_descriptor_bin: descriptor.to_string(),
        services: cfg.apis.iter().map(|api| api.name.clone()).collect(),
    }))
}
