//! End-to-end generator scenarios over canonical JSON.

use gateway_control_plane::config::JwksMap;
use gateway_control_plane::prelude::*;
use serde_json::{json, Value};

const BOOKSTORE: &str = "endpoints.examples.bookstore.Bookstore";
const PROJECT: &str = "bookstore.endpoints.project123.cloud.goog";
/// base64("rawDescriptor")
const DESCRIPTOR: &str = "cmF3RGVzY3JpcHRvcg==";
const FAKE_JWKS: &str = "FAKEJWKS";

fn parse(json: &str) -> ServiceConfig {
    serde_json::from_str(json).expect("test config parses")
}

fn jwks_for(ids: &[&str]) -> JwksMap {
    ids.iter()
        .map(|id| (id.to_string(), FAKE_JWKS.to_string()))
        .collect()
}

fn listener_json(cfg: &ServiceConfig, jwks: &JwksMap, options: &GeneratorOptions) -> Value {
    let generated = generate(cfg, jwks, options).expect("generation succeeds");
    assert_eq!(generated.listeners.len(), 1);
    serde_json::to_value(&generated.listeners[0]).expect("listener serializes")
}

fn http_filters(listener: &Value) -> &Vec<Value> {
    listener["filterChains"][0]["filters"][0]["config"]["http_filters"]
        .as_array()
        .expect("http_filters is an array")
}

#[test]
fn grpc_backend_with_transcoding() {
    let cfg = parse(&format!(
        r#"{{
            "name": "{PROJECT}",
            "apis": [
                {{"name": "{BOOKSTORE}", "version": "v1", "syntax": "SYNTAX_PROTO3"}}
            ],
            "sourceInfo": {{
                "sourceFiles": [
                    {{
                        "@type": "type.googleapis.com/google.api.servicemanagement.v1.ConfigFile",
                        "filePath": "api_descriptor.pb",
                        "fileContents": "{DESCRIPTOR}",
                        "fileType": "FILE_DESCRIPTOR_SET_PROTO"
                    }}
                ]
            }}
        }}"#
    ));

    let listener = listener_json(
        &cfg,
        &JwksMap::new(),
        &GeneratorOptions::new(BackendProtocol::Grpc),
    );

    assert_eq!(
        listener,
        json!({
            "address": {
                "socketAddress": {"address": "0.0.0.0", "portValue": 8080}
            },
            "filterChains": [
                {
                    "filters": [
                        {
                            "name": "envoy.http_connection_manager",
                            "config": {
                                "stat_prefix": "ingress_http",
                                "http_filters": [
                                    {
                                        "name": "envoy.grpc_json_transcoder",
                                        "config": {
                                            "proto_descriptor_bin": DESCRIPTOR,
                                            "services": [BOOKSTORE]
                                        }
                                    },
                                    {"name": "envoy.grpc_web", "config": {}},
                                    {"name": "envoy.router", "config": {}}
                                ],
                                "route_config": {
                                    "name": "local_route",
                                    "virtual_hosts": [
                                        {
                                            "name": "backend",
                                            "domains": ["*"],
                                            "routes": [
                                                {
                                                    "match": {"prefix": "/"},
                                                    "route": {"cluster": BOOKSTORE}
                                                }
                                            ]
                                        }
                                    ]
                                }
                            }
                        }
                    ]
                }
            ]
        })
    );
}

#[test]
fn grpc_backend_cluster_shape() {
    let cfg = parse(&format!(
        r#"{{"name": "{PROJECT}", "apis": [{{"name": "{BOOKSTORE}"}}]}}"#
    ));

    let generated = generate(
        &cfg,
        &JwksMap::new(),
        &GeneratorOptions::new(BackendProtocol::Grpc),
    )
    .expect("generation succeeds");

    assert_eq!(generated.clusters.len(), 1);
    assert_eq!(
        serde_json::to_value(&generated.clusters[0]).expect("cluster serializes"),
        json!({
            "name": BOOKSTORE,
            "type": "STRICT_DNS",
            "connectTimeout": "20s",
            "hosts": [
                {"socketAddress": {"address": "127.0.0.1", "portValue": 8082}}
            ],
            "http2ProtocolOptions": {}
        })
    );
}

#[test]
fn jwt_filter_with_audiences_drops_unreferenced_provider() {
    let cfg = parse(&format!(
        r#"{{
            "apis": [{{"name": "{BOOKSTORE}"}}],
            "authentication": {{
                "providers": [
                    {{
                        "id": "firebase",
                        "issuer": "https://test_issuer.google.com/",
                        "jwks_uri": "http://jwks.example.com/keys",
                        "audiences": "test_audience1, test_audience2 "
                    }},
                    {{
                        "id": "unknownId",
                        "issuer": "https://test_issuer.google.com/",
                        "jwks_uri": "invalidUrl"
                    }}
                ],
                "rules": [
                    {{
                        "selector": "{BOOKSTORE}.CreateShelf",
                        "requirements": [
                            {{"provider_id": "firebase", "audiences": "test_audience1"}}
                        ]
                    }},
                    {{"selector": "{BOOKSTORE}.ListShelves"}}
                ]
            }}
        }}"#
    ));

    let listener = listener_json(
        &cfg,
        &jwks_for(&["firebase", "unknownId"]),
        &GeneratorOptions::new(BackendProtocol::Grpc),
    );

    let filters = http_filters(&listener);
    assert_eq!(filters[0]["name"], "envoy.filters.http.jwt_authn");

    let jwt = &filters[0]["config"];
    assert_eq!(
        jwt["providers"],
        json!({
            "firebase": {
                "issuer": "https://test_issuer.google.com/",
                "audiences": ["test_audience1", "test_audience2"],
                "local_jwks": {"inline_string": FAKE_JWKS}
            }
        })
    );

    // ListShelves carries no requirements, so only CreateShelf gets a
    // rule; with no HTTP binding it matches the gRPC path alone.
    assert_eq!(
        jwt["rules"],
        json!([
            {
                "match": {"path": format!("/{BOOKSTORE}/CreateShelf")},
                "requires": {
                    "provider_and_audiences": {
                        "provider_name": "firebase",
                        "audiences": ["test_audience1"]
                    }
                }
            }
        ])
    );
}

#[test]
fn jwt_rules_interleave_bindings_before_grpc_paths() {
    let cfg = parse(&format!(
        r#"{{
            "apis": [{{"name": "{BOOKSTORE}"}}],
            "http": {{
                "rules": [
                    {{"selector": "{BOOKSTORE}.ListShelves", "get": "/v1/shelves"}},
                    {{"selector": "{BOOKSTORE}.CreateShelf", "post": "/v1/shelves/{{shelf}}"}}
                ]
            }},
            "authentication": {{
                "providers": [
                    {{
                        "id": "firebase",
                        "issuer": "https://test_issuer.google.com/",
                        "jwks_uri": "http://jwks.example.com/keys"
                    }}
                ],
                "rules": [
                    {{
                        "selector": "{BOOKSTORE}.CreateShelf",
                        "requirements": [{{"provider_id": "firebase"}}]
                    }},
                    {{
                        "selector": "{BOOKSTORE}.ListShelves",
                        "requirements": [{{"provider_id": "firebase"}}]
                    }}
                ]
            }}
        }}"#
    ));

    let listener = listener_json(
        &cfg,
        &jwks_for(&["firebase"]),
        &GeneratorOptions::new(BackendProtocol::Grpc),
    );

    let jwt = &http_filters(&listener)[0]["config"];
    assert_eq!(
        jwt["rules"],
        json!([
            {
                "match": {
                    "regex": "/v1/shelves/[^\\/]+$",
                    "headers": [{"name": ":method", "exact_match": "POST"}]
                },
                "requires": {"provider_name": "firebase"}
            },
            {
                "match": {"path": format!("/{BOOKSTORE}/CreateShelf")},
                "requires": {"provider_name": "firebase"}
            },
            {
                "match": {
                    "path": "/v1/shelves",
                    "headers": [{"name": ":method", "exact_match": "GET"}]
                },
                "requires": {"provider_name": "firebase"}
            },
            {
                "match": {"path": format!("/{BOOKSTORE}/ListShelves")},
                "requires": {"provider_name": "firebase"}
            }
        ])
    );
}

#[test]
fn multiple_requirements_become_requires_any() {
    let cfg = parse(&format!(
        r#"{{
            "apis": [{{"name": "{BOOKSTORE}"}}],
            "http": {{
                "rules": [
                    {{
                        "selector": "{BOOKSTORE}.GetBook",
                        "get": "/v1/shelves/{{shelf}}/books/{{book}}"
                    }}
                ]
            }},
            "authentication": {{
                "providers": [
                    {{
                        "id": "firebase1",
                        "issuer": "https://test_issuer.google.com/",
                        "jwks_uri": "http://jwks.example.com/keys"
                    }},
                    {{
                        "id": "firebase2",
                        "issuer": "https://test_issuer.google.com/",
                        "jwks_uri": "http://jwks.example.com/keys"
                    }}
                ],
                "rules": [
                    {{
                        "selector": "{BOOKSTORE}.GetBook",
                        "requirements": [
                            {{"provider_id": "firebase1"}},
                            {{"provider_id": "firebase2"}}
                        ]
                    }}
                ]
            }}
        }}"#
    ));

    let listener = listener_json(
        &cfg,
        &jwks_for(&["firebase1", "firebase2"]),
        &GeneratorOptions::new(BackendProtocol::Grpc),
    );

    let jwt = &http_filters(&listener)[0]["config"];
    let rules = jwt["rules"].as_array().expect("rules");
    assert_eq!(rules.len(), 2);

    let expected_requires = json!({
        "requires_any": {
            "requirements": [
                {"provider_name": "firebase1"},
                {"provider_name": "firebase2"}
            ]
        }
    });
    assert_eq!(
        rules[0]["match"],
        json!({
            "regex": "/v1/shelves/[^\\/]+/books/[^\\/]+$",
            "headers": [{"name": ":method", "exact_match": "GET"}]
        })
    );
    assert_eq!(rules[0]["requires"], expected_requires);
    assert_eq!(
        rules[1]["match"],
        json!({"path": format!("/{BOOKSTORE}/GetBook")})
    );
    assert_eq!(rules[1]["requires"], expected_requires);
}

#[test]
fn service_control_patterns_in_declaration_order() {
    let cfg = parse(&format!(
        r#"{{
            "name": "{PROJECT}",
            "control": {{"environment": "servicecontrol.googleapis.com"}},
            "apis": [
                {{
                    "name": "{BOOKSTORE}",
                    "version": "v1",
                    "methods": [
                        {{"name": "ListShelves"}},
                        {{"name": "CreateShelf"}}
                    ]
                }}
            ],
            "http": {{
                "rules": [
                    {{"selector": "{BOOKSTORE}.ListShelves", "get": "/v1/shelves"}},
                    {{
                        "selector": "{BOOKSTORE}.CreateShelf",
                        "post": "/v1/shelves",
                        "body": "shelf"
                    }}
                ]
            }}
        }}"#
    ));

    let listener = listener_json(
        &cfg,
        &JwksMap::new(),
        &GeneratorOptions::new(BackendProtocol::Grpc),
    );

    let filters = http_filters(&listener);
    let names: Vec<&str> = filters
        .iter()
        .map(|f| f["name"].as_str().expect("name"))
        .collect();
    assert_eq!(
        names,
        [
            "envoy.filters.http.service_control",
            "envoy.grpc_web",
            "envoy.router"
        ]
    );

    let sc = &filters[0]["config"];
    assert_eq!(
        sc["rules"],
        json!([
            {
                "pattern": {
                    "http_method": "POST",
                    "uri_template": format!("/{BOOKSTORE}/ListShelves")
                },
                "requires": {
                    "operation_name": format!("{BOOKSTORE}.ListShelves"),
                    "service_name": PROJECT
                }
            },
            {
                "pattern": {"http_method": "GET", "uri_template": "/v1/shelves"},
                "requires": {
                    "operation_name": format!("{BOOKSTORE}.ListShelves"),
                    "service_name": PROJECT
                }
            },
            {
                "pattern": {
                    "http_method": "POST",
                    "uri_template": format!("/{BOOKSTORE}/CreateShelf")
                },
                "requires": {
                    "operation_name": format!("{BOOKSTORE}.CreateShelf"),
                    "service_name": PROJECT
                }
            },
            {
                "pattern": {"http_method": "POST", "uri_template": "/v1/shelves"},
                "requires": {
                    "operation_name": format!("{BOOKSTORE}.CreateShelf"),
                    "service_name": PROJECT
                }
            }
        ])
    );
    assert_eq!(
        sc["services"],
        json!([
            {
                "service_name": PROJECT,
                "service_control_uri": {
                    "uri": "https://servicecontrol.googleapis.com/v1/services/",
                    "cluster": "service_control_cluster",
                    "timeout": "5s"
                },
                "token_cluster": "ads_cluster"
            }
        ])
    );
}

#[test]
fn http1_backend_with_jwt_has_no_grpc_filters() {
    let cfg = parse(&format!(
        r#"{{
            "apis": [{{"name": "{BOOKSTORE}"}}],
            "http": {{
                "rules": [
                    {{
                        "selector": "1.echo_api.Echo_Auth_Jwt",
                        "get": "/auth/info/googlejwt"
                    }}
                ]
            }},
            "authentication": {{
                "providers": [
                    {{
                        "id": "firebase",
                        "issuer": "https://test_issuer.google.com/",
                        "jwks_uri": "http://jwks.example.com/keys",
                        "audiences": "test_audience1, test_audience2 "
                    }}
                ],
                "rules": [
                    {{
                        "selector": "1.echo_api.Echo_Auth_Jwt",
                        "requirements": [
                            {{"provider_id": "firebase", "audiences": "test_audience1"}}
                        ]
                    }}
                ]
            }}
        }}"#
    ));

    let listener = listener_json(
        &cfg,
        &jwks_for(&["firebase"]),
        &GeneratorOptions::new(BackendProtocol::Http1),
    );

    let filters = http_filters(&listener);
    let names: Vec<&str> = filters
        .iter()
        .map(|f| f["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, ["envoy.filters.http.jwt_authn", "envoy.router"]);

    let first_rule = &filters[0]["config"]["rules"][0];
    assert_eq!(
        first_rule["match"],
        json!({
            "path": "/auth/info/googlejwt",
            "headers": [{"name": ":method", "exact_match": "GET"}]
        })
    );
}

#[test]
fn cors_fields_without_preset_fail_generation() {
    let cfg = parse(&format!(r#"{{"apis": [{{"name": "{BOOKSTORE}"}}]}}"#));

    let mut options = GeneratorOptions::new(BackendProtocol::Http1);
    options.cors.allow_methods = "GET".to_string();

    let err = generate(&cfg, &JwksMap::new(), &options).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid configuration: cors_preset must be set in order to enable CORS support"
    );
}

#[test]
fn cors_policy_lands_on_the_virtual_host() {
    let cfg = parse(&format!(r#"{{"apis": [{{"name": "{BOOKSTORE}"}}]}}"#));

    let mut options = GeneratorOptions::new(BackendProtocol::Http1);
    options.cors = CorsOptions {
        preset: "basic".to_string(),
        allow_origin: "http://example.com".to_string(),
        allow_methods: "GET,POST,PUT,OPTIONS".to_string(),
        ..CorsOptions::default()
    };

    let listener = listener_json(&cfg, &JwksMap::new(), &options);
    let cors = &listener["filterChains"][0]["filters"][0]["config"]["route_config"]
        ["virtual_hosts"][0]["cors"];
    assert_eq!(
        *cors,
        json!({
            "allow_origin": ["http://example.com"],
            "allow_methods": "GET,POST,PUT,OPTIONS",
            "allow_credentials": false
        })
    );
}
