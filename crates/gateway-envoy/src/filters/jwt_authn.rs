//! JWT authentication filter configuration.

use std::collections::BTreeMap;

use serde::Serialize;

/// JWT authentication filter config: providers keyed by id, plus the
/// per-route requirement rules.
///
/// Providers are a `BTreeMap` so serialization order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JwtAuthentication {
    /// Providers referenced by at least one rule, keyed by provider id.
    pub providers: BTreeMap<String, JwtProvider>,
    /// Requirement rules, in emission order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<JwtRule>,
}

/// One JWT provider with its inlined key set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JwtProvider {
    /// Token issuer URI.
    pub issuer: String,
    /// Accepted audiences; omitted when unrestricted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub audiences: Vec<String>,
    /// The JWKS document, inlined.
    pub local_jwks: DataSource,
}

/// An inline data source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSource {
    /// The document body, verbatim.
    pub inline_string: String,
}

/// One requirement rule: a request match and what it requires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JwtRule {
    /// The request pattern this rule applies to.
    #[serde(rename = "match")]
    pub rule_match: RequirementMatch,
    /// The JWT requirement for matched requests.
    pub requires: JwtRequirement,
}

/// A request match: exact path, template regex, or either combined with a
/// `:method` header match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequirementMatch {
    /// Exact-path match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Regex path match, for templates with variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    /// Header matches; used for the `:method` pseudo-header.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderMatcher>,
}

impl RequirementMatch {
    /// Match an exact path with no method constraint (the gRPC path form).
    pub fn grpc_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Match an exact path for one HTTP verb.
    pub fn http_path(verb: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            headers: vec![HeaderMatcher::method(verb)],
            ..Self::default()
        }
    }

    /// Match a templated path by regex for one HTTP verb.
    pub fn http_regex(verb: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            regex: Some(regex.into()),
            headers: vec![HeaderMatcher::method(verb)],
            ..Self::default()
        }
    }
}

/// An exact header match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderMatcher {
    /// Header name.
    pub name: String,
    /// Required exact value.
    pub exact_match: String,
}

impl HeaderMatcher {
    /// Match the `:method` pseudo-header against an HTTP verb.
    pub fn method(verb: impl Into<String>) -> Self {
        Self {
            name: ":method".to_string(),
            exact_match: verb.into(),
        }
    }
}

/// What a matched request must present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JwtRequirement {
    /// A token from one provider.
    Provider {
        /// The provider id.
        provider_name: String,
    },
    /// A token from one provider restricted to specific audiences.
    ProviderAndAudiences {
        /// The provider-with-audiences requirement.
        provider_and_audiences: ProviderWithAudiences,
    },
    /// Any one of several requirements.
    Any {
        /// The alternatives.
        requires_any: RequirementOrList,
    },
}

impl JwtRequirement {
    /// Requirement for one provider, restricted to `audiences` when
    /// non-empty.
    pub fn for_provider(provider_id: impl Into<String>, audiences: Vec<String>) -> Self {
        let provider_name = provider_id.into();
        if audiences.is_empty() {
            Self::Provider { provider_name }
        } else {
            Self::ProviderAndAudiences {
                provider_and_audiences: ProviderWithAudiences {
                    provider_name,
                    audiences,
                },
            }
        }
    }

    /// Combine requirements: a single one stands alone, several become
    /// `requires_any`.
    pub fn any_of(mut requirements: Vec<JwtRequirement>) -> Option<Self> {
        match requirements.len() {
            0 => None,
            1 => requirements.pop(),
            _ => Some(Self::Any {
                requires_any: RequirementOrList { requirements },
            }),
        }
    }
}

/// A provider requirement with audience restriction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderWithAudiences {
    /// The provider id.
    pub provider_name: String,
    /// Accepted audiences.
    pub audiences: Vec<String>,
}

/// A disjunction of requirements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementOrList {
    /// The alternatives, in provider-rule order.
    pub requirements: Vec<JwtRequirement>,
}
