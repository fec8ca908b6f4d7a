//! The service-configuration document model.
//!
//! Deserialized from the Service Management API with unknown-field
//! tolerance: every field is defaulted so partial documents parse, and
//! aliases accept both the snake_case and camelCase spellings the API has
//! used. The document is immutable once parsed; the generator reads it,
//! nothing writes it.

use serde::Deserialize;

/// Source-file type marking a serialized `FileDescriptorSet`.
pub const FILE_DESCRIPTOR_SET_PROTO: &str = "FILE_DESCRIPTOR_SET_PROTO";

/// One versioned service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    /// The config id, e.g. `2019-03-02r0`.
    #[serde(default)]
    pub id: String,
    /// The managed service name.
    #[serde(default)]
    pub name: String,
    /// APIs exposed by this service, in declaration order.
    #[serde(default)]
    pub apis: Vec<Api>,
    /// HTTP bindings.
    #[serde(default)]
    pub http: HttpRules,
    /// Authentication providers and rules.
    #[serde(default)]
    pub authentication: Authentication,
    /// Service-control settings.
    #[serde(default)]
    pub control: Option<Control>,
    /// Source files the config was compiled from.
    #[serde(default, alias = "sourceInfo")]
    pub source_info: Option<SourceInfo>,
}

impl ServiceConfig {
    /// The base64 descriptor set from the source files, if one is present.
    pub fn descriptor_set(&self) -> Option<&str> {
        self.source_info.as_ref().and_then(|info| {
            info.source_files
                .iter()
                .find(|f| f.file_type == FILE_DESCRIPTOR_SET_PROTO)
                .map(|f| f.file_contents.as_str())
        })
    }

    /// HTTP rules bound to `selector`, in declaration order.
    pub fn http_rules_for<'a>(
        &'a self,
        selector: &'a str,
    ) -> impl Iterator<Item = &'a HttpRule> + 'a {
        self.http
            .rules
            .iter()
            .filter(move |rule| rule.selector == selector)
    }
}

/// One API with its methods.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api {
    /// Fully qualified API name, e.g. `endpoints.examples.bookstore.Bookstore`.
    #[serde(default)]
    pub name: String,
    /// API version.
    #[serde(default)]
    pub version: String,
    /// Methods, in declaration order.
    #[serde(default)]
    pub methods: Vec<Method>,
}

/// One API method.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Method {
    /// Method name, unqualified.
    #[serde(default)]
    pub name: String,
}

/// The `http` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpRules {
    /// Bindings, in declaration order.
    #[serde(default)]
    pub rules: Vec<HttpRule>,
}

/// One HTTP binding: a selector plus exactly one verb-to-template mapping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpRule {
    /// Fully qualified method selector.
    #[serde(default)]
    pub selector: String,
    /// GET binding.
    #[serde(default)]
    pub get: Option<String>,
    /// PUT binding.
    #[serde(default)]
    pub put: Option<String>,
    /// POST binding.
    #[serde(default)]
    pub post: Option<String>,
    /// DELETE binding.
    #[serde(default)]
    pub delete: Option<String>,
    /// PATCH binding.
    #[serde(default)]
    pub patch: Option<String>,
    /// Request field holding the body.
    #[serde(default)]
    pub body: Option<String>,
}

impl HttpRule {
    /// The verb and path template this rule binds, if any.
    pub fn binding(&self) -> Option<(HttpVerb, &str)> {
        if let Some(t) = &self.get {
            Some((HttpVerb::Get, t))
        } else if let Some(t) = &self.put {
            Some((HttpVerb::Put, t))
        } else if let Some(t) = &self.post {
            Some((HttpVerb::Post, t))
        } else if let Some(t) = &self.delete {
            Some((HttpVerb::Delete, t))
        } else if let Some(t) = &self.patch {
            Some((HttpVerb::Patch, t))
        } else {
            None
        }
    }
}

/// HTTP verbs a binding can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// PATCH
    Patch,
}

impl HttpVerb {
    /// The verb as it appears in a `:method` header.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Put => "PUT",
            HttpVerb::Post => "POST",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Patch => "PATCH",
        }
    }
}

/// The `authentication` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Authentication {
    /// Declared providers.
    #[serde(default)]
    pub providers: Vec<AuthProvider>,
    /// Per-selector requirement rules.
    #[serde(default)]
    pub rules: Vec<AuthRule>,
}

/// One JWT provider declaration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthProvider {
    /// Provider id referenced by rules.
    #[serde(default)]
    pub id: String,
    /// Token issuer URI.
    #[serde(default)]
    pub issuer: String,
    /// Where the provider's JWKS document lives.
    #[serde(default, alias = "jwksUri")]
    pub jwks_uri: String,
    /// Comma-separated accepted audiences.
    #[serde(default)]
    pub audiences: String,
}

/// One authentication rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthRule {
    /// Fully qualified method selector.
    #[serde(default)]
    pub selector: String,
    /// Acceptable providers; empty means explicitly unauthenticated.
    #[serde(default)]
    pub requirements: Vec<AuthRequirement>,
}

/// One acceptable provider within a rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthRequirement {
    /// The provider id.
    #[serde(default, alias = "providerId")]
    pub provider_id: String,
    /// Comma-separated audience restriction; empty inherits the
    /// provider's.
    #[serde(default)]
    pub audiences: String,
}

/// The `control` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Control {
    /// Service-control environment host.
    #[serde(default)]
    pub environment: String,
}

/// The `sourceInfo` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceInfo {
    /// Files the configuration was compiled from.
    #[serde(default, alias = "sourceFiles")]
    pub source_files: Vec<ConfigFile>,
}

/// One source file entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Original path.
    #[serde(default, alias = "filePath")]
    pub file_path: String,
    /// File contents; base64 for binary file types.
    #[serde(default, alias = "fileContents")]
    pub file_contents: String,
    /// What the file is.
    #[serde(default, alias = "fileType")]
    pub file_type: String,
}

/// Split a comma-separated audience list, trimming surrounding whitespace
/// and dropping empty entries.
#[must_use]
pub fn split_audiences(audiences: &str) -> Vec<String> {
    audiences
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
