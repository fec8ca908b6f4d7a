//! Access-token acquisition.
//!
//! Service Management fetches are authenticated with an OAuth2 access
//! token from the GCE metadata server, cached until shortly before
//! expiry. A fixed-token variant exists for tests and non-GCP
//! deployments that inject a token from the environment.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use gateway_core::Result;

use crate::fetch::HttpFetcher;

/// Default metadata-server token endpoint.
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before they would expire.
const EXPIRY_SLACK: Duration = Duration::from_secs(60);

/// Provides bearer tokens for outbound fetches.
#[derive(Debug)]
pub enum TokenSource {
    /// Fetch and cache tokens from the metadata server.
    Metadata(MetadataTokenSource),
    /// A fixed token, never refreshed.
    Fixed(String),
}

impl TokenSource {
    /// Metadata-server token source at the default endpoint.
    ///
    /// # Errors
    ///
    /// Propagates HTTP client construction failure.
    pub fn metadata_default() -> Result<Self> {
        let http = HttpFetcher::new(Duration::from_secs(5))?;
        Ok(Self::metadata(http, METADATA_TOKEN_URL))
    }

    /// Metadata-server token source at a specific endpoint.
    pub fn metadata(http: HttpFetcher, token_url: impl Into<String>) -> Self {
        Self::Metadata(MetadataTokenSource {
            http,
            token_url: token_url.into(),
            cached: Mutex::new(None),
        })
    }

    /// A fixed token.
    pub fn fixed(token: impl Into<String>) -> Self {
        Self::Fixed(token.into())
    }

    /// The current access token, fetching or refreshing as needed.
    pub async fn access_token(&self) -> Result<String> {
        match self {
            TokenSource::Metadata(source) => source.access_token().await,
            TokenSource::Fixed(token) => Ok(token.clone()),
        }
    }
}

/// Metadata-server backed token source with a single-token cache.
#[derive(Debug)]
pub struct MetadataTokenSource {
    http: HttpFetcher,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

impl MetadataTokenSource {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if Instant::now() < entry.expires_at {
                return Ok(entry.token.clone());
            }
        }

        let headers = [("Metadata-Flavor", "Google".to_string())];
        let body = self.http.get_string(&self.token_url, &headers).await?;
        let response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            gateway_core::GatewayError::invalid_config(format!(
                "malformed token response from {}: {e}",
                self.token_url
            ))
        })?;

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_SLACK);
        debug!(expires_in = response.expires_in, "fetched access token");

        *cached = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(response.access_token)
    }
}
