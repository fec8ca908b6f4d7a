//! HTTP fetching for upstream JSON documents.
//!
//! [`HttpFetcher`] is the one place outbound requests happen: every GET
//! carries the client-wide deadline and is retried with exponential
//! backoff before the failure surfaces as a
//! [`GatewayError::FetchFailure`]. [`ServiceManagementClient`] layers the
//! Service Management endpoints and bearer authentication on top.

use std::time::Duration;

use serde::de::DeserializeOwned;

use gateway_config::{Rollout, RolloutsResponse, ServiceConfig};
use gateway_core::{GatewayError, Result};

use crate::token::TokenSource;

/// Retries per request on top of the initial attempt.
const FETCH_RETRIES: u32 = 3;

/// First backoff step; doubles per retry.
const BACKOFF_STEP: Duration = Duration::from_millis(100);

/// Backoff ceiling.
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// A retrying HTTP GET client for JSON documents.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests all carry `request_timeout`.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InvalidConfig`] when the underlying client cannot
    /// be constructed (TLS backend initialization).
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| {
                GatewayError::invalid_config(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client })
    }

    /// GET a URL and return the body, retrying transient failures.
    pub async fn get_string(&self, url: &str, headers: &[(&str, String)]) -> Result<String> {
        tryhard::retry_fn(|| self.get_once(url, headers))
            .retries(FETCH_RETRIES)
            .exponential_backoff(BACKOFF_STEP)
            .max_delay(MAX_BACKOFF)
            .await
    }

    async fn get_once(&self, url: &str, headers: &[(&str, String)]) -> Result<String> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.send().await.map_err(|e| GatewayError::fetch(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::fetch_status(
                url,
                format!("unexpected HTTP status {status}"),
            ));
        }
        response.text().await.map_err(|e| GatewayError::fetch(url, e))
    }

    /// GET a JSON document with a bearer token and parse it.
    ///
    /// Transport failures are [`GatewayError::FetchFailure`]; a body that
    /// fails to parse is [`GatewayError::InvalidConfig`] and is not
    /// retried.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        let headers = [("Authorization", format!("Bearer {token}"))];
        let body = self.get_string(url, &headers).await?;
        serde_json::from_str(&body)
            .map_err(|e| GatewayError::invalid_config(format!("malformed JSON from {url}: {e}")))
    }
}

/// Client for the Service Management configuration and rollout endpoints.
#[derive(Debug)]
pub struct ServiceManagementClient {
    http: HttpFetcher,
    base_url: String,
    token: TokenSource,
}

impl ServiceManagementClient {
    /// Create a client against `base_url` (no trailing slash needed).
    pub fn new(base_url: impl Into<String>, token: TokenSource, http: HttpFetcher) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn config_url(&self, service_name: &str, config_id: &str) -> String {
        format!(
            "{}/v1/services/{}/configs/{}?view=FULL",
            self.base_url, service_name, config_id
        )
    }

    fn rollouts_url(&self, service_name: &str) -> String {
        format!(
            "{}/v1/services/{}/rollouts?filter=status=SUCCESS",
            self.base_url, service_name
        )
    }

    /// Fetch one service configuration by id.
    pub async fn fetch_service_config(
        &self,
        service_name: &str,
        config_id: &str,
    ) -> Result<ServiceConfig> {
        let token = self.token.access_token().await?;
        self.http
            .get_json(&self.config_url(service_name, config_id), &token)
            .await
    }

    /// Fetch the successful rollouts for a service.
    pub async fn fetch_rollouts(&self, service_name: &str) -> Result<Vec<Rollout>> {
        let token = self.token.access_token().await?;
        let listing: RolloutsResponse = self
            .http
            .get_json(&self.rollouts_url(service_name), &token)
            .await?;
        Ok(listing.rollouts)
    }
}
