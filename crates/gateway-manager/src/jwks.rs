//! JWKS resolution for JWT providers.
//!
//! The generator is pure, so key sets are fetched here first and handed
//! in as a map. Documents are cached per URI for a bounded duration; a
//! provider whose fetch fails is either dropped from the map (default) or
//! fails the whole cycle, depending on policy.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use gateway_config::{JwksMap, ServiceConfig};
use gateway_core::Result;

use crate::fetch::HttpFetcher;

/// Default lifetime of a cached JWKS document.
const JWKS_CACHE_DURATION: Duration = Duration::from_secs(300);

/// What to do when a provider's JWKS fetch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JwksFailurePolicy {
    /// Drop the provider from the emitted filter and log.
    #[default]
    DropProvider,
    /// Fail the generation cycle; the previous snapshot stays active.
    FailCycle,
}

/// Fetches and caches JWKS documents for referenced providers.
#[derive(Debug)]
pub struct JwksResolver {
    http: HttpFetcher,
    policy: JwksFailurePolicy,
    cache_duration: Duration,
    cache: Mutex<HashMap<String, CachedJwks>>,
}

#[derive(Debug, Clone)]
struct CachedJwks {
    document: String,
    fetched_at: Instant,
}

impl JwksResolver {
    /// Create a resolver with the given failure policy.
    pub fn new(http: HttpFetcher, policy: JwksFailurePolicy) -> Self {
        Self {
            http,
            policy,
            cache_duration: JWKS_CACHE_DURATION,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the key set of every provider referenced by an
    /// authentication rule.
    ///
    /// # Errors
    ///
    /// Under [`JwksFailurePolicy::FailCycle`], the first fetch failure;
    /// otherwise failed providers are simply absent from the returned map.
    pub async fn resolve(&self, cfg: &ServiceConfig) -> Result<JwksMap> {
        let auth = &cfg.authentication;
        let referenced: std::collections::HashSet<&str> = auth
            .rules
            .iter()
            .flat_map(|rule| rule.requirements.iter())
            .map(|req| req.provider_id.as_str())
            .collect();

        let mut resolved = JwksMap::new();
        for provider in &auth.providers {
            if !referenced.contains(provider.id.as_str()) || provider.jwks_uri.is_empty() {
                continue;
            }
            match self.fetch_document(&provider.jwks_uri).await {
                Ok(document) => {
                    resolved.insert(provider.id.clone(), document);
                }
                Err(error) => match self.policy {
                    JwksFailurePolicy::DropProvider => {
                        warn!(
                            provider = %provider.id,
                            jwks_uri = %provider.jwks_uri,
                            %error,
                            "dropping provider after JWKS fetch failure"
                        );
                    }
                    JwksFailurePolicy::FailCycle => return Err(error),
                },
            }
        }
        Ok(resolved)
    }

    async fn fetch_document(&self, uri: &str) -> Result<String> {
        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.get(uri) {
                if entry.fetched_at.elapsed() < self.cache_duration {
                    return Ok(entry.document.clone());
                }
            }
        }

        // The body is captured verbatim; it ends up inlined in the
        // filter's local_jwks.
        let document = self.http.get_string(uri, &[]).await?;

        let mut cache = self.cache.lock().await;
        cache.insert(
            uri.to_string(),
            CachedJwks {
                document: document.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(document)
    }
}
