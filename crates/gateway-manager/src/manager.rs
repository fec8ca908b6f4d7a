//! The config manager.
//!
//! Orchestrates one cycle — fetch rollouts, resolve the active config id,
//! fetch the configuration, resolve JWKS, generate, publish — and, under
//! the managed rollout strategy, repeats it from a single background
//! refresher task. A failed refresh cycle is logged and dropped; the
//! active snapshot is only ever replaced on full success.

use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use gateway_cache::{Cache, Snapshot, SnapshotCache};
use gateway_config::{generate, resolve_active, GeneratorOptions};
use gateway_core::{BoxResource, GatewayError, NodeHash, Result};

use crate::fetch::{HttpFetcher, ServiceManagementClient};
use crate::jwks::{JwksFailurePolicy, JwksResolver};
use crate::token::TokenSource;

/// Default service management endpoint.
pub const DEFAULT_SERVICE_MANAGEMENT_URL: &str = "https://servicemanagement.googleapis.com";

/// Default interval between rollout checks under the managed strategy.
pub const DEFAULT_CHECK_ROLLOUT_INTERVAL: Duration = Duration::from_secs(60);

/// How the active config id is chosen over time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RolloutStrategy {
    /// The config id passed at construction is final.
    #[default]
    Fixed,
    /// Follow the latest successful rollout on a refresh interval.
    Managed,
}

impl FromStr for RolloutStrategy {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fixed" => Ok(RolloutStrategy::Fixed),
            "managed" => Ok(RolloutStrategy::Managed),
            _ => Err(GatewayError::invalid_config(format!(
                "rollout_strategy must be \"fixed\" or \"managed\", got \"{s}\""
            ))),
        }
    }
}

/// Everything the manager needs besides the service identity.
#[derive(Debug)]
pub struct ManagerOptions {
    /// Service Management base URL.
    pub service_management_url: String,
    /// Rollout strategy.
    pub rollout_strategy: RolloutStrategy,
    /// Interval between rollout checks (managed strategy only).
    /// Injectable so tests can tighten it.
    pub check_rollout_interval: Duration,
    /// The proxy node id snapshots are published under.
    pub node: String,
    /// Options handed to the generator each cycle.
    pub generator: GeneratorOptions,
    /// What a JWKS fetch failure does to the cycle.
    pub jwks_failure_policy: JwksFailurePolicy,
    /// Per-request deadline for outbound fetches.
    pub fetch_timeout: Duration,
}

impl ManagerOptions {
    /// Options for a generator configuration, everything else defaulted.
    #[must_use]
    pub fn new(generator: GeneratorOptions) -> Self {
        Self {
            service_management_url: DEFAULT_SERVICE_MANAGEMENT_URL.to_string(),
            rollout_strategy: RolloutStrategy::Fixed,
            check_rollout_interval: DEFAULT_CHECK_ROLLOUT_INTERVAL,
            node: "api_proxy".to_string(),
            generator,
            jwks_failure_policy: JwksFailurePolicy::default(),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// Fetches, generates, and publishes service configurations.
#[derive(Debug)]
pub struct ConfigManager {
    service_name: String,
    node: NodeHash,
    check_rollout_interval: Duration,
    generator_options: GeneratorOptions,
    client: ServiceManagementClient,
    jwks: JwksResolver,
    cache: Arc<SnapshotCache>,
    cur_config_id: RwLock<String>,
    cur_rollout_id: RwLock<String>,
}

impl ConfigManager {
    /// Create a manager and run the initial fetch-and-publish cycle.
    ///
    /// Under [`RolloutStrategy::Fixed`] the `initial_config_id` is fetched
    /// and stays active forever. Under [`RolloutStrategy::Managed`] the
    /// active config id comes from the latest successful rollout
    /// (`initial_config_id` is only a label until then) and a single
    /// background refresher keeps following rollouts.
    ///
    /// # Errors
    ///
    /// Any failure of the initial cycle — fetch, rollout resolution, or
    /// generation — is returned and no manager is constructed.
    pub async fn new(
        service_name: impl Into<String>,
        initial_config_id: impl Into<String>,
        options: ManagerOptions,
        token: TokenSource,
    ) -> Result<Arc<Self>> {
        let service_name = service_name.into();
        let initial_config_id = initial_config_id.into();

        let http = HttpFetcher::new(options.fetch_timeout)?;
        let client =
            ServiceManagementClient::new(options.service_management_url, token, http.clone());
        let jwks = JwksResolver::new(http, options.jwks_failure_policy);

        let manager = Arc::new(Self {
            service_name,
            node: NodeHash::from_id(&options.node),
            check_rollout_interval: options.check_rollout_interval,
            generator_options: options.generator,
            client,
            jwks,
            cache: Arc::new(SnapshotCache::new()),
            cur_config_id: RwLock::new(String::new()),
            cur_rollout_id: RwLock::new(String::new()),
        });

        match options.rollout_strategy {
            RolloutStrategy::Fixed => {
                manager.apply_config(&initial_config_id, "").await?;
            }
            RolloutStrategy::Managed => {
                manager.refresh().await?;
                manager.spawn_refresher();
            }
        }

        Ok(manager)
    }

    /// The cache handle the xDS server reads from.
    pub fn cache(&self) -> Arc<SnapshotCache> {
        Arc::clone(&self.cache)
    }

    /// The currently active config id.
    pub fn current_config_id(&self) -> String {
        self.cur_config_id
            .read()
            .expect("config id lock poisoned")
            .clone()
    }

    /// The currently active rollout id; empty under the fixed strategy.
    pub fn current_rollout_id(&self) -> String {
        self.cur_rollout_id
            .read()
            .expect("rollout id lock poisoned")
            .clone()
    }

    /// One managed-strategy cycle: resolve the active rollout and, when
    /// it activates a new config id, fetch-generate-publish it.
    async fn refresh(&self) -> Result<()> {
        let rollouts = self.client.fetch_rollouts(&self.service_name).await?;
        let active = resolve_active(&self.service_name, &rollouts)?;

        if active.config_id == self.current_config_id() {
            return Ok(());
        }

        self.apply_config(&active.config_id, &active.rollout_id).await
    }

    /// Fetch, generate, and publish one configuration version.
    async fn apply_config(&self, config_id: &str, rollout_id: &str) -> Result<()> {
        let cfg = self
            .client
            .fetch_service_config(&self.service_name, config_id)
            .await?;
        let jwks = self.jwks.resolve(&cfg).await?;
        let generated = generate(&cfg, &jwks, &self.generator_options)?;

        let listeners: Vec<BoxResource> = generated
            .listeners
            .into_iter()
            .map(|l| Arc::new(l) as BoxResource)
            .collect();
        let clusters: Vec<BoxResource> = generated
            .clusters
            .into_iter()
            .map(|c| Arc::new(c) as BoxResource)
            .collect();

        self.cache.set_snapshot(
            self.node,
            Snapshot::from_resources(config_id, listeners, clusters, vec![], vec![]),
        );

        *self.cur_config_id.write().expect("config id lock poisoned") = config_id.to_string();
        *self
            .cur_rollout_id
            .write()
            .expect("rollout id lock poisoned") = rollout_id.to_string();

        info!(
            service = %self.service_name,
            config_id,
            rollout_id,
            "published configuration snapshot"
        );
        Ok(())
    }

    /// Start the single background refresher. Ticks never overlap: each
    /// cycle completes before the next tick is awaited, and a tick that
    /// runs long delays the following one.
    fn spawn_refresher(self: &Arc<Self>) {
        let manager = Arc::downgrade(self);
        let check_interval = self.check_rollout_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(check_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the initial cycle
            // already ran synchronously.
            interval.tick().await;

            loop {
                interval.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                if let Err(error) = manager.refresh().await {
                    warn!(
                        service = %manager.service_name,
                        %error,
                        "refresh cycle dropped, keeping current snapshot"
                    );
                }
            }
        });
    }
}
