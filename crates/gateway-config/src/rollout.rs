//! Rollout documents and active-config resolution.
//!
//! A rollout assigns traffic percentages to config ids. The resolver is a
//! pure function shared by the startup fetch and the refresher: among
//! `SUCCESS` rollouts it picks the lexicographically largest rollout id
//! (rollout ids are timestamp-prefixed, so this is latest-wins), then the
//! heaviest config id within it.

use std::collections::BTreeMap;

use serde::Deserialize;

use gateway_core::{ConfigVersion, GatewayError, Result};

/// Rollout status marking a completed rollout.
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// The rollouts listing returned by the Service Management endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolloutsResponse {
    /// Rollout records, newest first as served.
    #[serde(default)]
    pub rollouts: Vec<Rollout>,
}

/// One rollout record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rollout {
    /// Rollout id, e.g. `2018-12-05r1`.
    #[serde(default, alias = "rolloutId")]
    pub rollout_id: String,
    /// Rollout status; only `SUCCESS` rollouts are considered.
    #[serde(default)]
    pub status: String,
    /// Traffic assignment by config id.
    #[serde(default, alias = "trafficPercentStrategy")]
    pub traffic_percent_strategy: Option<TrafficPercentStrategy>,
}

/// Traffic percentages keyed by config id.
///
/// A `BTreeMap` keeps iteration deterministic, which is what makes the
/// tie-break below stable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrafficPercentStrategy {
    /// Config id → traffic weight.
    #[serde(default)]
    pub percentages: BTreeMap<String, u64>,
}

/// The resolver's output: which rollout won and which config id it
/// activates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRollout {
    /// The winning rollout id.
    pub rollout_id: String,
    /// The activated config id.
    pub config_id: String,
}

/// Select the active config id from a rollouts listing.
///
/// Among `SUCCESS` rollouts, the one with the largest rollout id wins;
/// within its percentages the heaviest config id wins, ties broken by the
/// lexicographically smallest config id.
///
/// # Errors
///
/// [`GatewayError::RolloutResolution`] when no `SUCCESS` rollout carries a
/// non-empty traffic strategy.
pub fn resolve_active(service_name: &str, rollouts: &[Rollout]) -> Result<ActiveRollout> {
    let latest = rollouts
        .iter()
        .filter(|r| r.status == STATUS_SUCCESS)
        .max_by_key(|r| ConfigVersion::new(r.rollout_id.as_str()))
        .ok_or_else(|| GatewayError::RolloutResolution {
            service_name: service_name.to_string(),
            reason: "no rollout with status SUCCESS".to_string(),
        })?;

    let percentages = latest
        .traffic_percent_strategy
        .as_ref()
        .map(|s| &s.percentages)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| GatewayError::RolloutResolution {
            service_name: service_name.to_string(),
            reason: format!(
                "rollout {} has no traffic percentages",
                latest.rollout_id
            ),
        })?;

    // BTreeMap iterates in ascending key order, so a strict `>` keeps the
    // smallest config id on weight ties.
    let mut active: Option<(&String, u64)> = None;
    for (config_id, weight) in percentages {
        match active {
            Some((_, best)) if *weight <= best => {}
            _ => active = Some((config_id, *weight)),
        }
    }

    let (config_id, _) = active.ok_or_else(|| GatewayError::RolloutResolution {
        service_name: service_name.to_string(),
        reason: format!("rollout {} has no traffic percentages", latest.rollout_id),
    })?;
    Ok(ActiveRollout {
        rollout_id: latest.rollout_id.clone(),
        config_id: config_id.clone(),
    })
}
