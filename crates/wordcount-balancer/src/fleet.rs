use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use wordcount_common::protocol::error::Result;
use wordcount_common::EndpointId;

use crate::backend::WorkerClient;
use crate::pool::{HealthState, ServerPool};

/// Per-endpoint outcome of a pool-wide cache clear.
///
/// Always contains one entry per pool member, in pool order, regardless of
/// individual failures.
#[derive(Debug)]
pub struct CacheClearReport {
    pub outcomes: Vec<(EndpointId, Result<()>)>,
}

impl CacheClearReport {
    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(|(_, r)| r.is_ok())
    }

    /// Identities of the endpoints whose cache clear failed.
    pub fn failed_endpoints(&self) -> Vec<&EndpointId> {
        self.outcomes
            .iter()
            .filter(|(_, r)| r.is_err())
            .map(|(id, _)| id)
            .collect()
    }
}

/// Per-endpoint outcome of a pool-wide health probe.
///
/// Same completeness guarantee as [`CacheClearReport`]; successful entries
/// carry the worker's status string.
#[derive(Debug)]
pub struct HealthReport {
    pub statuses: Vec<(EndpointId, Result<String>)>,
}

impl HealthReport {
    pub fn healthy_count(&self) -> usize {
        self.statuses.iter().filter(|(_, r)| r.is_ok()).count()
    }
}

/// Administrative operations fanned out across the whole pool.
///
/// Every operation invokes all endpoints concurrently and isolates
/// per-endpoint failures: an unreachable worker becomes an error entry in
/// the report, never a propagated fault, and never prevents the other
/// workers from being invoked.
pub struct FleetOperations {
    pool: Arc<ServerPool>,
    client: Arc<dyn WorkerClient>,
}

impl FleetOperations {
    pub fn new(pool: Arc<ServerPool>, client: Arc<dyn WorkerClient>) -> Self {
        Self { pool, client }
    }

    /// Clears the cache on every worker.
    pub async fn clear_cache(&self) -> CacheClearReport {
        let calls = self.pool.endpoints().iter().map(|endpoint| {
            let id = endpoint.id().clone();
            async move {
                let result = self.client.clear_cache(&id).await;
                if let Err(e) = &result {
                    warn!("Failed to clear cache on {}: {}", id, e);
                }
                (id, result)
            }
        });

        CacheClearReport {
            outcomes: join_all(calls).await,
        }
    }

    /// Probes every worker's health and records the outcome on the pool.
    ///
    /// Each endpoint's `last_health` is updated from its probe result; the
    /// report is also returned for display to the caller.
    pub async fn probe_health(&self) -> HealthReport {
        let calls = self.pool.endpoints().iter().map(|endpoint| {
            let id = endpoint.id().clone();
            async move {
                let result = self.client.health_check(&id).await;
                match &result {
                    Ok(status) => {
                        endpoint.set_health(HealthState::Healthy);
                        debug!("Health check on {}: {}", id, status);
                    }
                    Err(e) => {
                        endpoint.set_health(HealthState::Unreachable);
                        warn!("Health check on {} failed: {}", id, e);
                    }
                }
                (id, result)
            }
        });

        HealthReport {
            statuses: join_all(calls).await,
        }
    }
}
