use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::fleet::FleetOperations;

/// Health monitor configuration.
#[derive(Debug, Clone)]
pub struct HealthMonitorConfig {
    pub interval: Duration,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Background loop refreshing pool health state on a fixed interval.
///
/// Runs independently of request traffic: it shares only each endpoint's
/// health field with the rest of the system, which the dispatch path never
/// reads. The probe result is logged and discarded; clients asking for
/// health get a fresh probe through the gateway instead.
pub struct HealthMonitor {
    fleet: Arc<FleetOperations>,
    config: HealthMonitorConfig,
}

impl HealthMonitor {
    pub fn new(fleet: Arc<FleetOperations>, config: HealthMonitorConfig) -> Self {
        Self { fleet, config }
    }

    /// Starts the monitor task. Abort the returned handle to stop it on
    /// shutdown.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(self) {
        let mut interval = tokio::time::interval(self.config.interval);
        loop {
            interval.tick().await;
            let report = self.fleet.probe_health().await;
            debug!(
                "Health probe: {}/{} endpoints healthy",
                report.healthy_count(),
                report.statuses.len()
            );
        }
    }
}
