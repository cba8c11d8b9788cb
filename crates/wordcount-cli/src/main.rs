//! Entry point for the word-count dispatcher.
//!
//! Starts the gateway and the background health monitor against a fixed
//! pool of worker endpoints.
//!
//! ```bash
//! # Round-robin over three workers
//! wordcount-balancer -b 0.0.0.0:8765 \
//!   -w wordcount_server_1:18812 \
//!   -w wordcount_server_2:18813 \
//!   -w wordcount_server_3:18814
//!
//! # Least-connections, faster health probing
//! wordcount-balancer -w localhost:18812 -w localhost:18813 \
//!   --policy LEAST_CONNECTIONS --health-check-interval 2
//! ```
//!
//! The selection policy may also come from the `LOAD_BALANCING_ALGORITHM`
//! environment variable; `--policy` wins when both are set. Unrecognized
//! values fall back to `ROUND_ROBIN`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use argh::FromArgs;

use wordcount_balancer::{
    Dispatcher, FleetOperations, Gateway, HealthMonitor, HealthMonitorConfig, PolicyKind,
    ServerPool, TcpWorkerClient,
};
use wordcount_common::EndpointId;

/// word-count request dispatcher
#[derive(FromArgs)]
struct Cli {
    /// address to bind the client-facing gateway to
    #[argh(option, short = 'b', default = "\"0.0.0.0:8765\".into()")]
    bind: String,

    /// worker endpoint as host:port; repeat to add workers
    #[argh(option, short = 'w', long = "worker")]
    workers: Vec<String>,

    /// selection policy: ROUND_ROBIN, LEAST_CONNECTIONS or RANDOM
    /// (overrides the LOAD_BALANCING_ALGORITHM environment variable)
    #[argh(option, long = "policy")]
    policy: Option<String>,

    /// seconds between background health probes
    #[argh(option, long = "health-check-interval", default = "5")]
    health_check_interval_secs: u64,

    /// per-call worker timeout in milliseconds
    #[argh(option, long = "worker-timeout-ms", default = "5000")]
    worker_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let endpoints = cli
        .workers
        .iter()
        .map(|w| w.parse::<EndpointId>())
        .collect::<wordcount_common::Result<Vec<_>>>()?;

    tracing::info!("Starting word-count dispatcher");
    tracing::info!("Workers: {:?}", cli.workers);

    let pool = Arc::new(ServerPool::new(endpoints)?);
    let policy = PolicyKind::resolve(cli.policy.as_deref());
    tracing::info!("Selection policy: {:?}", policy);

    let client = Arc::new(TcpWorkerClient::with_timeout(Duration::from_millis(
        cli.worker_timeout_ms,
    )));
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&pool),
        policy.build(),
        client.clone(),
    ));
    let fleet = Arc::new(FleetOperations::new(pool, client));

    let monitor = HealthMonitor::new(
        Arc::clone(&fleet),
        HealthMonitorConfig {
            interval: Duration::from_secs(cli.health_check_interval_secs),
        },
    );
    let monitor_handle = monitor.spawn();

    let gateway = Gateway::bind(&cli.bind, dispatcher, fleet).await?;
    let result = gateway.run().await;

    monitor_handle.abort();
    result?;
    Ok(())
}
