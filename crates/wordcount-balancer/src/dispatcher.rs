use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use wordcount_common::protocol::error::Result;
use wordcount_common::EndpointId;

use crate::backend::WorkerClient;
use crate::policy::SelectionPolicy;
use crate::pool::ServerPool;

/// Outcome of one dispatched word-count request.
///
/// Produced once per dispatch and handed to the caller; the dispatcher
/// retains nothing. `latency_ms` covers the time spent attempting the
/// worker call and is reported on failures too.
#[derive(Debug)]
pub struct DispatchResult {
    pub endpoint: EndpointId,
    pub latency_ms: f64,
    pub outcome: Result<u64>,
}

impl DispatchResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Orchestrates one client request: pick an endpoint, track the in-flight
/// connection, invoke the worker, and assemble the result.
pub struct Dispatcher {
    pool: Arc<ServerPool>,
    policy: Box<dyn SelectionPolicy>,
    client: Arc<dyn WorkerClient>,
}

impl Dispatcher {
    pub fn new(
        pool: Arc<ServerPool>,
        policy: Box<dyn SelectionPolicy>,
        client: Arc<dyn WorkerClient>,
    ) -> Self {
        info!("Dispatcher using {} selection", policy.name());
        Self {
            pool,
            policy,
            client,
        }
    }

    /// Dispatches one document/keyword lookup to a worker chosen by the
    /// configured policy.
    ///
    /// The in-flight counter on the chosen endpoint is incremented before
    /// the call and released when the guard drops, whether the call
    /// succeeds, fails, or the future is cancelled mid-flight.
    pub async fn dispatch(&self, document_id: &str, keyword: &str) -> DispatchResult {
        let endpoint = self.policy.select(&self.pool);
        let _guard = endpoint.track_connection();

        let start = Instant::now();
        let outcome = self
            .client
            .word_count(endpoint.id(), document_id, keyword)
            .await;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &outcome {
            Ok(count) => info!(
                "Request for {}, {} handled by {}: count={} latency={:.3}ms",
                document_id,
                keyword,
                endpoint.id(),
                count,
                latency_ms
            ),
            Err(e) => debug!(
                "Request for {}, {} failed on {}: {} (latency={:.3}ms)",
                document_id,
                keyword,
                endpoint.id(),
                e,
                latency_ms
            ),
        }

        DispatchResult {
            endpoint: endpoint.id().clone(),
            latency_ms,
            outcome,
        }
    }
}
