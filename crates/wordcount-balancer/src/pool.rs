use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use wordcount_common::protocol::error::{BalancerError, Result};
use wordcount_common::EndpointId;

/// Last known health of an endpoint.
///
/// Written only by the health monitor, read only for reporting. Selection
/// policies do not consult it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown,
    Healthy,
    Unreachable,
}

/// One worker endpoint with its live state.
///
/// `in_flight` counts dispatches currently executing against this worker.
/// It is incremented exactly once per dispatch attempt and decremented
/// exactly once when that attempt completes, success or failure; the pairing
/// is enforced by [`ConnectionGuard`].
#[derive(Debug)]
pub struct Endpoint {
    id: EndpointId,
    in_flight: AtomicU32,
    last_health: RwLock<HealthState>,
}

impl Endpoint {
    pub fn new(id: EndpointId) -> Self {
        Self {
            id,
            in_flight: AtomicU32::new(0),
            last_health: RwLock::new(HealthState::Unknown),
        }
    }

    pub fn id(&self) -> &EndpointId {
        &self.id
    }

    pub fn in_flight(&self) -> u32 {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn last_health(&self) -> HealthState {
        *self.last_health.read()
    }

    pub fn set_health(&self, state: HealthState) {
        *self.last_health.write() = state;
    }

    /// Registers one in-flight dispatch against this endpoint.
    ///
    /// The returned guard decrements the counter when dropped, so the
    /// counter balances even if the dispatch future is cancelled while the
    /// worker call is still outstanding.
    pub fn track_connection(self: &Arc<Self>) -> ConnectionGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        ConnectionGuard {
            endpoint: Arc::clone(self),
        }
    }
}

/// RAII handle for one in-flight dispatch.
pub struct ConnectionGuard {
    endpoint: Arc<Endpoint>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.endpoint.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

/// The fixed, ordered set of worker endpoints.
///
/// Membership is static for the process lifetime. The pool itself is
/// immutable; all mutable state lives inside each [`Endpoint`], so
/// concurrent dispatches to different endpoints never contend.
#[derive(Debug)]
pub struct ServerPool {
    endpoints: Vec<Arc<Endpoint>>,
}

impl ServerPool {
    /// Builds the pool from static configuration.
    pub fn new(ids: Vec<EndpointId>) -> Result<Self> {
        if ids.is_empty() {
            return Err(BalancerError::Configuration(
                "server pool must contain at least one endpoint".to_string(),
            ));
        }
        Ok(Self {
            endpoints: ids
                .into_iter()
                .map(|id| Arc::new(Endpoint::new(id)))
                .collect(),
        })
    }

    /// All endpoints in configuration order.
    pub fn endpoints(&self) -> &[Arc<Endpoint>] {
        &self.endpoints
    }

    /// Looks up an endpoint by identity. Should never fail given static
    /// membership; the error exists for defensive callers.
    pub fn get(&self, id: &EndpointId) -> Result<&Arc<Endpoint>> {
        self.endpoints
            .iter()
            .find(|e| e.id() == id)
            .ok_or_else(|| BalancerError::UnknownEndpoint(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
