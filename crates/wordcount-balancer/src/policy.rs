use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::Rng;
use tracing::warn;

use crate::pool::{Endpoint, ServerPool};

/// A strategy mapping pool state to a chosen endpoint.
///
/// Policies only look at connection counts and pool order, never at health
/// state. The pool is non-empty by construction, so selection always
/// succeeds.
pub trait SelectionPolicy: Send + Sync {
    fn select(&self, pool: &ServerPool) -> Arc<Endpoint>;

    /// Policy name for logging.
    fn name(&self) -> &'static str;
}

/// Cycles through the pool in order.
///
/// The cursor advance is a single atomic read-modify-write, so concurrent
/// selections always observe distinct pre-advance indices; two callers can
/// never pick the same cursor position.
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self {
            cursor: AtomicUsize::new(0),
        }
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionPolicy for RoundRobin {
    fn select(&self, pool: &ServerPool) -> Arc<Endpoint> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % pool.len();
        Arc::clone(&pool.endpoints()[index])
    }

    fn name(&self) -> &'static str {
        "round-robin"
    }
}

/// Picks the endpoint with the fewest in-flight connections.
///
/// Ties break to the first minimum in pool order so behavior is
/// reproducible.
pub struct LeastConnections;

impl SelectionPolicy for LeastConnections {
    fn select(&self, pool: &ServerPool) -> Arc<Endpoint> {
        let endpoint = pool
            .endpoints()
            .iter()
            .min_by_key(|e| e.in_flight())
            .expect("pool is non-empty by construction");
        Arc::clone(endpoint)
    }

    fn name(&self) -> &'static str {
        "least-connections"
    }
}

/// Picks a uniformly random endpoint.
pub struct Random;

impl SelectionPolicy for Random {
    fn select(&self, pool: &ServerPool) -> Arc<Endpoint> {
        let index = rand::thread_rng().gen_range(0..pool.len());
        Arc::clone(&pool.endpoints()[index])
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// The configured selection policy, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    RoundRobin,
    LeastConnections,
    Random,
}

/// Environment variable consulted when no explicit policy is configured.
pub const POLICY_ENV_VAR: &str = "LOAD_BALANCING_ALGORITHM";

impl PolicyKind {
    /// Resolves the policy from an optional explicit value, falling back to
    /// the `LOAD_BALANCING_ALGORITHM` environment variable and then to
    /// round-robin. Unrecognized values are recovered, not fatal.
    pub fn resolve(explicit: Option<&str>) -> Self {
        let value = explicit
            .map(str::to_string)
            .or_else(|| std::env::var(POLICY_ENV_VAR).ok());
        match value {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    "Unrecognized load balancing algorithm '{}', defaulting to ROUND_ROBIN",
                    raw
                );
                PolicyKind::RoundRobin
            }),
            None => PolicyKind::RoundRobin,
        }
    }

    pub fn build(self) -> Box<dyn SelectionPolicy> {
        match self {
            PolicyKind::RoundRobin => Box::new(RoundRobin::new()),
            PolicyKind::LeastConnections => Box::new(LeastConnections),
            PolicyKind::Random => Box::new(Random),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROUND_ROBIN" => Ok(PolicyKind::RoundRobin),
            "LEAST_CONNECTIONS" => Ok(PolicyKind::LeastConnections),
            "RANDOM" => Ok(PolicyKind::Random),
            _ => Err(()),
        }
    }
}
