//! Load-balancing dispatcher for a pool of word-count workers.
//!
//! The dispatcher sits between clients and a fixed pool of stateless
//! word-count workers. It distributes per-request work across the pool and
//! aggregates fleet-wide operations (cache invalidation, health probing).
//!
//! # Components
//!
//! - [`pool`]: endpoint identities and per-endpoint live state
//! - [`policy`]: pluggable selection strategies (round-robin,
//!   least-connections, random)
//! - [`backend`]: the RPC client for one call to one worker
//! - [`dispatcher`]: one request's lifecycle (select, count, call, time)
//! - [`fleet`]: concurrent fan-out of administrative calls with
//!   per-endpoint failure isolation
//! - [`health`]: background health probing on a fixed interval
//! - [`gateway`]: the client-facing TCP text server
//!
//! Health state is advisory: it is collected and reported, but selection
//! policies never consult it. Routing around unhealthy workers is a known
//! gap carried over from the system this replaces.

pub mod backend;
pub mod dispatcher;
pub mod fleet;
pub mod gateway;
pub mod health;
pub mod policy;
pub mod pool;

pub use backend::{TcpWorkerClient, WorkerClient};
pub use dispatcher::{DispatchResult, Dispatcher};
pub use fleet::{CacheClearReport, FleetOperations, HealthReport};
pub use gateway::Gateway;
pub use health::{HealthMonitor, HealthMonitorConfig};
pub use policy::{LeastConnections, PolicyKind, Random, RoundRobin, SelectionPolicy};
pub use pool::{ConnectionGuard, Endpoint, HealthState, ServerPool};
