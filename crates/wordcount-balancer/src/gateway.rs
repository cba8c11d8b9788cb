use std::net::SocketAddr;
use std::sync::Arc;

use futures::future::join_all;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use wordcount_common::protocol::error::{BalancerError, Result};
use wordcount_common::ClientCommand;

use crate::dispatcher::{DispatchResult, Dispatcher};
use crate::fleet::FleetOperations;

/// Client-facing TCP server speaking the line-oriented text protocol.
///
/// One request per line, one response line back. Requests on a single
/// connection are handled strictly in receipt order; separate connections
/// run concurrently, one spawned task each. A malformed request produces an
/// `Error: ...` reply and leaves the connection open.
pub struct Gateway {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    fleet: Arc<FleetOperations>,
}

impl Gateway {
    /// Binds the listening socket. Failure here is the only fatal startup
    /// condition.
    pub async fn bind(
        addr: &str,
        dispatcher: Arc<Dispatcher>,
        fleet: Arc<FleetOperations>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            BalancerError::Connection(format!("Failed to bind to {}: {}", addr, e))
        })?;
        Ok(Self {
            listener,
            dispatcher,
            fleet,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| BalancerError::Connection(format!("Failed to get local addr: {}", e)))
    }

    /// Accept loop. Runs until the process shuts down.
    pub async fn run(self) -> Result<()> {
        info!(
            "Gateway listening on {}",
            self.local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "<unknown>".to_string())
        );

        loop {
            let (stream, peer_addr) = self.listener.accept().await.map_err(|e| {
                BalancerError::Connection(format!("Failed to accept connection: {}", e))
            })?;
            debug!("Connection established from {}", peer_addr);

            let dispatcher = Arc::clone(&self.dispatcher);
            let fleet = Arc::clone(&self.fleet);
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, dispatcher, fleet).await {
                    error!("Connection error from {}: {}", peer_addr, e);
                }
            });
        }
    }
}

/// Serves one client connection until it closes.
async fn handle_connection(
    stream: TcpStream,
    dispatcher: Arc<Dispatcher>,
    fleet: Arc<FleetOperations>,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        let reply = handle_line(&line, &dispatcher, &fleet).await;
        send_line(&mut write_half, &reply).await?;
    }
    Ok(())
}

async fn send_line(write_half: &mut OwnedWriteHalf, reply: &str) -> Result<()> {
    write_half.write_all(reply.as_bytes()).await?;
    write_half.write_all(b"\n").await?;
    write_half.flush().await?;
    Ok(())
}

/// Parses one wire line and executes the command it carries.
///
/// Never fails: every outcome, including a parse error, becomes a response
/// string.
async fn handle_line(
    line: &str,
    dispatcher: &Dispatcher,
    fleet: &FleetOperations,
) -> String {
    let command = match ClientCommand::parse(line) {
        Ok(command) => command,
        Err(e) => return format!("Error: {}", e),
    };

    match command {
        ClientCommand::WordCount(pairs) => {
            // Pairs run concurrently; join_all preserves input order, so
            // response[i] answers request[i] regardless of completion order.
            let dispatches = pairs
                .iter()
                .map(|p| dispatcher.dispatch(&p.document_id, &p.keyword));
            let results = join_all(dispatches).await;
            results
                .iter()
                .map(render_dispatch)
                .collect::<Vec<_>>()
                .join(";")
        }
        ClientCommand::ClearCache => {
            let report = fleet.clear_cache().await;
            if report.all_ok() {
                "Cache cleared".to_string()
            } else {
                format!(
                    "Error: failed to clear cache on {}",
                    report
                        .failed_endpoints()
                        .iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
        ClientCommand::HealthCheck => {
            let report = fleet.probe_health().await;
            report
                .statuses
                .iter()
                .map(|(id, result)| match result {
                    Ok(status) => format!("{}|{}", id, status),
                    Err(e) => format!("{}|Error: {}", id, e),
                })
                .collect::<Vec<_>>()
                .join(",")
        }
    }
}

fn render_dispatch(result: &DispatchResult) -> String {
    match &result.outcome {
        Ok(count) => format!("{},{},{:.3}", count, result.endpoint, result.latency_ms),
        Err(e) => format!("Error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use wordcount_common::protocol::error::BalancerError;
    use wordcount_common::EndpointId;

    use crate::backend::WorkerClient;
    use crate::policy::RoundRobin;
    use crate::pool::ServerPool;

    struct StubClient {
        fail_port: Option<u16>,
    }

    #[async_trait]
    impl WorkerClient for StubClient {
        async fn word_count(
            &self,
            endpoint: &EndpointId,
            document_id: &str,
            _keyword: &str,
        ) -> wordcount_common::Result<u64> {
            if Some(endpoint.port) == self.fail_port {
                return Err(BalancerError::Connection(format!(
                    "Failed to connect to {}",
                    endpoint
                )));
            }
            // Count derived from the document name so batch ordering is
            // observable in responses.
            Ok(document_id.len() as u64)
        }

        async fn clear_cache(&self, endpoint: &EndpointId) -> wordcount_common::Result<()> {
            if Some(endpoint.port) == self.fail_port {
                return Err(BalancerError::Connection(format!(
                    "Failed to connect to {}",
                    endpoint
                )));
            }
            Ok(())
        }

        async fn health_check(&self, endpoint: &EndpointId) -> wordcount_common::Result<String> {
            if Some(endpoint.port) == self.fail_port {
                return Err(BalancerError::Connection(format!(
                    "Failed to connect to {}",
                    endpoint
                )));
            }
            Ok("Healthy".to_string())
        }
    }

    fn fixtures(fail_port: Option<u16>) -> (Dispatcher, FleetOperations) {
        let pool = Arc::new(
            ServerPool::new(vec![
                EndpointId::new("worker", 18812),
                EndpointId::new("worker", 18813),
                EndpointId::new("worker", 18814),
            ])
            .unwrap(),
        );
        let client = Arc::new(StubClient { fail_port });
        let dispatcher = Dispatcher::new(
            Arc::clone(&pool),
            Box::new(RoundRobin::new()),
            client.clone(),
        );
        let fleet = FleetOperations::new(pool, client);
        (dispatcher, fleet)
    }

    #[tokio::test]
    async fn test_single_request_reply_shape() {
        let (dispatcher, fleet) = fixtures(None);
        let reply = handle_line("report.txt,alpha", &dispatcher, &fleet).await;

        let fields: Vec<&str> = reply.split(',').collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], "10"); // len("report.txt")
        assert_eq!(fields[1], "worker:18812");
        assert!(fields[2].parse::<f64>().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn test_batch_reply_order_matches_request_order() {
        let (dispatcher, fleet) = fixtures(None);
        let reply = handle_line("a.txt,x;bb.txt,y", &dispatcher, &fleet).await;

        let parts: Vec<&str> = reply.split(';').collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("5,")); // len("a.txt")
        assert!(parts[1].starts_with("6,")); // len("bb.txt")
    }

    #[tokio::test]
    async fn test_batch_with_failing_endpoint_mixes_results() {
        // Round-robin sends the second pair to the failing endpoint; the
        // first still succeeds.
        let (dispatcher, fleet) = fixtures(Some(18813));
        let reply = handle_line("a.txt,x;b.txt,y", &dispatcher, &fleet).await;

        let parts: Vec<&str> = reply.split(';').collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("5,"));
        assert!(parts[1].starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_malformed_request_is_error_reply() {
        let (dispatcher, fleet) = fixtures(None);
        let reply = handle_line("nocomma", &dispatcher, &fleet).await;
        assert!(reply.starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_clear_cache_replies() {
        let (dispatcher, fleet) = fixtures(None);
        assert_eq!(
            handle_line("clear_cache", &dispatcher, &fleet).await,
            "Cache cleared"
        );

        let (dispatcher, fleet) = fixtures(Some(18814));
        let reply = handle_line("clear_cache", &dispatcher, &fleet).await;
        assert_eq!(
            reply,
            "Error: failed to clear cache on worker:18814"
        );
    }

    #[tokio::test]
    async fn test_health_check_reply_shape() {
        let (dispatcher, fleet) = fixtures(Some(18813));
        let reply = handle_line("health_check", &dispatcher, &fleet).await;

        let entries: Vec<&str> = reply.split(',').collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], "worker:18812|Healthy");
        assert!(entries[1].starts_with("worker:18813|Error: "));
        assert_eq!(entries[2], "worker:18814|Healthy");
    }
}
