use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use wordcount_common::protocol::error::{BalancerError, Result};
use wordcount_common::transport::TcpTransport;
use wordcount_common::{EndpointId, Request, Response};

/// Default per-call deadline for worker RPC.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// One RPC call to one worker endpoint.
///
/// This is the only seam that touches the external worker contract. There
/// are no retries here; a single failure surfaces to the caller as data.
/// Tests inject stub implementations through this trait.
#[async_trait]
pub trait WorkerClient: Send + Sync {
    /// `word_count(document-id, keyword) -> count`. Fails with a
    /// worker-defined error for an unknown document.
    async fn word_count(
        &self,
        endpoint: &EndpointId,
        document_id: &str,
        keyword: &str,
    ) -> Result<u64>;

    /// `clear_cache()`. Idempotent.
    async fn clear_cache(&self, endpoint: &EndpointId) -> Result<()>;

    /// `health_check() -> status string`. Idempotent, side-effect free.
    async fn health_check(&self, endpoint: &EndpointId) -> Result<String>;
}

/// Production worker client speaking length-prefixed JSON over TCP.
///
/// Each call opens a fresh connection, so concurrent dispatches to the same
/// worker proceed in parallel and a slow worker never stalls unrelated
/// requests. The whole exchange (connect, send, receive) runs under one
/// deadline.
pub struct TcpWorkerClient {
    timeout: Duration,
}

impl TcpWorkerClient {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn call(&self, endpoint: &EndpointId, request: Request) -> Result<Value> {
        let exchange = async {
            let mut stream = TcpTransport::connect(&endpoint.addr()).await?;
            TcpTransport::send_request(&mut stream, &request).await
        };

        let response: Response = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| BalancerError::Timeout(self.timeout.as_millis() as u64))??;

        if !response.success {
            // Worker-level errors pass through verbatim.
            return Err(BalancerError::WorkerCall(
                response
                    .error
                    .unwrap_or_else(|| "worker returned an unspecified error".to_string()),
            ));
        }

        response.result.ok_or_else(|| {
            BalancerError::InvalidResponse("response missing result".to_string())
        })
    }
}

impl Default for TcpWorkerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkerClient for TcpWorkerClient {
    async fn word_count(
        &self,
        endpoint: &EndpointId,
        document_id: &str,
        keyword: &str,
    ) -> Result<u64> {
        let result = self
            .call(endpoint, Request::word_count(document_id, keyword))
            .await?;
        result.as_u64().ok_or_else(|| {
            BalancerError::InvalidResponse(format!(
                "expected a non-negative integer count, got {}",
                result
            ))
        })
    }

    async fn clear_cache(&self, endpoint: &EndpointId) -> Result<()> {
        self.call(endpoint, Request::clear_cache()).await?;
        Ok(())
    }

    async fn health_check(&self, endpoint: &EndpointId) -> Result<String> {
        let result = self.call(endpoint, Request::health_check()).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                BalancerError::InvalidResponse(format!(
                    "expected a status string, got {}",
                    result
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::net::TcpListener;
    use wordcount_common::transport::JsonCodec;

    /// One-shot stub worker that answers a single request with a canned
    /// response built from the incoming request id.
    async fn spawn_stub_worker(
        respond: impl Fn(Request) -> Response + Send + 'static,
    ) -> EndpointId {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let data = TcpTransport::receive_message(&mut stream).await.unwrap();
            let request = JsonCodec::decode_request(&data).unwrap();
            let response = respond(request);
            let encoded = JsonCodec::encode_response(&response).unwrap();
            TcpTransport::send_message(&mut stream, &encoded)
                .await
                .unwrap();
        });
        EndpointId::new("127.0.0.1", addr.port())
    }

    #[tokio::test]
    async fn test_word_count_success() {
        let endpoint =
            spawn_stub_worker(|req| Response::success(req.id, json!(7))).await;
        let client = TcpWorkerClient::new();
        let count = client
            .word_count(&endpoint, "report.txt", "alpha")
            .await
            .unwrap();
        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn test_word_count_worker_error_passes_through() {
        let endpoint = spawn_stub_worker(|req| {
            Response::error(req.id, "document not found: missing.txt")
        })
        .await;
        let client = TcpWorkerClient::new();
        let err = client
            .word_count(&endpoint, "missing.txt", "alpha")
            .await
            .unwrap_err();
        match err {
            BalancerError::WorkerCall(msg) => {
                assert_eq!(msg, "document not found: missing.txt")
            }
            other => panic!("expected WorkerCall, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_word_count_non_numeric_result_rejected() {
        let endpoint =
            spawn_stub_worker(|req| Response::success(req.id, json!("seven"))).await;
        let client = TcpWorkerClient::new();
        let err = client
            .word_count(&endpoint, "report.txt", "alpha")
            .await
            .unwrap_err();
        assert!(matches!(err, BalancerError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_health_check_returns_status_string() {
        let endpoint =
            spawn_stub_worker(|req| Response::success(req.id, json!("Healthy"))).await;
        let client = TcpWorkerClient::new();
        let status = client.health_check(&endpoint).await.unwrap();
        assert_eq!(status, "Healthy");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        let client = TcpWorkerClient::new();
        let endpoint = EndpointId::new("127.0.0.1", 1);
        let err = client.clear_cache(&endpoint).await.unwrap_err();
        assert!(matches!(err, BalancerError::Connection(_)));
    }

    #[tokio::test]
    async fn test_slow_worker_times_out() {
        // Listener that accepts but never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let client = TcpWorkerClient::with_timeout(Duration::from_millis(50));
        let endpoint = EndpointId::new("127.0.0.1", addr.port());
        let err = client.health_check(&endpoint).await.unwrap_err();
        assert!(matches!(err, BalancerError::Timeout(50)));
    }
}
