use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub type RequestId = u64;
pub type MethodName = String;
pub type RpcArgs = serde_json::Value;

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One RPC request to a word-count worker.
///
/// The worker contract exposes three methods:
///
/// - `word_count` with `{"document_id": ..., "keyword": ...}` args,
///   returning an integer count
/// - `clear_cache` with empty args, idempotent
/// - `health_check` with empty args, idempotent and side-effect free,
///   returning a status string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub id: RequestId,
    pub method: MethodName,
    pub args: RpcArgs,
}

impl Request {
    pub fn new(method: impl Into<String>, args: RpcArgs) -> Self {
        Request {
            id: REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            method: method.into(),
            args,
        }
    }

    /// A `word_count` request for one document/keyword pair.
    pub fn word_count(document_id: &str, keyword: &str) -> Self {
        Self::new(
            "word_count",
            serde_json::json!({
                "document_id": document_id,
                "keyword": keyword,
            }),
        )
    }

    pub fn clear_cache() -> Self {
        Self::new("clear_cache", serde_json::json!({}))
    }

    pub fn health_check() -> Self {
        Self::new("health_check", serde_json::json!({}))
    }
}
