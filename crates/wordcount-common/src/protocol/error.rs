use thiserror::Error;

/// Error taxonomy for the dispatcher.
///
/// Backend-facing failures (`Connection`, `WorkerCall`, `Timeout`) are
/// captured at the call boundary and travel as data inside dispatch and
/// fleet results; they never abort sibling work or the accept loop.
#[derive(Error, Debug)]
pub enum BalancerError {
    /// Malformed client message. Reported to that client only; the
    /// connection stays open.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Could not reach a worker endpoint.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Worker was reached but returned an application error (e.g. unknown
    /// document). The message is passed through to the client verbatim.
    #[error("{0}")]
    WorkerCall(String),

    /// Worker call exceeded the configured deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Worker replied with something the dispatcher cannot interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// An endpoint identity not present in the pool was referenced.
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// Invalid startup configuration (bad endpoint string, empty pool).
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BalancerError>;
