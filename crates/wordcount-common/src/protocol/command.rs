use super::error::{BalancerError, Result};

/// One document/keyword lookup requested by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPair {
    pub document_id: String,
    pub keyword: String,
}

/// A parsed client message.
///
/// The gateway parses every received line into one of these variants before
/// anything else touches it; raw request strings do not travel past the
/// gateway boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// One or more word-count lookups. A single request is a batch of one;
    /// batches are `;`-joined pairs, each pair `,`-joined.
    WordCount(Vec<QueryPair>),
    /// Clear every worker's cache.
    ClearCache,
    /// Probe every worker's health.
    HealthCheck,
}

impl ClientCommand {
    /// Parses one wire line.
    ///
    /// Grammar:
    ///
    /// ```text
    /// "clear_cache"
    /// "health_check"
    /// "<document-id>,<keyword>" [";" "<document-id>,<keyword>" ...]
    /// ```
    ///
    /// Any malformed pair fails the whole message with a `Protocol` error.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        match line {
            "" => Err(BalancerError::Protocol("empty request".to_string())),
            "clear_cache" => Ok(ClientCommand::ClearCache),
            "health_check" => Ok(ClientCommand::HealthCheck),
            _ => {
                let pairs = line
                    .split(';')
                    .map(Self::parse_pair)
                    .collect::<Result<Vec<_>>>()?;
                Ok(ClientCommand::WordCount(pairs))
            }
        }
    }

    fn parse_pair(raw: &str) -> Result<QueryPair> {
        let fields: Vec<&str> = raw.split(',').collect();
        if fields.len() != 2 {
            return Err(BalancerError::Protocol(format!(
                "expected '<document-id>,<keyword>', got '{}'",
                raw
            )));
        }
        let document_id = fields[0].trim();
        let keyword = fields[1].trim();
        if document_id.is_empty() || keyword.is_empty() {
            return Err(BalancerError::Protocol(format!(
                "empty document-id or keyword in '{}'",
                raw
            )));
        }
        Ok(QueryPair {
            document_id: document_id.to_string(),
            keyword: keyword.to_string(),
        })
    }
}
