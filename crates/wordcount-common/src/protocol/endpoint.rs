use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::BalancerError;

/// Identity of one word-count worker instance.
///
/// Rendered as `host:port` on the client wire (dispatch results and health
/// reports) and parsed from the same form in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointId {
    pub host: String,
    pub port: u16,
}

impl EndpointId {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Address form usable for connecting, identical to the display form.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for EndpointId {
    type Err = BalancerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s.rsplit_once(':').ok_or_else(|| {
            BalancerError::Configuration(format!(
                "Invalid endpoint '{}': expected host:port",
                s
            ))
        })?;
        if host.is_empty() {
            return Err(BalancerError::Configuration(format!(
                "Invalid endpoint '{}': empty host",
                s
            )));
        }
        let port = port.parse::<u16>().map_err(|e| {
            BalancerError::Configuration(format!("Invalid port in '{}': {}", s, e))
        })?;
        Ok(Self::new(host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display_round_trip() {
        let id = EndpointId::new("wordcount_server_2", 18813);
        assert_eq!(id.to_string(), "wordcount_server_2:18813");
        assert_eq!("wordcount_server_2:18813".parse::<EndpointId>().unwrap(), id);
    }

    #[test]
    fn test_endpoint_parse_missing_port() {
        assert!("wordcount_server_1".parse::<EndpointId>().is_err());
    }

    #[test]
    fn test_endpoint_parse_bad_port() {
        assert!("host:notaport".parse::<EndpointId>().is_err());
        assert!("host:99999".parse::<EndpointId>().is_err());
    }

    #[test]
    fn test_endpoint_parse_empty_host() {
        assert!(":18812".parse::<EndpointId>().is_err());
    }
}
