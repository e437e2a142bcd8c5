//! Upstream endpoint value type.
//!
//! # Responsibilities
//! - Represent a single upstream TCP address (host + port)
//! - Provide the normalized string identity used as a map key everywhere
//! - Parse `tcp://host:port` strings from config and the admin surface

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use url::Url;

/// Error produced when parsing an endpoint string.
#[derive(Debug, thiserror::Error)]
pub enum EndpointParseError {
    #[error("not a valid URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    #[error("scheme must be tcp://, got {0:?}")]
    WrongScheme(String),

    #[error("host is missing")]
    MissingHost,

    #[error("port is missing or zero")]
    MissingPort,
}

/// An upstream TCP address eligible to receive forwarded traffic.
///
/// Identity is the normalized `tcp://<lowercased-host>:<port>` form: two
/// addresses that normalize identically are the same endpoint. Immutable
/// once created.
#[derive(Debug, Clone)]
pub struct Endpoint {
    host: String,
    port: u16,
    key: String,
}

impl Endpoint {
    /// Create an endpoint from a host and port, normalizing the host.
    pub fn new(host: &str, port: u16) -> Self {
        let host = host.to_ascii_lowercase();
        let key = format!("tcp://{}:{}", host, port);
        Self { host, port, key }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The normalized string form, used as the registry/queue/metrics key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `host:port` form accepted by `TcpStream::connect`.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s)?;

        if url.scheme() != "tcp" {
            return Err(EndpointParseError::WrongScheme(url.scheme().to_string()));
        }

        let host = url.host_str().ok_or(EndpointParseError::MissingHost)?;
        let port = url.port().ok_or(EndpointParseError::MissingPort)?;
        if port == 0 {
            return Err(EndpointParseError::MissingPort);
        }

        Ok(Endpoint::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Endpoint {}

impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for Endpoint {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Endpoint {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}
