use std::fmt;
use std::net::SocketAddr;

use crate::sender::Credentials;

/// Where mail is routed: the destination domain, the SMTP port used for every
/// resolved address, and optional `AUTH` credentials.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub domain: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
}

impl Destination {
    pub const SMTP_PORT: u16 = 25;

    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            port: Self::SMTP_PORT,
            credentials: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Successful delivery: the exchange and address that accepted the message.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub exchange: String,
    pub address: SocketAddr,
    /// Send attempts made, the successful one included.
    pub attempts: usize,
}

/// A candidate the failover loop gave up on.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    pub exchange: String,
    /// `None` when the exchange itself could not be resolved.
    pub address: Option<SocketAddr>,
    pub reason: String,
}

impl FailedAttempt {
    pub(crate) fn unresolved(exchange: &str, reason: &dyn fmt::Display) -> Self {
        Self {
            exchange: exchange.to_string(),
            address: None,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn send(exchange: &str, address: SocketAddr, reason: &dyn fmt::Display) -> Self {
        Self {
            exchange: exchange.to_string(),
            address: Some(address),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for FailedAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            Some(address) => write!(f, "{} ({address}): {}", self.exchange, self.reason),
            None => write!(f, "{}: {}", self.exchange, self.reason),
        }
    }
}
