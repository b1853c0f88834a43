use std::borrow::Cow;
use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Tuning for the production resolver and SMTP sender built by
/// [`MxClient::with_options`](crate::MxClient::with_options).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOptions {
    pub helo_domain: Option<String>,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    /// Fail a candidate that does not offer STARTTLS.
    pub require_tls: bool,
    pub verify_certificates: bool,
    pub ipv6: bool,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            helo_domain: None,
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(30),
            require_tls: false,
            verify_certificates: false,
            ipv6: true,
        }
    }
}

impl DeliveryOptions {
    /// Name announced in `EHLO`; `localhost` unless configured.
    pub fn helo_domain(&self) -> Cow<'_, str> {
        self.helo_domain
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(Cow::Borrowed)
            .unwrap_or(Cow::Borrowed("localhost"))
    }
}
