use thiserror::Error;

use super::types::FailedAttempt;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The three ways a delivery ends other than success, plus set-up failures.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Resolution stage: nothing left of the domain after trimming.
    #[error("domain is empty")]
    EmptyDomain,
    /// Resolution stage: the domain has no ASCII form.
    #[error("domain IDNA conversion failed")]
    IdnaConversion {
        #[source]
        source: idna::Errors,
    },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[cfg(feature = "with-smtp")]
    #[error("SMTP sender initialization failed: {source}")]
    SenderInit {
        #[source]
        source: native_tls::Error,
    },
    /// MX lookup failed for a reason other than "no such host".
    #[error("MX lookup for {domain} failed: {source}")]
    Lookup {
        domain: String,
        #[source]
        source: BoxError,
    },
    /// Every host and address was tried without success.
    #[error("no alternative found")]
    NoAlternative { failures: Vec<FailedAttempt> },
}

impl DeliveryError {
    pub(crate) fn idna(source: idna::Errors) -> Self {
        Self::IdnaConversion { source }
    }

    #[cfg(feature = "with-dns")]
    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    #[cfg(feature = "with-smtp")]
    pub(crate) fn sender_init(source: native_tls::Error) -> Self {
        Self::SenderInit { source }
    }

    pub(crate) fn lookup<E>(domain: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Lookup {
            domain: domain.into(),
            source: Box::new(source),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::NoAlternative { .. })
    }

    /// Per-candidate causes collected before giving up; empty for other variants.
    pub fn failures(&self) -> &[FailedAttempt] {
        match self {
            Self::NoAlternative { failures } => failures,
            _ => &[],
        }
    }
}
