//! DNS collaborator used by the delivery loop.
//!
//! The loop only needs three things from DNS: MX records for a domain, the
//! addresses of a host, and a way to tell "this name does not exist" apart
//! from every other failure. [`Resolve`] captures exactly that, so tests can
//! hand in canned answers and production code can use [`DnsResolver`].

#[cfg(feature = "with-dns")]
mod dns;

#[cfg(feature = "with-dns")]
pub use dns::DnsResolver;

use std::net::IpAddr;

use crate::delivery::DeliveryError;
use crate::mxlist::MxRecord;

pub trait Resolve {
    type Error: std::error::Error + Send + Sync + 'static;

    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Self::Error>;

    fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, Self::Error>;

    /// Returns the queried name when `err` means the name does not exist.
    fn no_such_host(&self, err: &Self::Error) -> Option<String>;
}

impl<R: Resolve + ?Sized> Resolve for &R {
    type Error = R::Error;

    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Self::Error> {
        (**self).lookup_mx(domain)
    }

    fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, Self::Error> {
        (**self).lookup_ip(host)
    }

    fn no_such_host(&self, err: &Self::Error) -> Option<String> {
        (**self).no_such_host(err)
    }
}

/// Trim and IDNA-encode `domain`, dropping any trailing root dot.
pub(crate) fn normalize_domain(domain: &str) -> Result<String, DeliveryError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(DeliveryError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(DeliveryError::idna)
}

#[cfg_attr(not(feature = "with-dns"), allow(dead_code))]
pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests;
