use std::net::IpAddr;

use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
};

use super::{Resolve, normalize_exchange};
use crate::delivery::DeliveryError;
use crate::mxlist::MxRecord;

/// [`Resolve`] backed by the system resolver configuration.
pub struct DnsResolver {
    inner: Resolver,
    ipv6: bool,
}

impl DnsResolver {
    pub fn from_system_conf() -> Result<Self, DeliveryError> {
        let inner = Resolver::from_system_conf().map_err(DeliveryError::resolver_init)?;
        Ok(Self::from_resolver(inner))
    }

    pub fn from_resolver(inner: Resolver) -> Self {
        Self { inner, ipv6: true }
    }

    /// When disabled, AAAA answers are dropped from address lookups.
    pub fn with_ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = ipv6;
        self
    }
}

impl Resolve for DnsResolver {
    type Error = ResolveError;

    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        // absolute name, so search domains never leak into the NXDOMAIN query
        let lookup = self.inner.mx_lookup(absolute(domain).as_str())?;
        let records = lookup
            .iter()
            .map(|mx| {
                MxRecord::new(
                    mx.preference(),
                    normalize_exchange(&mx.exchange().to_utf8()),
                )
            })
            .collect();
        Ok(records)
    }

    fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        let lookup = self.inner.lookup_ip(absolute(host).as_str())?;
        Ok(lookup.iter().filter(|ip| self.ipv6 || ip.is_ipv4()).collect())
    }

    fn no_such_host(&self, err: &ResolveError) -> Option<String> {
        not_found_name(err)
    }
}

/// Fully qualified form of `host`. IP literals are returned unchanged.
fn absolute(host: &str) -> String {
    if host.parse::<IpAddr>().is_ok() {
        return host.to_string();
    }
    format!("{}.", host.trim_end_matches('.'))
}

/// Queried name of an NXDOMAIN or NODATA answer.
///
/// trust-dns also reports SERVFAIL, REFUSED and similar server failures as
/// `NoRecordsFound`; those stay errors.
fn not_found_name(err: &ResolveError) -> Option<String> {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound {
            query,
            response_code: ResponseCode::NXDomain | ResponseCode::NoError,
            ..
        } => Some(normalize_exchange(&query.name().to_utf8())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use trust_dns_resolver::{
        Name,
        config::{ResolverConfig, ResolverOpts},
        proto::{op::Query, rr::RecordType},
    };

    use super::*;

    fn resolver() -> DnsResolver {
        let inner = Resolver::new(ResolverConfig::default(), ResolverOpts::default())
            .expect("resolver without network access");
        DnsResolver::from_resolver(inner)
    }

    fn no_records(response_code: ResponseCode, trusted: bool) -> ResolveError {
        let name = Name::from_ascii("Example.ORG.").expect("valid name");
        ResolveError::from(ResolveErrorKind::NoRecordsFound {
            query: Box::new(Query::query(name, RecordType::MX)),
            soa: None,
            negative_ttl: None,
            response_code,
            trusted,
        })
    }

    #[test]
    fn nxdomain_names_the_queried_domain() {
        let err = no_records(ResponseCode::NXDomain, true);
        assert_eq!(resolver().no_such_host(&err).as_deref(), Some("example.org"));
    }

    #[test]
    fn nodata_names_the_queried_domain() {
        let err = no_records(ResponseCode::NoError, true);
        assert_eq!(resolver().no_such_host(&err).as_deref(), Some("example.org"));
    }

    #[test]
    fn server_failures_are_not_missing_hosts() {
        let resolver = resolver();
        for code in [
            ResponseCode::ServFail,
            ResponseCode::Refused,
            ResponseCode::FormErr,
            ResponseCode::NotImp,
        ] {
            let err = no_records(code, false);
            assert_eq!(resolver.no_such_host(&err), None, "{code:?}");
        }
    }

    #[test]
    fn transport_errors_are_not_missing_hosts() {
        let resolver = resolver();
        let timeout = ResolveError::from(ResolveErrorKind::Timeout);
        let io = ResolveError::from(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(resolver.no_such_host(&timeout), None);
        assert_eq!(resolver.no_such_host(&io), None);
    }

    #[test]
    fn lookup_names_are_absolute() {
        assert_eq!(absolute("mx1.example.org"), "mx1.example.org.");
        assert_eq!(absolute("mx1.example.org."), "mx1.example.org.");
        assert_eq!(absolute("mx1"), "mx1.");
        assert_eq!(absolute("192.0.2.7"), "192.0.2.7");
        assert_eq!(absolute("2001:db8::1"), "2001:db8::1");
    }
}
