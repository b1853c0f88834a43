//! MX resolution and delivery failover.
//!
//! [`MxClient::deliver`] resolves the destination's MX records (falling back
//! to the implicit MX when the name does not exist), permutes each preference
//! tier once, then walks tiers in ascending preference, hosts in tier order
//! and addresses in resolver order. The first accepted send wins; any lookup
//! or send failure for a candidate moves on to the next one.

mod error;
mod options;
mod types;

pub use error::DeliveryError;
pub use options::DeliveryOptions;
pub use types::{Delivered, Destination, FailedAttempt};

use std::net::{IpAddr, SocketAddr};

use tracing::{debug, info, warn};

use crate::mxlist::{MxList, Permutation, RandomPermutation};
use crate::resolver::{Resolve, normalize_domain};
use crate::sender::SendMail;

#[cfg(all(feature = "with-dns", feature = "with-smtp"))]
use crate::{resolver::DnsResolver, sender::Credentials, sender::SmtpSender};

pub struct MxClient<R, S> {
    resolver: R,
    sender: S,
    destination: Destination,
}

#[cfg(all(feature = "with-dns", feature = "with-smtp"))]
impl MxClient<DnsResolver, SmtpSender> {
    /// Client using the system resolver and the blocking SMTP sender.
    pub fn new(destination: Destination) -> Result<Self, DeliveryError> {
        Self::with_options(destination, &DeliveryOptions::default())
    }

    pub fn with_options(
        destination: Destination,
        options: &DeliveryOptions,
    ) -> Result<Self, DeliveryError> {
        let resolver = DnsResolver::from_system_conf()?.with_ipv6(options.ipv6);
        let sender = SmtpSender::new(options)?;
        Ok(Self::with_resolver_and_sender(resolver, sender, destination))
    }
}

impl<R, S> MxClient<R, S> {
    pub fn with_resolver_and_sender(resolver: R, sender: S, destination: Destination) -> Self {
        Self {
            resolver,
            sender,
            destination,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }
}

impl<R: Resolve, S: SendMail> MxClient<R, S> {
    /// MX records of `domain` grouped by preference.
    ///
    /// A "no such host" answer, or an empty record set, becomes the implicit
    /// MX (RFC 5321 §5.1). Every other resolver error is returned as
    /// [`DeliveryError::Lookup`]. An empty or non-IDNA `domain` is rejected
    /// before the resolver is asked.
    pub fn lookup_mx(&self, domain: &str) -> Result<MxList, DeliveryError> {
        let ascii = normalize_domain(domain)?;
        match self.resolver.lookup_mx(&ascii) {
            Ok(records) if records.is_empty() => {
                debug!(domain = %ascii, "no MX records, using implicit MX");
                Ok(MxList::implicit(ascii))
            }
            Ok(records) => Ok(MxList::from_records(records)),
            Err(err) => match self.resolver.no_such_host(&err) {
                Some(name) => {
                    debug!(domain = %ascii, %name, "no such host, using implicit MX");
                    Ok(MxList::implicit(name))
                }
                None => Err(DeliveryError::lookup(ascii, err)),
            },
        }
    }

    pub fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, R::Error> {
        self.resolver.lookup_ip(host)
    }

    /// Deliver `message` with tiers shuffled by a fresh entropy-seeded generator.
    ///
    /// Besides [`DeliveryError::Lookup`] and [`DeliveryError::NoAlternative`],
    /// resolution can fail with [`DeliveryError::EmptyDomain`] or
    /// [`DeliveryError::IdnaConversion`] when the destination domain is not a
    /// usable name. Both are raised before any lookup or send.
    pub fn deliver(
        &self,
        from: &str,
        to: &[String],
        message: &[u8],
    ) -> Result<Delivered, DeliveryError> {
        self.deliver_with(&mut RandomPermutation::from_entropy(), from, to, message)
    }

    /// Same as [`deliver`](Self::deliver) with an explicit tier permutation.
    pub fn deliver_with<P>(
        &self,
        permutation: &mut P,
        from: &str,
        to: &[String],
        message: &[u8],
    ) -> Result<Delivered, DeliveryError>
    where
        P: Permutation + ?Sized,
    {
        let mut list = self.lookup_mx(&self.destination.domain)?;
        list.shuffle_with(permutation);

        let credentials = self.destination.credentials.as_ref();
        let mut failures = Vec::new();
        let mut attempts = 0usize;

        for (preference, tier) in list.tiers() {
            debug!(preference, hosts = tier.len(), "trying MX tier");
            for record in tier {
                let addresses = match self.lookup_ip(&record.exchange) {
                    Ok(addresses) => addresses,
                    Err(err) => {
                        warn!(exchange = %record.exchange, error = %err, "address lookup failed");
                        failures.push(FailedAttempt::unresolved(&record.exchange, &err));
                        continue;
                    }
                };

                for ip in addresses {
                    let target = SocketAddr::new(ip, self.destination.port);
                    attempts += 1;
                    match self.sender.send_mail(target, credentials, from, to, message) {
                        Ok(()) => {
                            info!(
                                exchange = %record.exchange,
                                %target,
                                attempts,
                                "message delivered"
                            );
                            return Ok(Delivered {
                                exchange: record.exchange.clone(),
                                address: target,
                                attempts,
                            });
                        }
                        Err(err) => {
                            warn!(
                                exchange = %record.exchange,
                                %target,
                                error = %err,
                                "delivery attempt failed"
                            );
                            failures.push(FailedAttempt::send(&record.exchange, target, &err));
                        }
                    }
                }
            }
        }

        Err(DeliveryError::NoAlternative { failures })
    }
}

/// One-shot delivery through the system resolver and the SMTP sender.
#[cfg(all(feature = "with-dns", feature = "with-smtp"))]
pub fn send_mail_via(
    domain: &str,
    port: u16,
    credentials: Option<Credentials>,
    from: &str,
    to: &[String],
    message: &[u8],
) -> Result<Delivered, DeliveryError> {
    let mut destination = Destination::new(domain).with_port(port);
    destination.credentials = credentials;
    MxClient::new(destination)?.deliver(from, to, message)
}
