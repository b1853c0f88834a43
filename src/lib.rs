#![forbid(unsafe_code)]
//! mxdeliver — RFC 5321 MX resolution and delivery failover.
//!
//! ```no_run
//! # #[cfg(all(feature = "with-dns", feature = "with-smtp"))]
//! # fn main() -> Result<(), mxdeliver::DeliveryError> {
//! use mxdeliver::{Destination, MxClient};
//!
//! let client = MxClient::new(Destination::new("example.org"))?;
//! let to = vec!["rcpt@example.org".to_string()];
//! let delivered = client.deliver("sender@example.net", &to, b"Subject: hi\r\n\r\nhello\r\n")?;
//! println!("accepted by {} ({})", delivered.exchange, delivered.address);
//! # Ok(())
//! # }
//! # #[cfg(not(all(feature = "with-dns", feature = "with-smtp")))]
//! # fn main() {}
//! ```

pub mod delivery;
pub mod mxlist;
pub mod resolver;
pub mod sender;

pub use delivery::{Delivered, DeliveryError, DeliveryOptions, Destination, FailedAttempt, MxClient};
pub use mxlist::{KeepOrder, MxList, MxRecord, Permutation, RandomPermutation};
pub use resolver::Resolve;
pub use sender::{Credentials, SendMail};

#[cfg(all(feature = "with-dns", feature = "with-smtp"))]
pub use delivery::send_mail_via;
#[cfg(feature = "with-dns")]
pub use resolver::DnsResolver;
#[cfg(feature = "with-smtp")]
pub use sender::{SmtpError, SmtpSender, SmtpStage};
