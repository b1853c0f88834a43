//! SMTP collaborator used by the delivery loop.
//!
//! [`SendMail`] hands one message to one socket address. The loop never looks
//! inside the error: any failure simply moves it on to the next candidate.

#[cfg(feature = "with-smtp")]
mod error;
#[cfg(feature = "with-smtp")]
mod smtp;
#[cfg(feature = "with-smtp")]
mod stream;

#[cfg(feature = "with-smtp")]
pub use error::{SmtpError, SmtpStage};
#[cfg(feature = "with-smtp")]
pub use smtp::SmtpSender;

use std::fmt;
use std::net::SocketAddr;

pub trait SendMail {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send_mail(
        &self,
        target: SocketAddr,
        credentials: Option<&Credentials>,
        from: &str,
        to: &[String],
        message: &[u8],
    ) -> Result<(), Self::Error>;
}

impl<S: SendMail + ?Sized> SendMail for &S {
    type Error = S::Error;

    fn send_mail(
        &self,
        target: SocketAddr,
        credentials: Option<&Credentials>,
        from: &str,
        to: &[String],
        message: &[u8],
    ) -> Result<(), Self::Error> {
        (**self).send_mail(target, credentials, from, to, message)
    }
}

/// Username and password for `AUTH PLAIN`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(all(test, feature = "with-smtp"))]
mod tests;
