use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;

/// Point of the SMTP dialogue at which a reply was rejected.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpStage {
    Greeting,
    Ehlo,
    StartTls,
    Auth,
    MailFrom,
    RcptTo,
    Data,
}

impl fmt::Display for SmtpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Greeting => "greeting",
            Self::Ehlo => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::Auth => "AUTH",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Data => "DATA",
        })
    }
}

#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
    #[error("TLS handshake failed: {source}")]
    Tls {
        #[source]
        source: native_tls::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("{stage} rejected with {code} {message}")]
    Rejected {
        stage: SmtpStage,
        code: u16,
        message: String,
    },
    #[error("STARTTLS required but not advertised by {addr}")]
    StartTlsUnavailable { addr: SocketAddr },
    #[error("{addr} does not advertise AUTH PLAIN")]
    AuthUnavailable { addr: SocketAddr },
    #[error("refusing to send credentials to {addr} over an unencrypted connection")]
    InsecureAuth { addr: SocketAddr },
}

impl SmtpError {
    pub(crate) fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }

    pub(crate) fn rejected(stage: SmtpStage, code: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            stage,
            code,
            message: message.into(),
        }
    }
}
