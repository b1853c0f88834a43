use std::net::SocketAddr;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use native_tls::TlsConnector;
use tracing::{debug, trace};

use super::error::{SmtpError, SmtpStage};
use super::stream::{SmtpReply, SmtpStream};
use super::{Credentials, SendMail};
use crate::delivery::{DeliveryError, DeliveryOptions};

/// Blocking SMTP client that performs one complete mail transaction per call.
///
/// The dialogue is `EHLO` (falling back to `HELO`), `STARTTLS` when offered,
/// `AUTH PLAIN` when credentials are supplied, then `MAIL FROM`, one `RCPT TO`
/// per recipient, `DATA` and `QUIT`.
pub struct SmtpSender {
    connector: TlsConnector,
    helo_domain: String,
    connect_timeout: Duration,
    command_timeout: Duration,
    require_tls: bool,
}

impl SmtpSender {
    pub fn new(options: &DeliveryOptions) -> Result<Self, DeliveryError> {
        // targets are bare IP addresses, so hostname checks can only be opt-in
        let connector = TlsConnector::builder()
            .danger_accept_invalid_certs(!options.verify_certificates)
            .danger_accept_invalid_hostnames(!options.verify_certificates)
            .use_sni(false)
            .build()
            .map_err(DeliveryError::sender_init)?;
        Ok(Self {
            connector,
            helo_domain: options.helo_domain().into_owned(),
            connect_timeout: options.connect_timeout,
            command_timeout: options.command_timeout,
            require_tls: options.require_tls,
        })
    }

    fn transaction(
        &self,
        stream: &mut SmtpStream,
        target: SocketAddr,
        credentials: Option<&Credentials>,
        from: &str,
        to: &[String],
        message: &[u8],
    ) -> Result<(), SmtpError> {
        expect_completion(stream.read_reply()?, SmtpStage::Greeting)?;

        let mut ehlo = self.hello(stream)?;
        if ehlo.has_capability("STARTTLS") {
            let reply = command(stream, "STARTTLS")?;
            expect_completion(reply, SmtpStage::StartTls)?;
            stream.upgrade_tls(&target.ip().to_string(), &self.connector)?;
            ehlo = self.hello(stream)?;
        } else if self.require_tls {
            return Err(SmtpError::StartTlsUnavailable { addr: target });
        }

        if let Some(credentials) = credentials {
            if !stream.is_tls() && !target.ip().is_loopback() {
                return Err(SmtpError::InsecureAuth { addr: target });
            }
            if !ehlo.supports_auth("PLAIN") {
                return Err(SmtpError::AuthUnavailable { addr: target });
            }
            let reply = command(stream, &format!("AUTH PLAIN {}", plain_response(credentials)))?;
            expect_completion(reply, SmtpStage::Auth)?;
        }

        let reply = command(stream, &format!("MAIL FROM:<{from}>"))?;
        expect_completion(reply, SmtpStage::MailFrom)?;
        for rcpt in to {
            let reply = command(stream, &format!("RCPT TO:<{rcpt}>"))?;
            expect_completion(reply, SmtpStage::RcptTo)?;
        }

        let reply = command(stream, "DATA")?;
        if !reply.is_positive_intermediate() {
            return Err(SmtpError::rejected(SmtpStage::Data, reply.code, reply.message()));
        }
        stream.write_all(&encode_data(message))?;
        expect_completion(stream.read_reply()?, SmtpStage::Data)?;
        Ok(())
    }

    fn hello(&self, stream: &mut SmtpStream) -> Result<SmtpReply, SmtpError> {
        let reply = command(stream, &format!("EHLO {}", self.helo_domain))?;
        if reply.is_permanent_failure() {
            let reply = command(stream, &format!("HELO {}", self.helo_domain))?;
            return expect_completion(reply, SmtpStage::Ehlo);
        }
        expect_completion(reply, SmtpStage::Ehlo)
    }
}

impl SendMail for SmtpSender {
    type Error = SmtpError;

    fn send_mail(
        &self,
        target: SocketAddr,
        credentials: Option<&Credentials>,
        from: &str,
        to: &[String],
        message: &[u8],
    ) -> Result<(), SmtpError> {
        debug!(%target, recipients = to.len(), "opening SMTP session");
        let mut stream = SmtpStream::connect(&target, self.connect_timeout, self.command_timeout)?;
        let result = self.transaction(&mut stream, target, credentials, from, to, message);
        // the message is already accepted or rejected; QUIT is a courtesy
        if let Err(err) = command(&mut stream, "QUIT") {
            trace!(%target, error = %err, "QUIT failed");
        }
        result
    }
}

fn command(stream: &mut SmtpStream, line: &str) -> Result<SmtpReply, SmtpError> {
    if line.starts_with("AUTH ") {
        trace!("C: AUTH PLAIN <redacted>");
    } else {
        trace!("C: {line}");
    }
    stream.send_command(line)?;
    let reply = stream.read_reply()?;
    trace!("S: {} {}", reply.code, reply.message());
    Ok(reply)
}

fn expect_completion(reply: SmtpReply, stage: SmtpStage) -> Result<SmtpReply, SmtpError> {
    if reply.is_positive_completion() {
        Ok(reply)
    } else {
        Err(SmtpError::rejected(stage, reply.code, reply.message()))
    }
}

/// RFC 4616 initial response: `\0username\0password`, base64 encoded.
pub(crate) fn plain_response(credentials: &Credentials) -> String {
    let raw = format!("\0{}\0{}", credentials.username, credentials.password);
    STANDARD.encode(raw.as_bytes())
}

/// Normalize bare LF to CRLF, dot-stuff lines and append the terminator.
pub(crate) fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 8);
    let mut line_start = true;
    let mut prev = None;
    for &byte in message {
        if line_start && byte == b'.' {
            out.push(b'.');
        }
        if byte == b'\n' && prev != Some(b'\r') {
            out.push(b'\r');
        }
        out.push(byte);
        line_start = byte == b'\n';
        prev = Some(byte);
    }
    if !out.is_empty() && !out.ends_with(b"\r\n") {
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b".\r\n");
    out
}
