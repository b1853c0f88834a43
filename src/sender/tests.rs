use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;

use super::smtp::{encode_data, plain_response};
use super::{Credentials, SendMail, SmtpError, SmtpSender, SmtpStage};
use crate::delivery::DeliveryOptions;

#[test]
fn encode_data_normalizes_line_endings_and_stuffs_dots() {
    let encoded = encode_data(b"Subject: hi\n\n.hidden\r\nend");
    assert_eq!(encoded, b"Subject: hi\r\n\r\n..hidden\r\nend\r\n.\r\n".to_vec());
}

#[test]
fn encode_data_keeps_terminated_body() {
    assert_eq!(encode_data(b"ABC\r\n"), b"ABC\r\n.\r\n".to_vec());
    assert_eq!(encode_data(b""), b".\r\n".to_vec());
    assert_eq!(encode_data(b"."), b"..\r\n.\r\n".to_vec());
}

#[test]
fn plain_response_matches_rfc4616() {
    let creds = Credentials::new("user", "pass");
    assert_eq!(plain_response(&creds), "AHVzZXIAcGFzcw==");
}

#[test]
fn credentials_debug_is_redacted() {
    let creds = Credentials::new("user", "hunter2");
    let rendered = format!("{creds:?}");
    assert!(rendered.contains("user"));
    assert!(!rendered.contains("hunter2"));
}

fn spawn_mock_server(
    script: Vec<(&'static str, &'static str)>,
) -> (SocketAddr, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    let addr = listener.local_addr().expect("addr");
    let (ready_tx, ready_rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        ready_tx.send(()).ok();
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = handle_session(&mut stream, script);
        }
    });
    ready_rx.recv().expect("server ready");
    (addr, handle)
}

fn handle_session(
    stream: &mut TcpStream,
    script: Vec<(&'static str, &'static str)>,
) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    stream.write_all(b"220 mock.smtp.test ESMTP\r\n")?;
    stream.flush()?;
    for (expected, response) in script {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        assert!(
            line.starts_with(expected),
            "expected command starting with '{expected}', got '{line}'"
        );
        if expected == "DATA" {
            stream.write_all(response.as_bytes())?;
            stream.flush()?;
            loop {
                let mut body = String::new();
                reader.read_line(&mut body)?;
                if body == ".\r\n" || body.is_empty() {
                    break;
                }
            }
            stream.write_all(b"250 2.0.0 queued\r\n")?;
        } else {
            stream.write_all(response.as_bytes())?;
        }
        stream.flush()?;
    }
    Ok(())
}

#[test]
#[ignore = "requires loopback TCP binding"]
fn delivers_over_plain_session() {
    let (addr, handle) = spawn_mock_server(vec![
        ("EHLO", "250-mock.example\r\n250 AUTH PLAIN LOGIN\r\n"),
        ("AUTH PLAIN", "235 2.7.0 Authenticated\r\n"),
        ("MAIL FROM:<sender@example.net>", "250 2.1.0 Ok\r\n"),
        ("RCPT TO:<rcpt1@example.com>", "250 2.1.5 Ok\r\n"),
        ("RCPT TO:<rcpt2@example.com>", "250 2.1.5 Ok\r\n"),
        ("DATA", "354 go ahead\r\n"),
        ("QUIT", "221 2.0.0 Bye\r\n"),
    ]);
    let sender = SmtpSender::new(&DeliveryOptions::default()).expect("sender");
    let creds = Credentials::new("user", "pass");
    sender
        .send_mail(
            addr,
            Some(&creds),
            "sender@example.net",
            &["rcpt1@example.com".to_string(), "rcpt2@example.com".to_string()],
            b"Subject: test\r\n\r\nABC",
        )
        .expect("delivery");
    handle.join().expect("server thread");
}

#[test]
#[ignore = "requires loopback TCP binding"]
fn rejected_recipient_is_an_error() {
    let (addr, handle) = spawn_mock_server(vec![
        ("EHLO", "250 mock.example\r\n"),
        ("MAIL FROM:", "250 2.1.0 Ok\r\n"),
        ("RCPT TO:", "550 5.1.1 User unknown\r\n"),
        ("QUIT", "221 2.0.0 Bye\r\n"),
    ]);
    let sender = SmtpSender::new(&DeliveryOptions::default()).expect("sender");
    let err = sender
        .send_mail(addr, None, "sender@example.net", &["nobody@example.com".to_string()], b"ABC")
        .expect_err("recipient rejected");
    match err {
        SmtpError::Rejected { stage, code, .. } => {
            assert_eq!(stage, SmtpStage::RcptTo);
            assert_eq!(code, 550);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    handle.join().expect("server thread");
}

#[test]
#[ignore = "requires loopback TCP binding"]
fn missing_starttls_fails_when_required() {
    let (addr, handle) = spawn_mock_server(vec![
        ("EHLO", "250 mock.example\r\n"),
        ("QUIT", "221 2.0.0 Bye\r\n"),
    ]);
    let options = DeliveryOptions {
        require_tls: true,
        ..DeliveryOptions::default()
    };
    let sender = SmtpSender::new(&options).expect("sender");
    let err = sender
        .send_mail(addr, None, "sender@example.net", &["rcpt@example.com".to_string()], b"ABC")
        .expect_err("tls required");
    assert!(matches!(err, SmtpError::StartTlsUnavailable { .. }));
    handle.join().expect("server thread");
}
