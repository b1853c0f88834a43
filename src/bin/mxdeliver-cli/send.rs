use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use mxdeliver::{Credentials, DeliveryError, DeliveryOptions, Destination, MxClient};

use crate::args::SendArgs;

/// Outcome mapped to the process exit code.
pub enum SendOutcome {
    Delivered,
    Exhausted,
}

pub fn run_send(args: SendArgs) -> Result<SendOutcome> {
    let message = read_message(&args)?;

    let timeout = Duration::from_millis(args.timeout_ms);
    let options = DeliveryOptions {
        helo_domain: args.helo.clone(),
        connect_timeout: timeout,
        command_timeout: timeout,
        require_tls: args.require_tls,
        ipv6: !args.no_ipv6,
        ..DeliveryOptions::default()
    };

    let mut destination = Destination::new(&args.domain).with_port(args.port);
    if let (Some(user), Some(password)) = (args.user, args.password) {
        destination = destination.with_credentials(Credentials::new(user, password));
    }

    let client = MxClient::with_options(destination, &options)?;
    match client.deliver(&args.from, &args.to, &message) {
        Ok(delivered) => {
            println!(
                "[OK]    delivered to {} ({}) after {} attempt(s)",
                delivered.exchange, delivered.address, delivered.attempts
            );
            Ok(SendOutcome::Delivered)
        }
        Err(err @ DeliveryError::NoAlternative { .. }) => {
            println!("[FAILED] {}: {err}", args.domain);
            for failure in err.failures() {
                println!("        {failure}");
            }
            Ok(SendOutcome::Exhausted)
        }
        Err(err) => Err(err).with_context(|| format!("deliver to {}", args.domain)),
    }
}

fn read_message(args: &SendArgs) -> Result<Vec<u8>> {
    if args.message.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("read message from stdin")?;
        Ok(buf)
    } else {
        std::fs::read(&args.message)
            .with_context(|| format!("read message from {}", args.message.display()))
    }
}
