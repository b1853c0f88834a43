#[path = "mxdeliver-cli/args.rs"]
mod args;
#[path = "mxdeliver-cli/lookup.rs"]
mod lookup;
#[path = "mxdeliver-cli/send.rs"]
mod send;

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::send::SendOutcome;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Lookup {
            domain,
            format,
            no_ipv6,
        } => lookup::run_lookup(&domain, &format, !no_ipv6),
        Commands::Send(args) => match send::run_send(args)? {
            SendOutcome::Delivered => Ok(()),
            // exit codes: 0 delivered, 2 exhausted, 1 fatal
            SendOutcome::Exhausted => std::process::exit(2),
        },
    }
}
