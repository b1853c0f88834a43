use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mxdeliver-cli", about = "Resolve MX routes and deliver mail with failover")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// print the MX tiers of a domain and the addresses of each exchange
    Lookup {
        domain: String,
        /// format: human|json
        #[arg(long, default_value = "human")]
        format: String,
        /// drop AAAA answers
        #[arg(long = "no-ipv6")]
        no_ipv6: bool,
    },
    /// deliver a message to the MX hosts of a domain
    Send(SendArgs),
}

#[derive(clap::Args)]
pub struct SendArgs {
    /// destination domain whose MX records are used
    pub domain: String,
    /// envelope sender (MAIL FROM)
    #[arg(long)]
    pub from: String,
    /// envelope recipient (RCPT TO), repeatable
    #[arg(long = "to", required = true)]
    pub to: Vec<String>,
    /// message file, `-` for stdin
    #[arg(long, default_value = "-")]
    pub message: PathBuf,
    #[arg(long, default_value_t = 25)]
    pub port: u16,
    /// AUTH PLAIN username
    #[arg(long, requires = "password")]
    pub user: Option<String>,
    /// AUTH PLAIN password
    #[arg(long, env = "MXDELIVER_PASSWORD", requires = "user")]
    pub password: Option<String>,
    /// name announced in EHLO
    #[arg(long)]
    pub helo: Option<String>,
    /// connect and command timeout (ms)
    #[arg(long = "timeout", default_value_t = 30_000)]
    pub timeout_ms: u64,
    /// fail candidates that do not offer STARTTLS
    #[arg(long = "require-tls")]
    pub require_tls: bool,
    /// drop AAAA answers
    #[arg(long = "no-ipv6")]
    pub no_ipv6: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
