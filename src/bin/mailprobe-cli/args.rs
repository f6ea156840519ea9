use std::net::IpAddr;
use std::time::Duration;

use clap::Parser;
use mailprobe_lib::{MxLookupOptions, ProbeOptions};

#[derive(Parser)]
#[command(
    name = "mailprobe-cli",
    about = "Probe mailbox deliverability over SMTP without sending mail"
)]
pub struct Cli {
    /// addresses to check, one probe each
    #[arg(required = true)]
    pub addresses: Vec<String>,

    /// identity announced in the EHLO/HELO handshake
    #[arg(long, default_value = "localhost")]
    pub helo: String,

    /// envelope sender for MAIL FROM (default postmaster@<helo>)
    #[arg(long = "from")]
    pub mail_from: Option<String>,

    /// DNS server queried for MX records
    #[arg(long = "dns", default_value = "1.1.1.1")]
    pub dns: IpAddr,

    /// SMTP port dialed on each candidate server
    #[arg(long, default_value_t = mailprobe_lib::probe::SMTP_PORT)]
    pub port: u16,

    /// per-operation timeout in ms (DNS query, connect, each command)
    #[arg(long = "timeout", default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// write report to file (JSON/NDJSON/CSV per --format)
    #[arg(long)]
    pub out: Option<String>,

    /// debug-level logging (candidate selection details)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn mx_options(&self) -> MxLookupOptions {
        MxLookupOptions {
            nameserver: self.dns,
            timeout: self.timeout(),
            ..MxLookupOptions::default()
        }
    }

    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            port: self.port,
            helo_domain: self.helo.clone(),
            mail_from: self.mail_from.clone(),
            connect_timeout: self.timeout(),
            command_timeout: self.timeout(),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
