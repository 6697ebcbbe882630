use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use directmail_lib::{DeliveryOptions, Message};

#[derive(Parser)]
#[command(name = "directmail-cli", version, about = "Deliver mail straight to the recipient's MX")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    /// format: human|json
    #[arg(long, global = true, default_value = "human")]
    pub format: String,

    /// write the JSON report to a file instead of stdout
    #[arg(long, global = true)]
    pub out: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deliver one message, optionally after a delay
    Send(SendArgs),
    /// Print the mail server that would receive mail for a domain
    Resolve { domain: String },
    /// Print the DATA section that would be transmitted
    Preview(ComposeArgs),
}

#[derive(Args)]
pub struct ComposeArgs {
    /// recipient address
    #[arg(long)]
    pub to: String,

    /// sender address
    #[arg(long)]
    pub from: String,

    #[arg(long, default_value = "")]
    pub subject: String,

    /// message body (otherwise --body-file, otherwise stdin)
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    #[arg(long = "body-file")]
    pub body_file: Option<PathBuf>,
}

impl ComposeArgs {
    pub fn read_body(&self) -> Result<String> {
        if let Some(body) = &self.body {
            return Ok(body.clone());
        }
        if let Some(path) = &self.body_file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("read body file {}", path.display()));
        }
        let stdin = io::stdin();
        if stdin.is_terminal() {
            return Ok(String::new());
        }
        let mut body = String::new();
        stdin.lock().read_to_string(&mut body).context("read stdin")?;
        Ok(body)
    }

    pub fn message(&self) -> Result<Message> {
        Ok(Message::new(
            &self.to,
            &self.from,
            &self.subject,
            self.read_body()?,
        ))
    }
}

#[derive(Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub compose: ComposeArgs,

    /// SMTP server (host, ip or host:port); resolved from the recipient's MX when absent
    #[arg(long)]
    pub server: Option<String>,

    /// seconds to wait before delivering
    #[arg(long, default_value_t = 0)]
    pub delay: u64,

    #[arg(long, default_value_t = 25)]
    pub port: u16,

    /// name announced with HELO
    #[arg(long, default_value = "localhost")]
    pub helo: String,

    /// connect timeout (ms)
    #[arg(long = "timeout-ms", default_value_t = 2_000)]
    pub timeout_ms: u64,

    /// per-command read/write timeout (ms), none by default
    #[arg(long = "command-timeout-ms")]
    pub command_timeout_ms: Option<u64>,

    /// sender of the status notification following a delayed delivery
    #[arg(long = "notify-from", default_value = "noreply@localhost")]
    pub notify_from: String,
}

impl SendArgs {
    pub fn options(&self) -> Result<DeliveryOptions> {
        if self.timeout_ms == 0 {
            bail!("--timeout-ms must be greater than zero");
        }
        Ok(DeliveryOptions {
            port: self.port,
            helo_domain: self.helo.clone(),
            connect_timeout: Duration::from_millis(self.timeout_ms),
            command_timeout: self
                .command_timeout_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            notification_sender: self.notify_from.clone(),
        })
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay)
    }

    pub fn message(&self) -> Result<Message> {
        let message = self.compose.message()?;
        Ok(match &self.server {
            Some(server) => message.with_server(server),
            None => message,
        })
    }
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
