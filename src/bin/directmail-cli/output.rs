use std::net::IpAddr;

use anyhow::{Result, bail};
use directmail_lib::{MessageSnapshot, MessageStatus, ResolveError};

use crate::args::Cli;

/// Outcome of `resolve`, shaped for JSON output.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
pub struct ResolutionRow {
    pub domain: String,
    pub server: Option<IpAddr>,
    pub error: Option<String>,
}

impl ResolutionRow {
    pub fn new(domain: &str, result: Result<IpAddr, ResolveError>) -> Self {
        let (server, error) = match result {
            Ok(ip) => (Some(ip), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            domain: domain.to_string(),
            server,
            error,
        }
    }
}

pub fn write_statuses(rows: &[MessageSnapshot], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => {
            for row in rows {
                println!("{}", human_status_line(row));
            }
            Ok(())
        }
        "json" => write_json(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json"),
    }
}

pub fn write_resolution(row: &ResolutionRow, cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => {
            match (&row.server, &row.error) {
                (Some(ip), _) => println!("[OK]    {} -> {ip}", row.domain),
                (None, Some(err)) => println!("[FAIL]  {} :: {err}", row.domain),
                (None, None) => println!("[FAIL]  {}", row.domain),
            }
            Ok(())
        }
        "json" => write_json(row, cli),
        other => bail!("unknown --format '{other}', use: human|json"),
    }
}

pub fn any_failed(rows: &[MessageSnapshot]) -> bool {
    rows.iter()
        .any(|row| matches!(row.status, MessageStatus::Failure(_)))
}

fn human_status_line(row: &MessageSnapshot) -> String {
    let tag = match &row.status {
        MessageStatus::Pending => "[PENDING]",
        MessageStatus::Success => "[OK]     ",
        MessageStatus::Failure(_) => "[FAIL]   ",
    };
    let delivered = row
        .delivered_at
        .map(|at| at.to_rfc2822())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{tag} #{} {} -> {} \"{}\" @ {delivered} :: {}",
        row.id, row.from, row.to, row.subject, row.status
    )
}

#[cfg(feature = "with-serde")]
fn write_json<T: serde::Serialize + ?Sized>(value: &T, cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json<T: ?Sized>(_: &T, _: &Cli) -> Result<()> {
    bail!("--format json requires the 'with-serde' feature")
}

#[cfg(feature = "with-serde")]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use anyhow::Context;
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
