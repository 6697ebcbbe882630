mod args;
mod output;

use anyhow::{Context, Result};
use directmail_lib::{DeliveryScheduler, OutgoingMail, resolve_mail_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands, ComposeArgs, SendArgs};
use output::ResolutionRow;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "directmail_lib=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ok = match &cli.cmd {
        Commands::Send(args) => send(args, &cli)?,
        Commands::Resolve { domain } => resolve(domain, &cli)?,
        Commands::Preview(args) => preview(args)?,
    };

    if !ok {
        std::process::exit(2);
    }
    Ok(())
}

fn send(args: &SendArgs, cli: &Cli) -> Result<bool> {
    let scheduler = DeliveryScheduler::new(args.options()?);
    let message = args.message()?;

    let submission = scheduler.submit(message, args.delay());
    if submission.status.is_pending() {
        info!(id = %submission.id, delay_s = args.delay, "waiting for delayed delivery");
        scheduler.wait_all();
    }

    let rows = scheduler.store().all();
    output::write_statuses(&rows, cli)?;
    Ok(!output::any_failed(&rows))
}

fn resolve(domain: &str, cli: &Cli) -> Result<bool> {
    let row = ResolutionRow::new(domain, resolve_mail_server(domain));
    output::write_resolution(&row, cli)?;
    Ok(row.server.is_some())
}

fn preview(args: &ComposeArgs) -> Result<bool> {
    let message = args.message().context("compose message")?;
    print!("{}", OutgoingMail::compose_now(&message).data_section());
    println!(".");
    Ok(true)
}
