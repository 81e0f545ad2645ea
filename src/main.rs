//! # newswire-notify
//!
//! Command-line front end for the notifier: sends run reports, alerts and
//! start notices for the news-scraping pipeline to Telegram.
//!
//! ## Usage
//!
//! ```sh
//! newswire-notify --bot-token $TOKEN --chat-ids 1001 alert "database unreachable"
//! ```
//!
//! The process exits with status 0 when at least one chat received the full
//! message and 1 otherwise.

use clap::Parser;
use newswire_notifier::config::MAX_MESSAGE_LENGTH;
use newswire_notifier::message::{annotate_parts, split_message};
use newswire_notifier::models::load_report;
use newswire_notifier::outputs::report as templates;
use newswire_notifier::{DestinationGroup, Notifier, SendOutcome};
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(command = ?args.command, "Parsed CLI arguments");

    let Some(outcome) = run(args).await? else {
        return Ok(ExitCode::SUCCESS);
    };

    let elapsed = start_time.elapsed();
    match &outcome {
        SendOutcome::Skipped(reason) => warn!(%reason, "Nothing sent"),
        SendOutcome::Attempted(destinations) => {
            for d in destinations {
                match &d.failure {
                    None => info!(chat_id = %d.chat_id, parts = d.parts_sent, "Delivered"),
                    Some(e) => warn!(
                        chat_id = %d.chat_id,
                        sent = d.parts_sent,
                        total = d.parts_total,
                        error = %e,
                        "Not delivered"
                    ),
                }
            }
        }
    }
    info!(?elapsed, delivered = outcome.delivered(), "Execution complete");

    Ok(if outcome.delivered() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run one subcommand; `None` means nothing was meant to be sent.
async fn run(args: Cli) -> Result<Option<SendOutcome>, Box<dyn Error>> {
    // Preview renders only; it needs neither a token nor the network.
    if let Command::Preview {
        file,
        failed,
        summary,
    } = &args.command
    {
        preview(file, *failed, *summary).await?;
        return Ok(None);
    }

    let notifier = Notifier::new(args.telegram.to_config()?)?;
    let outcome = match args.command {
        Command::Message {
            text,
            broadcast,
            to,
        } => {
            if !to.is_empty() {
                notifier.send_message(&text, Some(to.as_slice())).await
            } else if broadcast {
                notifier
                    .send_to_group(&text, DestinationGroup::Broadcast)
                    .await
            } else {
                notifier.send_message(&text, None).await
            }
        }
        Command::Alert { message } => notifier.send_error_alert(&message).await,
        Command::Start { sources } => notifier.send_start_notification(sources).await,
        Command::Report { file, failed } => {
            let report = load_report(&file).await?;
            notifier.send_report(&report, !failed).await
        }
        Command::Summary { file } => {
            let report = load_report(&file).await?;
            notifier.send_run_summary(&report).await
        }
        Command::Preview { .. } => return Ok(None),
    };
    Ok(Some(outcome))
}

/// Print the parts a report would be delivered as.
async fn preview(file: &Path, failed: bool, summary: bool) -> Result<(), Box<dyn Error>> {
    let report = load_report(file).await?;
    let text = if summary {
        templates::run_summary(&report)?
    } else if failed {
        templates::incident(&report)?
    } else {
        let narrative = report
            .narrative()
            .ok_or("report has no narrative to broadcast")?;
        templates::channel_digest(&report, narrative)
    };

    let parts = annotate_parts(split_message(&text, MAX_MESSAGE_LENGTH)?);
    for (i, part) in parts.iter().enumerate() {
        println!(
            "----- part {}/{} ({} chars) -----",
            i + 1,
            parts.len(),
            part.chars().count()
        );
        println!("{part}");
    }
    Ok(())
}
