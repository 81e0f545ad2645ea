//! Command-line interface definitions for the notifier binary.
//!
//! Every Telegram option can be given as a flag or through its environment
//! variable, so the binary drops into cron jobs and CI steps unchanged.

use clap::{Args, Parser, Subcommand};
use newswire_notifier::config::{
    DEFAULT_API_BASE, DestinationSet, NotifierConfig, RetryPolicy, parse_chat_ids,
};
use newswire_notifier::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Command-line arguments for the notifier.
///
/// # Examples
///
/// ```sh
/// # Announce a run to the operators
/// TELEGRAM_BOT_TOKEN=123:ABC TELEGRAM_CHAT_ID=1001 newswire-notify start 6
///
/// # Broadcast the digest of a finished run
/// newswire-notify --channel-ids @newswire report run.json
///
/// # Inspect what would be sent, without a token
/// newswire-notify preview run.yaml --failed
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub telegram: TelegramArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct TelegramArgs {
    /// Bot API token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Broadcast (public channel) chat IDs, comma-separated
    #[arg(long, env = "TELEGRAM_CHANNEL_IDS", default_value = "")]
    pub channel_ids: String,

    /// Notification (operator) chat IDs, comma-separated
    #[arg(long, env = "TELEGRAM_CHAT_ID", default_value = "")]
    pub chat_ids: String,

    /// Bot API base URL
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Pause between parts of a split message, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub part_delay_ms: u64,

    /// Delivery attempts per message part
    #[arg(long, default_value_t = 3)]
    pub attempts: usize,

    /// Destinations served at the same time
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
}

impl TelegramArgs {
    pub fn to_config(&self) -> Result<NotifierConfig, ConfigError> {
        Ok(NotifierConfig {
            bot_token: self.bot_token.clone(),
            destinations: DestinationSet::new(
                parse_chat_ids(&self.channel_ids),
                parse_chat_ids(&self.chat_ids),
            ),
            api_base: Url::parse(&self.api_base)?,
            request_timeout: Duration::from_secs(self.timeout_secs),
            part_delay: Duration::from_millis(self.part_delay_ms),
            retry: RetryPolicy {
                max_attempts: self.attempts,
                ..RetryPolicy::default()
            },
            destination_concurrency: self.concurrency,
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send arbitrary text (HTML allowed)
    Message {
        text: String,
        /// Send to the broadcast group instead of the operators
        #[arg(long, conflicts_with = "to")]
        broadcast: bool,
        /// Explicit chat IDs, overriding the configured groups
        #[arg(long, value_delimiter = ',')]
        to: Vec<String>,
    },
    /// Send an error alert to the operators
    Alert { message: String },
    /// Announce the start of a scraping run
    Start { sources: usize },
    /// Send the report of a finished run (digest, or incident with --failed)
    Report {
        file: PathBuf,
        #[arg(long)]
        failed: bool,
    },
    /// Send the full statistics of a run to the operators
    Summary { file: PathBuf },
    /// Print the parts a report would be sent as, without sending
    Preview {
        file: PathBuf,
        #[arg(long)]
        failed: bool,
        /// Preview the full statistics message instead
        #[arg(long, conflicts_with = "failed")]
        summary: bool,
    },
}
