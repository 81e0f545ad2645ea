//! Notifier configuration.
//!
//! Everything the [`crate::notifier::Notifier`] needs is carried in an explicit
//! [`NotifierConfig`] value. The library never reads the environment itself;
//! the CLI layer does that through clap.

use std::fmt;
use std::time::Duration;
use url::Url;

/// Telegram message limit, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Which configured group a message goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationGroup {
    /// Public-facing channel(s).
    Broadcast,
    /// Operator-facing chat(s).
    Notification,
}

/// The two recipient groups, fixed for the lifetime of a notifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationSet {
    pub broadcast: Vec<String>,
    pub notification: Vec<String>,
}

impl DestinationSet {
    pub fn new(broadcast: Vec<String>, notification: Vec<String>) -> Self {
        Self {
            broadcast,
            notification,
        }
    }

    pub fn group(&self, group: DestinationGroup) -> &[String] {
        match group {
            DestinationGroup::Broadcast => &self.broadcast,
            DestinationGroup::Notification => &self.notification,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.broadcast.is_empty() && self.notification.is_empty()
    }
}

/// Bounded exponential backoff for a single part.
///
/// The delay before attempt `n + 1` is `base_delay * 2^(n-1)` plus up to
/// `max_jitter` of random noise. No delay follows the last attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::ZERO,
        }
    }
}

#[derive(Clone)]
pub struct NotifierConfig {
    pub bot_token: Option<String>,
    pub destinations: DestinationSet,
    pub api_base: Url,
    /// Per HTTP attempt.
    pub request_timeout: Duration,
    /// Pause between consecutive parts sent to the same chat.
    pub part_delay: Duration,
    pub retry: RetryPolicy,
    /// How many destinations are served at once; 1 keeps delivery sequential.
    pub destination_concurrency: usize,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            destinations: DestinationSet::default(),
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            request_timeout: Duration::from_secs(30),
            part_delay: Duration::from_millis(500),
            retry: RetryPolicy::default(),
            destination_concurrency: 1,
        }
    }
}

impl NotifierConfig {
    pub fn new(bot_token: Option<String>, destinations: DestinationSet) -> Self {
        Self {
            bot_token,
            destinations,
            ..Self::default()
        }
    }

    /// A blank token counts as missing.
    pub fn token(&self) -> Option<&str> {
        self.bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Sending needs a token and at least one destination in either group.
    pub fn is_enabled(&self) -> bool {
        self.token().is_some() && !self.destinations.is_empty()
    }
}

impl fmt::Debug for NotifierConfig {
    // Only whether a token is set, never its value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("bot_token", &self.token().map(|_| "<redacted>"))
            .field("destinations", &self.destinations)
            .field("api_base", &self.api_base.as_str())
            .field("request_timeout", &self.request_timeout)
            .field("part_delay", &self.part_delay)
            .field("retry", &self.retry)
            .field("destination_concurrency", &self.destination_concurrency)
            .finish()
    }
}

/// Parse a comma-separated list of chat identifiers, dropping blanks.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_chat_ids(" -100123, ,@ops "), vec!["-100123", "@ops"]);
/// ```
pub fn parse_chat_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
