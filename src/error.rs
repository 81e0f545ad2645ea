//! Error and outcome types threaded through every delivery layer.
//!
//! Nothing in this crate raises a failed send to the caller. Each layer
//! returns an explicit value instead:
//!
//! | Layer       | Type                                   |
//! |-------------|----------------------------------------|
//! | part        | `Result<PartDelivery, DeliveryError>`  |
//! | destination | [`DestinationOutcome`]                 |
//! | operation   | [`SendOutcome`]                        |

use std::time::Duration;
use thiserror::Error;

/// Why a single HTTP attempt against the Bot API failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("Telegram API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("payload rejected before sending: {0}")]
    Payload(String),
}

impl DeliveryError {
    /// Transient failures are worth another attempt; everything else is not.
    ///
    /// 429 and 5xx responses count as transient, other non-2xx statuses
    /// mean the payload itself was refused.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::Timeout(_) | DeliveryError::Connect(_) | DeliveryError::Request(_) => {
                true
            }
            DeliveryError::Status { status, .. } => *status == 429 || *status >= 500,
            DeliveryError::Payload(_) => false,
        }
    }
}

/// A part that made it through, with the backoff delays slept on the way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartDelivery {
    pub attempts: usize,
    pub backoffs: Vec<Duration>,
}

/// A single line longer than the per-part budget cannot be split on a line
/// boundary, so the whole message is refused rather than cut.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("line {line} is {length} characters long; parts allow at most {budget}")]
    LineTooLong {
        line: usize,
        length: usize,
        budget: usize,
    },
}

/// Input stats that cannot be rendered into a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("report ends ({end}) before it starts ({start})")]
    NegativeDuration { start: String, end: String },
}

/// Problems turning raw settings into a [`crate::config::NotifierConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base URL: {0}")]
    InvalidApiBase(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Why an operation never reached the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("notifier disabled (missing bot token or destinations)")]
    Disabled,

    #[error("no destinations resolved")]
    NoDestinations,

    #[error("report has no narrative to broadcast")]
    MissingNarrative,

    #[error(transparent)]
    Split(#[from] SplitError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Delivery result for one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationOutcome {
    pub chat_id: String,
    pub parts_total: usize,
    pub parts_sent: usize,
    /// Attempts and backoffs of every part that went through, in order.
    pub deliveries: Vec<PartDelivery>,
    pub failure: Option<DeliveryError>,
}

impl DestinationOutcome {
    /// The chat received every part of the message.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.parts_sent == self.parts_total
    }
}

/// Aggregate result of one send operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was sent; no network call was made.
    Skipped(SkipReason),
    /// Delivery was attempted for each listed destination.
    Attempted(Vec<DestinationOutcome>),
}

impl SendOutcome {
    /// True when at least one destination received the full message.
    pub fn delivered(&self) -> bool {
        match self {
            SendOutcome::Skipped(_) => false,
            SendOutcome::Attempted(destinations) => {
                destinations.iter().any(DestinationOutcome::is_complete)
            }
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            SendOutcome::Skipped(reason) => Some(reason),
            SendOutcome::Attempted(_) => None,
        }
    }

    pub fn destinations(&self) -> &[DestinationOutcome] {
        match self {
            SendOutcome::Skipped(_) => &[],
            SendOutcome::Attempted(destinations) => destinations,
        }
    }
}
