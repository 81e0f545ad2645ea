//! # Newswire Notifier
//!
//! Telegram reporting for a news-scraping pipeline. The pipeline hands over
//! the statistics of a run; this crate renders them into Telegram HTML and
//! delivers them to the configured chats.
//!
//! ## Features
//!
//! - Two destination groups: a public **broadcast** channel and operator
//!   **notification** chats
//! - Messages over Telegram's 4096-character limit are split on line
//!   boundaries and sent as numbered parts
//! - Bounded retries with exponential backoff on transient failures
//! - Every operation returns an explicit [`SendOutcome`]; nothing panics or
//!   propagates a failed send
//!
//! ## Usage
//!
//! ```no_run
//! use newswire_notifier::{DestinationSet, Notifier, NotifierConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = NotifierConfig::new(
//!     Some("123:ABC".to_string()),
//!     DestinationSet::new(vec!["@newswire".to_string()], vec!["1001".to_string()]),
//! );
//! let notifier = Notifier::new(config)?;
//! let outcome = notifier.send_start_notification(6).await;
//! println!("delivered: {}", outcome.delivered());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod message;
pub mod models;
pub mod notifier;
pub mod outputs;
pub mod utils;

pub use api::{RetrySend, TelegramApi, Transport};
pub use config::{DestinationGroup, DestinationSet, NotifierConfig, RetryPolicy};
pub use error::{DeliveryError, DestinationOutcome, SendOutcome, SkipReason};
pub use message::split_message;
pub use models::{Report, SourceResult};
pub use notifier::Notifier;
