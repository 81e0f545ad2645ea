//! Telegram Bot API delivery with exponential backoff retry logic.
//!
//! # Architecture
//!
//! The module uses a trait-based design so the network can be swapped out:
//! - [`Transport`]: core trait delivering one text to one chat
//! - [`TelegramApi`]: `reqwest` implementation calling `sendMessage`
//! - [`RetrySend`]: decorator that adds bounded retries to any [`Transport`]
//!
//! # Retry Strategy
//!
//! - 3 attempts per part by default
//! - Exponential backoff starting at 1 second (1s, 2s, 4s, …)
//! - Only transient failures are retried (see [`DeliveryError::is_retryable`])
//! - Optional random jitter, off by default

use crate::config::{NotifierConfig, RetryPolicy};
use crate::error::{ConfigError, DeliveryError, PartDelivery};
use crate::utils::truncate_for_log;
use rand::{Rng, rng};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Something that can put one text into one chat.
///
/// Implementors perform a single attempt; retrying is [`RetrySend`]'s job.
pub trait Transport {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError>;
}

impl<T> Transport for &T
where
    T: Transport,
{
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        (**self).send_text(chat_id, text).await
    }
}

/// JSON body of a `sendMessage` call.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// `reqwest`-backed Bot API client.
pub struct TelegramApi {
    client: reqwest::Client,
    endpoint: String,
}

impl TelegramApi {
    /// Build a client for `{api_base}/bot<token>/sendMessage` with the
    /// configured per-request timeout.
    pub fn new(config: &NotifierConfig, token: &str) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let endpoint = format!(
            "{}/bot{}/sendMessage",
            config.api_base.as_str().trim_end_matches('/'),
            token
        );
        Ok(Self { client, endpoint })
    }
}

impl fmt::Debug for TelegramApi {
    // The endpoint embeds the bot token.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramApi").finish_non_exhaustive()
    }
}

/// Map a `reqwest` error onto the retry taxonomy, dropping the token-bearing URL.
fn classify(e: reqwest::Error) -> DeliveryError {
    let e = e.without_url();
    if e.is_timeout() {
        DeliveryError::Timeout(e.to_string())
    } else if e.is_connect() {
        DeliveryError::Connect(e.to_string())
    } else if e.is_builder() {
        DeliveryError::Payload(e.to_string())
    } else {
        DeliveryError::Request(e.to_string())
    }
}

impl Transport for TelegramApi {
    #[instrument(level = "debug", skip_all, fields(%chat_id, chars = text.chars().count()))]
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let t0 = Instant::now();
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(classify)?;
        let dt = t0.elapsed();

        let status = resp.status();
        if status.is_success() {
            debug!(elapsed_ms = dt.as_millis(), "sendMessage accepted");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        warn!(
            status = status.as_u16(),
            elapsed_ms = dt.as_millis(),
            body = %truncate_for_log(&body, 300),
            "Telegram API returned error"
        );
        Err(DeliveryError::Status {
            status: status.as_u16(),
            body: truncate_for_log(&body, 300),
        })
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`Transport`].
///
/// # Backoff Strategy
///
/// The delay after failed attempt `n` follows:
/// ```text
/// delay = base_delay * 2^(n-1) + random_jitter(0..=max_jitter)
/// ```
/// No delay follows the final attempt.
pub struct RetrySend<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetrySend<T>
where
    T: Transport,
{
    /// Create a retry wrapper around an existing [`Transport`].
    ///
    /// # Arguments
    ///
    /// * `inner` - The transport performing single attempts
    /// * `policy` - Attempt limit, base delay and jitter
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let shift = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let delay = self
            .policy
            .base_delay
            .saturating_mul(2u32.checked_pow(shift).unwrap_or(u32::MAX));
        if self.policy.max_jitter.is_zero() {
            return delay;
        }
        let max_ms = u64::try_from(self.policy.max_jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter_ms: u64 = rng().random_range(0..=max_ms);
        delay + Duration::from_millis(jitter_ms)
    }

    /// Deliver one part, retrying transient failures.
    ///
    /// # Returns
    ///
    /// The attempts made and every backoff slept, or the last error once the
    /// attempts are exhausted or a non-retryable failure occurs.
    #[instrument(level = "info", skip_all, fields(%chat_id))]
    pub async fn send_part(&self, chat_id: &str, text: &str) -> Result<PartDelivery, DeliveryError> {
        let total_t0 = Instant::now();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut delivery = PartDelivery::default();

        loop {
            delivery.attempts += 1;
            let attempt = delivery.attempts;

            match self.inner.send_text(chat_id, text).await {
                Ok(()) => return Ok(delivery),
                Err(e) if !e.is_retryable() => {
                    error!(attempt, error = %e, "sendMessage rejected; not retrying");
                    return Err(e);
                }
                Err(e) if attempt >= max_attempts => {
                    error!(
                        attempt,
                        max = max_attempts,
                        elapsed_ms_total = total_t0.elapsed().as_millis(),
                        error = %e,
                        "sendMessage exhausted retries"
                    );
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max = max_attempts,
                        ?delay,
                        error = %e,
                        "sendMessage attempt failed; backing off"
                    );
                    sleep(delay).await;
                    delivery.backoffs.push(delay);
                }
            }
        }
    }
}

impl<T> fmt::Debug for RetrySend<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrySend")
            .field("policy", &self.policy)
            .finish()
    }
}
