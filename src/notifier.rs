//! The notifier: renders reports and delivers them to Telegram chats.
//!
//! Every operation returns a [`SendOutcome`]; failures are logged and folded
//! into that value, never raised. A notifier without a bot token or without
//! any destination is disabled and never touches the network.

use crate::api::{RetrySend, TelegramApi, Transport};
use crate::config::{DestinationGroup, MAX_MESSAGE_LENGTH, NotifierConfig};
use crate::error::{ConfigError, DestinationOutcome, SendOutcome, SkipReason};
use crate::message::{annotate_parts, split_message};
use crate::models::Report;
use crate::outputs::{alerts, report as templates};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::fmt;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Delivers reports and alerts to the configured Telegram chats.
///
/// Holds only read-only configuration, so one instance can serve any number
/// of calls. The transport defaults to [`TelegramApi`]; tests plug in their
/// own [`Transport`].
pub struct Notifier<T = TelegramApi> {
    config: NotifierConfig,
    /// `None` when disabled.
    sender: Option<RetrySend<T>>,
}

impl Notifier<TelegramApi> {
    /// Build a notifier talking to the real Bot API.
    ///
    /// # Errors
    ///
    /// Only if the HTTP client cannot be constructed. A missing token or
    /// empty destinations yield a disabled notifier, not an error.
    pub fn new(config: NotifierConfig) -> Result<Self, ConfigError> {
        let api = match config.token() {
            Some(token) if config.is_enabled() => Some(TelegramApi::new(&config, token)?),
            _ => None,
        };
        Ok(Self::build(config, api))
    }
}

impl<T> Notifier<T>
where
    T: Transport,
{
    /// Build a notifier over any [`Transport`].
    pub fn with_transport(config: NotifierConfig, transport: T) -> Self {
        let transport = config.is_enabled().then_some(transport);
        Self::build(config, transport)
    }

    fn build(config: NotifierConfig, transport: Option<T>) -> Self {
        match &transport {
            Some(_) => info!(
                broadcast = config.destinations.broadcast.len(),
                notification = config.destinations.notification.len(),
                "Telegram reporting enabled"
            ),
            None => info!("Telegram reporting disabled (missing credentials)"),
        }
        let sender = transport.map(|t| RetrySend::new(t, config.retry.clone()));
        Self { config, sender }
    }

    /// True when a bot token and at least one destination are configured.
    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// The configuration this notifier was built with.
    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Send `text` to `destinations`, or to the notification group when `None`.
    ///
    /// Long text is split on line boundaries; parts after the first carry a
    /// `[Part i/n]` marker. Each chat gets its parts in order, with a pause
    /// between them. A chat is abandoned at its first part that cannot be
    /// delivered; the other chats are still served.
    #[instrument(level = "info", skip_all, fields(chars = text.chars().count()))]
    pub async fn send_message(&self, text: &str, destinations: Option<&[String]>) -> SendOutcome {
        let Some(sender) = &self.sender else {
            return SendOutcome::Skipped(SkipReason::Disabled);
        };

        let chats = destinations.unwrap_or_else(|| {
            self.config
                .destinations
                .group(DestinationGroup::Notification)
        });
        if chats.is_empty() {
            warn!("No Telegram destinations resolved; message not sent");
            return SendOutcome::Skipped(SkipReason::NoDestinations);
        }

        let parts = match split_message(text, MAX_MESSAGE_LENGTH) {
            Ok(parts) => annotate_parts(parts),
            Err(e) => {
                error!(error = %e, "Message cannot be split for Telegram");
                return SendOutcome::Skipped(e.into());
            }
        };
        debug!(parts = parts.len(), chats = chats.len(), "Delivering message");

        let outcomes: Vec<DestinationOutcome> = stream::iter(chats)
            .map(|chat_id| self.deliver(sender, chat_id, &parts))
            .buffered(self.config.destination_concurrency.max(1))
            .collect()
            .await;

        let complete = outcomes.iter().filter(|o| o.is_complete()).count();
        if complete == 0 {
            error!(chats = outcomes.len(), "Telegram message reached no destination");
        } else {
            info!(complete, chats = outcomes.len(), "Telegram message delivered");
        }
        SendOutcome::Attempted(outcomes)
    }

    /// Send `text` to one of the configured groups.
    pub async fn send_to_group(&self, text: &str, group: DestinationGroup) -> SendOutcome {
        let chats = self.config.destinations.group(group);
        self.send_message(text, Some(chats)).await
    }

    async fn deliver(
        &self,
        sender: &RetrySend<T>,
        chat_id: &str,
        parts: &[String],
    ) -> DestinationOutcome {
        let mut outcome = DestinationOutcome {
            chat_id: chat_id.to_string(),
            parts_total: parts.len(),
            parts_sent: 0,
            deliveries: Vec::with_capacity(parts.len()),
            failure: None,
        };

        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                sleep(self.config.part_delay).await;
            }
            match sender.send_part(chat_id, part).await {
                Ok(delivery) => {
                    outcome.parts_sent += 1;
                    outcome.deliveries.push(delivery);
                }
                Err(e) => {
                    error!(
                        %chat_id,
                        part = i + 1,
                        total = parts.len(),
                        error = %e,
                        "Failed to send Telegram message; abandoning chat"
                    );
                    outcome.failure = Some(e);
                    break;
                }
            }
        }
        outcome
    }

    /// Report the end of a run.
    ///
    /// A successful run broadcasts its narrative to the public channel; a
    /// run without a narrative has nothing to broadcast and is skipped. A
    /// failed run sends an incident message to the operators.
    #[instrument(level = "info", skip(self, report))]
    pub async fn send_report(&self, report: &Report, success: bool) -> SendOutcome {
        if !self.is_enabled() {
            return SendOutcome::Skipped(SkipReason::Disabled);
        }

        if success {
            let Some(narrative) = report.narrative() else {
                info!("Report has no narrative; nothing to broadcast");
                return SendOutcome::Skipped(SkipReason::MissingNarrative);
            };
            let text = templates::channel_digest(report, narrative);
            self.send_to_group(&text, DestinationGroup::Broadcast).await
        } else {
            match templates::incident(report) {
                Ok(text) => {
                    self.send_to_group(&text, DestinationGroup::Notification)
                        .await
                }
                Err(e) => {
                    error!(error = %e, "Failed to build Telegram report");
                    SendOutcome::Skipped(e.into())
                }
            }
        }
    }

    /// Send the full statistics of a run to the operators.
    #[instrument(level = "info", skip_all)]
    pub async fn send_run_summary(&self, report: &Report) -> SendOutcome {
        if !self.is_enabled() {
            return SendOutcome::Skipped(SkipReason::Disabled);
        }
        match templates::run_summary(report) {
            Ok(text) => {
                self.send_to_group(&text, DestinationGroup::Notification)
                    .await
            }
            Err(e) => {
                error!(error = %e, "Failed to build Telegram report");
                SendOutcome::Skipped(e.into())
            }
        }
    }

    /// Send an error alert to the operators.
    ///
    /// # Arguments
    ///
    /// * `message` - Error description; HTML-escaped before sending
    ///
    /// # Returns
    ///
    /// The delivery outcome for the notification group, stamped in UTC.
    #[instrument(level = "info", skip_all)]
    pub async fn send_error_alert(&self, message: &str) -> SendOutcome {
        if !self.is_enabled() {
            return SendOutcome::Skipped(SkipReason::Disabled);
        }
        let text = alerts::error_alert(message, Utc::now());
        self.send_to_group(&text, DestinationGroup::Notification)
            .await
    }

    /// Announce to the operators that a scraping run is starting.
    ///
    /// # Arguments
    ///
    /// * `source_count` - Number of sources about to be scraped
    #[instrument(level = "info", skip(self))]
    pub async fn send_start_notification(&self, source_count: usize) -> SendOutcome {
        if !self.is_enabled() {
            return SendOutcome::Skipped(SkipReason::Disabled);
        }
        let text = alerts::start_notification(source_count, Utc::now());
        self.send_to_group(&text, DestinationGroup::Notification)
            .await
    }
}

impl<T> fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("enabled", &self.sender.is_some())
            .field("destinations", &self.config.destinations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::ScriptedTransport;
    use crate::config::DestinationSet;
    use crate::error::DeliveryError;
    use crate::models::SourceResult;
    use chrono::TimeZone;
    use std::time::Duration;

    const CHANNEL: &str = "@newswire";
    const OPS_A: &str = "1001";
    const OPS_B: &str = "1002";

    fn config() -> NotifierConfig {
        NotifierConfig::new(
            Some("T".to_string()),
            DestinationSet::new(
                vec![CHANNEL.to_string()],
                vec![OPS_A.to_string(), OPS_B.to_string()],
            ),
        )
    }

    fn report(errors: Option<Vec<String>>, narrative: Option<&str>) -> Report {
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap();
        Report {
            start_time: start,
            end_time: start + chrono::Duration::seconds(125),
            sources: vec![SourceResult { name: "oxu.az".to_string(), saved: 3 }],
            total_saved: 3,
            narrative: narrative.map(str::to_string),
            errors,
            total_found: None,
            total_scraped: None,
            total_skipped: None,
        }
    }

    /// Three parts once split: 3 blocks of 2000 characters.
    fn long_text() -> String {
        ["a", "b", "c"].map(|c| c.repeat(2000)).join("\n")
    }

    fn timeout() -> DeliveryError {
        DeliveryError::Timeout("operation timed out".to_string())
    }

    #[tokio::test]
    async fn test_disabled_never_sends() {
        let transport = ScriptedTransport::default();
        let notifier = Notifier::with_transport(
            NotifierConfig::new(None, config().destinations),
            &transport,
        );

        assert!(!notifier.is_enabled());
        let outcome = notifier.send_message("hello", None).await;
        assert_eq!(outcome, SendOutcome::Skipped(SkipReason::Disabled));
        assert!(!notifier.send_error_alert("boom").await.delivered());
        assert!(!notifier.send_start_notification(3).await.delivered());
        assert!(!notifier.send_report(&report(None, Some("n")), true).await.delivered());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_destinations_fail_without_network() {
        let transport = ScriptedTransport::default();
        let notifier = Notifier::with_transport(config(), &transport);

        let none: [String; 0] = [];
        let outcome = notifier.send_message("hello", Some(none.as_slice())).await;
        assert!(!outcome.delivered());
        assert_eq!(outcome.skip_reason(), Some(&SkipReason::NoDestinations));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_notification_group_fails_without_network() {
        let transport = ScriptedTransport::default();
        let notifier = Notifier::with_transport(
            NotifierConfig::new(
                Some("T".to_string()),
                DestinationSet::new(vec![CHANNEL.to_string()], vec![]),
            ),
            &transport,
        );

        let outcome = notifier.send_error_alert("boom").await;
        assert_eq!(outcome.skip_reason(), Some(&SkipReason::NoDestinations));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_defaults_to_notification_group() {
        let transport = ScriptedTransport::default();
        let notifier = Notifier::with_transport(config(), &transport);

        let outcome = notifier.send_message("hello", None).await;
        assert!(outcome.delivered());
        assert_eq!(transport.texts_for(OPS_A), vec!["hello"]);
        assert_eq!(transport.texts_for(OPS_B), vec!["hello"]);
        assert!(transport.texts_for(CHANNEL).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_multipart_order_markers_and_delay() {
        let transport = ScriptedTransport::default();
        let notifier = Notifier::with_transport(config(), &transport);

        let t0 = tokio::time::Instant::now();
        let outcome = notifier.send_message(&long_text(), None).await;
        assert!(outcome.delivered());

        for chat in [OPS_A, OPS_B] {
            let texts = transport.texts_for(chat);
            assert_eq!(texts.len(), 3);
            assert_eq!(texts[0], "a".repeat(2000));
            assert_eq!(texts[1], format!("{}\n\n<i>[Part 2/3]</i>", "b".repeat(2000)));
            assert_eq!(texts[2], format!("{}\n\n<i>[Part 3/3]</i>", "c".repeat(2000)));
        }
        // Two inter-part pauses per chat, chats served one after the other.
        assert_eq!(t0.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_chat_is_abandoned_others_continue() {
        let transport = ScriptedTransport::default();
        transport.push(OPS_A, Ok(()));
        transport.push(
            OPS_A,
            Err(DeliveryError::Status { status: 400, body: "Bad Request".to_string() }),
        );
        let notifier = Notifier::with_transport(config(), &transport);

        let outcome = notifier.send_message(&long_text(), None).await;
        assert!(outcome.delivered());

        let first = &outcome.destinations()[0];
        assert_eq!(first.chat_id, OPS_A);
        assert_eq!(first.parts_sent, 1);
        assert!(!first.is_complete());
        assert_eq!(transport.texts_for(OPS_A).len(), 2);

        assert!(outcome.destinations()[1].is_complete());
        assert_eq!(transport.texts_for(OPS_B).len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_chats_failing_is_not_delivered() {
        let transport = ScriptedTransport::default();
        for chat in [OPS_A, OPS_B] {
            for _ in 0..3 {
                transport.push(chat, Err(DeliveryError::Connect("refused".to_string())));
            }
        }
        let notifier = Notifier::with_transport(config(), &transport);

        let outcome = notifier.send_message("hello", None).await;
        assert!(!outcome.delivered());
        assert_eq!(transport.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_timeouts_then_success_is_delivered() {
        let transport = ScriptedTransport::default();
        transport.push(OPS_A, Err(timeout()));
        transport.push(OPS_A, Err(timeout()));
        let notifier = Notifier::with_transport(config(), &transport);

        let outcome = notifier
            .send_message("hello", Some([OPS_A.to_string()].as_slice()))
            .await;
        assert!(outcome.delivered());
        let deliveries = &outcome.destinations()[0].deliveries;
        assert_eq!(
            deliveries[0].backoffs,
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_destinations_keep_part_order() {
        let transport = ScriptedTransport::default();
        transport.push(OPS_A, Err(timeout()));
        let mut cfg = config();
        cfg.destination_concurrency = 2;
        let notifier = Notifier::with_transport(cfg, &transport);

        let t0 = tokio::time::Instant::now();
        let outcome = notifier.send_message(&long_text(), None).await;
        assert!(outcome.delivered());
        assert!(outcome.destinations().iter().all(DestinationOutcome::is_complete));
        assert_eq!(outcome.destinations()[0].chat_id, OPS_A);

        // The timed-out first attempt is recorded too, then retried before `b`.
        let first_letters = |chat: &str| -> Vec<char> {
            transport
                .texts_for(chat)
                .iter()
                .filter_map(|t| t.chars().next())
                .collect()
        };
        assert_eq!(first_letters(OPS_A), vec!['a', 'a', 'b', 'c']);
        assert_eq!(first_letters(OPS_B), vec!['a', 'b', 'c']);

        let first = &outcome.destinations()[0];
        assert_eq!(first.parts_sent, 3);
        assert_eq!(first.deliveries[0].attempts, 2);
        assert_eq!(first.deliveries[0].backoffs, vec![Duration::from_secs(1)]);
        // OPS_A: 1s backoff + 2 pauses; OPS_B runs alongside it.
        assert_eq!(t0.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_oversize_line_is_not_sent() {
        let transport = ScriptedTransport::default();
        let notifier = Notifier::with_transport(config(), &transport);

        let outcome = notifier.send_message(&"x".repeat(5000), None).await;
        assert!(matches!(outcome.skip_reason(), Some(SkipReason::Split(_))));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_report_without_narrative_is_skipped() {
        let transport = ScriptedTransport::default();
        let notifier = Notifier::with_transport(config(), &transport);

        let outcome = notifier.send_report(&report(None, None), true).await;
        assert_eq!(outcome, SendOutcome::Skipped(SkipReason::MissingNarrative));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_report_goes_to_broadcast_only() {
        let transport = ScriptedTransport::default();
        let notifier = Notifier::with_transport(config(), &transport);

        let outcome = notifier
            .send_report(&report(None, Some("<b>Rates</b> held.")), true)
            .await;
        assert!(outcome.delivered());
        let texts = transport.texts_for(CHANNEL);
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("19.10.2026"));
        assert!(texts[0].contains("<b>Rates</b> held."));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_report_lists_first_five_errors_to_operators() {
        let transport = ScriptedTransport::default();
        let notifier = Notifier::with_transport(config(), &transport);
        let errors = (1..=7).map(|i| format!("error number {i}")).collect();

        let outcome = notifier
            .send_report(&report(Some(errors), Some("ignored")), false)
            .await;
        assert!(outcome.delivered());
        assert!(transport.texts_for(CHANNEL).is_empty());

        let text = &transport.texts_for(OPS_A)[0];
        let listed = (1..=7)
            .filter(|i| text.contains(&format!("error number {i}")))
            .count();
        assert_eq!(listed, 5);
        assert!(text.contains("error number 5"));
        assert!(!text.contains("error number 6"));
    }

    #[tokio::test]
    async fn test_failure_report_with_bad_timestamps_is_skipped() {
        let transport = ScriptedTransport::default();
        let notifier = Notifier::with_transport(config(), &transport);
        let mut r = report(None, None);
        std::mem::swap(&mut r.start_time, &mut r.end_time);

        let outcome = notifier.send_report(&r, false).await;
        assert!(matches!(outcome.skip_reason(), Some(SkipReason::Report(_))));
        assert!(!notifier.send_run_summary(&r).await.delivered());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_run_summary_and_alerts_go_to_operators() {
        let transport = ScriptedTransport::default();
        let notifier = Notifier::with_transport(config(), &transport);

        assert!(notifier.send_run_summary(&report(None, Some("n"))).await.delivered());
        assert!(notifier.send_error_alert("db unreachable").await.delivered());
        assert!(notifier.send_start_notification(4).await.delivered());

        let texts = transport.texts_for(OPS_B);
        assert_eq!(texts.len(), 3);
        assert!(texts[0].contains("News Scraping Report"));
        assert!(texts[1].contains("❌ db unreachable"));
        assert!(texts[2].contains("📚 Sources: 4"));
        assert!(transport.texts_for(CHANNEL).is_empty());
    }
}
