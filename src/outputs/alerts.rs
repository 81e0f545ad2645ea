//! Fixed operator templates: error alerts and run-start notices.

use super::report::SEPARATOR;
use crate::utils::escape_html;
use chrono::{DateTime, Utc};

fn utc_stamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Alert template wrapping a single error message, stamped with `now` in UTC.
pub fn error_alert(message: &str, now: DateTime<Utc>) -> String {
    format!(
        "🚨 <b>Scraping Error Alert</b>\n{SEPARATOR}\n\n❌ {}\n\n{SEPARATOR}\n🕒 {}",
        escape_html(message),
        utc_stamp(now)
    )
}

/// Run-start notice announcing how many sources will be processed.
pub fn start_notification(source_count: usize, now: DateTime<Utc>) -> String {
    format!(
        "🚀 <b>Scraping Started</b>\n{SEPARATOR}\n\n📚 Sources: {source_count}\n🕒 {}\n\n⏳ Processing...",
        utc_stamp(now)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 6, 5, 9).unwrap()
    }

    #[test]
    fn test_error_alert() {
        let msg = error_alert("DB down: a < b", now());
        assert!(msg.starts_with("🚨 <b>Scraping Error Alert</b>"));
        assert!(msg.contains("❌ DB down: a &lt; b"));
        assert!(msg.ends_with("🕒 2026-10-19 06:05:09 UTC"));
    }

    #[test]
    fn test_start_notification() {
        let msg = start_notification(6, now());
        assert!(msg.contains("📚 Sources: 6"));
        assert!(msg.contains("🕒 2026-10-19 06:05:09 UTC"));
        assert!(msg.ends_with("⏳ Processing..."));
    }
}
