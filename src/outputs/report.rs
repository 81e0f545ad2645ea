//! Report templates: channel digest, failure incident and full run summary.

use crate::error::ReportError;
use crate::models::Report;
use crate::utils::{escape_html, format_duration};
use itertools::Itertools;
use std::fmt::Write;

/// Errors listed in an incident message; the rest are only counted.
pub const MAX_LISTED_ERRORS: usize = 5;

pub const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━";

/// Formatted run duration, refusing reports whose end precedes their start.
pub fn report_duration(report: &Report) -> Result<String, ReportError> {
    let secs = report.duration_secs();
    if secs < 0.0 {
        return Err(ReportError::NegativeDuration {
            start: report.start_time.to_rfc3339(),
            end: report.end_time.to_rfc3339(),
        });
    }
    Ok(format_duration(secs))
}

/// Public channel post: date header followed by the narrative as-is.
///
/// The narrative may carry Telegram HTML and is not escaped.
pub fn channel_digest(report: &Report, narrative: &str) -> String {
    format!(
        "📰 <b>News Digest</b>\n📅 {}\n\n{}",
        report.end_time.format("%d.%m.%Y"),
        narrative
    )
}

/// Operator message for a failed run.
///
/// Lists the first [`MAX_LISTED_ERRORS`] errors and counts the remainder.
pub fn incident(report: &Report) -> Result<String, ReportError> {
    let duration = report_duration(report)?;
    let mut msg = String::new();

    writeln!(msg, "🚨 <b>Scraping Run Failed</b>").ok();
    writeln!(msg, "{SEPARATOR}").ok();
    writeln!(msg).ok();
    writeln!(msg, "📅 {}", report.end_time.format("%d.%m.%Y %H:%M UTC")).ok();
    writeln!(msg, "⏱ Duration: {duration}").ok();
    writeln!(msg).ok();

    let errors = report.errors();
    if errors.is_empty() {
        writeln!(msg, "❌ Scraping failed without a recorded error.").ok();
    } else {
        writeln!(msg, "❌ <b>Errors</b> ({}):", errors.len()).ok();
        for e in errors.iter().take(MAX_LISTED_ERRORS) {
            writeln!(msg, "• {}", escape_html(e)).ok();
        }
        if errors.len() > MAX_LISTED_ERRORS {
            writeln!(msg, "…and {} more", errors.len() - MAX_LISTED_ERRORS).ok();
        }
    }

    write!(msg, "{SEPARATOR}").ok();
    Ok(msg)
}

/// Full statistics of a run for the operators.
///
/// Status header, counters, per-source breakdown, the narrative when there
/// is one, the error count, and a footer stamped with the run's end time.
pub fn run_summary(report: &Report) -> Result<String, ReportError> {
    let duration = report_duration(report)?;
    let status = if report.total_saved > 0 { "✅" } else { "⚠️" };

    let mut lines = vec![
        format!("{status} <b>News Scraping Report</b>"),
        format!("⏱ {duration} | 💾 {} new articles", report.total_saved),
    ];

    let counters = [
        ("found", report.total_found),
        ("scraped", report.total_scraped),
        ("skipped", report.total_skipped),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|v| format!("{label}: {v}")))
    .join(" | ");
    if !counters.is_empty() {
        lines.push(format!("🔎 {counters}"));
    }
    lines.push(String::new());

    if !report.sources.is_empty() {
        let sources = report
            .sources
            .iter()
            .map(|s| format!("{}: {}", escape_html(&s.name), s.saved))
            .join(" | ");
        lines.push(format!("📚 {sources}"));
        lines.push(String::new());
    }

    if let Some(narrative) = report.narrative() {
        lines.push("🧠 <b>Session Summary</b>".to_string());
        lines.push(String::new());
        lines.push(narrative.to_string());
        lines.push(String::new());
    }

    let errors = report.errors();
    if !errors.is_empty() {
        lines.push(format!("⚠️ {} errors occurred", errors.len()));
        lines.push(String::new());
    }

    lines.push(format!("🕒 {}", report.end_time.format("%H:%M, %d.%m.%Y")));
    Ok(lines.join("\n"))
}
