//! Small formatting helpers shared by the message templates and the API client.
//!
//! - Human-readable durations for reports
//! - HTML escaping for text placed inside Telegram HTML messages
//! - String truncation for log lines

/// Format a duration in seconds as `X.Xs`, `X.Xm` or `X.Xh`.
///
/// Under a minute stays in seconds, under an hour switches to minutes,
/// anything longer is shown in hours. One decimal place in every case.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_duration(45.0), "45.0s");
/// assert_eq!(format_duration(125.0), "2.1m");
/// assert_eq!(format_duration(7384.0), "2.1h");
/// ```
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.1}s")
    } else if seconds < 3600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else {
        format!("{:.1}h", seconds / 3600.0)
    }
}

/// Escape the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Length in characters, the unit Telegram's limits are expressed in.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Truncate a string for logging purposes.
///
/// Long strings keep their first `max` characters followed by an ellipsis
/// and the number of bytes dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}
