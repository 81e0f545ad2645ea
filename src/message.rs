//! Splitting long text into Telegram-sized parts.
//!
//! Parts are cut on line boundaries only. Each part leaves
//! [`PART_MARKER_HEADROOM`] characters free so the `[Part i/n]` marker can be
//! appended later without crossing the transport limit.

use crate::error::SplitError;
use crate::utils::char_len;

/// Characters kept free in every part for the part marker.
pub const PART_MARKER_HEADROOM: usize = 100;

/// Split `text` into ordered parts of at most `max_length` characters.
///
/// Text that already fits is returned as a single part, unchanged. Longer
/// text is split greedily by line: lines are appended to the current part
/// while `len(current) + 1 + len(line)` stays within
/// `max_length - PART_MARKER_HEADROOM`.
///
/// # Errors
///
/// [`SplitError::LineTooLong`] when one line alone exceeds that budget.
pub fn split_message(text: &str, max_length: usize) -> Result<Vec<String>, SplitError> {
    if char_len(text) <= max_length {
        return Ok(vec![text.to_string()]);
    }

    let budget = max_length.saturating_sub(PART_MARKER_HEADROOM);
    let mut parts = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for (index, line) in text.split('\n').enumerate() {
        let line_len = char_len(line);
        if line_len > budget {
            return Err(SplitError::LineTooLong {
                line: index + 1,
                length: line_len,
                budget,
            });
        }

        if !current.is_empty() && current_len + 1 + line_len > budget {
            parts.push(current.join("\n"));
            current.clear();
            current_len = 0;
        }

        if !current.is_empty() {
            current_len += 1;
        }
        current_len += line_len;
        current.push(line);
    }

    if !current.is_empty() {
        parts.push(current.join("\n"));
    }
    Ok(parts)
}

/// Append the `[Part i/n]` marker to every part after the first.
///
/// A single-part message is returned untouched.
pub fn annotate_parts(parts: Vec<String>) -> Vec<String> {
    let total = parts.len();
    if total <= 1 {
        return parts;
    }
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part
            } else {
                format!("{part}\n\n<i>[Part {}/{total}]</i>", i + 1)
            }
        })
        .collect()
}
