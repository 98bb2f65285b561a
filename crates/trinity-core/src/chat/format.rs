//! Display helpers for threads and messages.

use chrono::{Local, TimeZone};

/// Number of characters of the first message kept as the thread title.
pub const TITLE_MAX_CHARS: usize = 40;

/// Derives a thread title from its first message.
///
/// Keeps the first 40 characters and appends `...` only when the text was
/// longer than that.
pub fn thread_title_for(text: &str) -> String {
    let mut title: String = text.chars().take(TITLE_MAX_CHARS).collect();
    if text.chars().count() > TITLE_MAX_CHARS {
        title.push_str("...");
    }
    title
}

/// Formats epoch milliseconds as `Mar 4, 09:15 AM` in local time.
///
/// Returns an empty string for a missing (zero) or out-of-range timestamp.
pub fn format_timestamp(millis: i64) -> String {
    format_with(millis, "%b %-d, %I:%M %p")
}

/// Formats epoch milliseconds as `Mar 4, 2026, 09:15 AM` in local time.
pub fn format_timestamp_with_year(millis: i64) -> String {
    format_with(millis, "%b %-d, %Y, %I:%M %p")
}

fn format_with(millis: i64, pattern: &str) -> String {
    if millis == 0 {
        return String::new();
    }
    match Local.timestamp_millis_opt(millis).single() {
        Some(date) => date.format(pattern).to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_used_verbatim() {
        assert_eq!(thread_title_for("How do I start?"), "How do I start?");
    }

    #[test]
    fn test_exactly_forty_chars_has_no_ellipsis() {
        let text = "a".repeat(40);
        assert_eq!(thread_title_for(&text), text);
    }

    #[test]
    fn test_long_text_is_truncated_with_ellipsis() {
        let text = "b".repeat(41);
        assert_eq!(thread_title_for(&text), format!("{}...", "b".repeat(40)));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(45);
        let title = thread_title_for(&text);
        assert_eq!(title.chars().count(), 43);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_zero_timestamp_formats_empty() {
        assert_eq!(format_timestamp(0), "");
        assert!(!format_timestamp(1_700_000_000_000).is_empty());
        assert!(format_timestamp_with_year(1_700_000_000_000).contains("2023"));
    }
}
