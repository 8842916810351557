/// Shortens `text` to at most `max_chars` characters for display, appending
/// an ellipsis when anything was cut off. Character-based so multi-byte
/// Bangla text is never split mid-scalar.
#[must_use]
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_text_unchanged() {
        assert_eq!(preview("চমৎকার বই", 100), "চমৎকার বই");
    }

    #[test]
    fn preview_keeps_text_at_exact_limit() {
        let text = "a".repeat(100);
        assert_eq!(preview(&text, 100), text);
    }

    #[test]
    fn preview_truncates_long_text_with_ellipsis() {
        let text = "b".repeat(101);
        let shortened = preview(&text, 100);
        assert_eq!(shortened.len(), 103);
        assert!(shortened.ends_with("..."));
        assert!(shortened.starts_with(&"b".repeat(100)));
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        // 120 Bangla characters, far more than 100 bytes.
        let text = "ভ".repeat(120);
        let shortened = preview(&text, 100);
        assert_eq!(shortened.chars().count(), 103);
        assert!(shortened.ends_with("..."));
    }
}
