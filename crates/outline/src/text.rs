/// Marker appended to truncated titles.
pub const ELLIPSIS: char = '…';

/// The first line of `text` (after trimming), cut to `max_len` characters with a
/// single ellipsis appended when it was longer.
pub fn short_text(text: &str, max_len: usize) -> String {
    let first_line = text.trim().split('\n').next().unwrap_or("");
    let first_line = first_line.strip_suffix('\r').unwrap_or(first_line);
    if first_line.chars().count() <= max_len {
        return first_line.to_string();
    }
    let mut cut: String = first_line.chars().take(max_len).collect();
    cut.push(ELLIPSIS);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_short_first_line() {
        assert_eq!(short_text("  hello\nworld", 100), "hello");
        assert_eq!(short_text("windows\r\nline", 100), "windows");
        assert_eq!(short_text("", 100), "");
    }

    #[test]
    fn truncates_to_limit_plus_ellipsis() {
        let line = "x".repeat(150);
        let title = short_text(&line, 100);
        assert_eq!(title.chars().count(), 101);
        assert!(title.ends_with(ELLIPSIS));
        assert!(title.starts_with(&"x".repeat(100)));
    }

    #[test]
    fn exact_limit_is_not_truncated() {
        let line = "y".repeat(80);
        assert_eq!(short_text(&line, 80), line);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let line = "ä".repeat(5);
        assert_eq!(short_text(&line, 3), "äää…");
    }
}
