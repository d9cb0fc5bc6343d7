// src/utils.rs

/// First `max_chars` characters of `text`, cut on a char boundary.
/// Markup is not taken into account, so a tag may be split.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_input_untouched() {
        assert_eq!(truncate_chars("<h1>Engineer</h1>", 1000), "<h1>Engineer</h1>");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn test_truncate_chars_exact_bound() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("Zürich café", 5), "Züric");
        assert_eq!(truncate_chars("日本語のテキスト", 3), "日本語");
    }

    #[test]
    fn test_truncate_chars_may_split_tags() {
        assert_eq!(truncate_chars("<div class=\"job\">", 7), "<div cl");
    }
}
