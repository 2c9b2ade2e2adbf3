//! Length-bounded text fields.

/// Cut `text` to at most `max` characters, backing up to a word boundary.
///
/// Returns the cut text and whether anything was removed. A single word
/// longer than `max` is cut mid-word.
pub(crate) fn truncate_at_word(text: &str, max: usize) -> (String, bool) {
    let text = text.trim();
    if text.chars().count() <= max {
        return (text.to_string(), false);
    }

    let cut: String = text.chars().take(max).collect();
    let at_boundary = text.chars().nth(max).is_some_and(char::is_whitespace);

    let truncated = if at_boundary {
        cut.trim_end()
    } else {
        match cut.rfind(char::is_whitespace) {
            Some(i) if i > 0 => cut[..i].trim_end(),
            _ => cut.as_str(),
        }
    };

    (truncated.to_string(), true)
}

/// Collapse all whitespace (including paragraph breaks) to single spaces.
pub(crate) fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_at_word("  Short title ", 20), ("Short title".into(), false));
    }

    #[test]
    fn cuts_back_to_word_boundary() {
        let (out, cut) = truncate_at_word("The quick brown fox jumps", 12);
        assert!(cut);
        assert_eq!(out, "The quick");
    }

    #[test]
    fn keeps_word_ending_exactly_at_limit() {
        let (out, cut) = truncate_at_word("The quick brown fox", 9);
        assert!(cut);
        assert_eq!(out, "The quick");
    }

    #[test]
    fn long_single_word_is_cut() {
        let (out, cut) = truncate_at_word("Supercalifragilistic", 5);
        assert!(cut);
        assert_eq!(out, "Super");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let (out, cut) = truncate_at_word("éééé ééé", 6);
        assert!(cut);
        assert_eq!(out, "éééé");
    }

    #[test]
    fn single_line_joins_paragraphs() {
        assert_eq!(single_line("a  b\n\nc"), "a b c");
    }
}
