//! The pollution lexicon: fixed patterns known to be site chrome.
//!
//! Compiled once from [`SanitizerConfig`] and shared by the sanitizer (which
//! removes matches) and the validation pipeline (which reports them).

use regex::Regex;

use ldgraph_shared::{LdGraphError, Result, SanitizerConfig};

/// A lexicon hit found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollutionHit {
    /// The matched text, trimmed.
    pub matched: String,
    /// Byte offset of the match.
    pub offset: usize,
}

/// Compiled pollution patterns.
#[derive(Debug, Clone)]
pub struct Lexicon {
    patterns: Vec<Regex>,
}

impl Lexicon {
    /// Compile the configured patterns plus the `Back <Section>` breadcrumb pattern.
    pub fn from_config(config: &SanitizerConfig) -> Result<Self> {
        let mut patterns = Vec::with_capacity(config.pollution_patterns.len() + 1);

        for pattern in &config.pollution_patterns {
            let re = Regex::new(pattern).map_err(|e| {
                LdGraphError::config(format!("invalid sanitizer pattern '{pattern}': {e}"))
            })?;
            patterns.push(re);
        }

        if let Some(sections) = alternation(&config.breadcrumb_sections) {
            // Capitalized "Back" only; it may be glued to a preceding word.
            let re = Regex::new(&format!(r"Back\s*(?i:{sections})\b")).map_err(|e| {
                LdGraphError::config(format!("invalid breadcrumb sections: {e}"))
            })?;
            patterns.push(re);
        }

        Ok(Self { patterns })
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Replace every lexicon match with a single space.
    pub fn strip(&self, text: &str) -> String {
        let mut result = text.to_string();
        for re in &self.patterns {
            if re.is_match(&result) {
                result = re.replace_all(&result, " ").into_owned();
            }
        }
        result
    }

    /// The earliest lexicon hit in `text`, if any.
    pub fn find(&self, text: &str) -> Option<PollutionHit> {
        self.patterns
            .iter()
            .filter_map(|re| re.find(text))
            .min_by_key(|m| m.start())
            .map(|m| PollutionHit {
                matched: m.as_str().trim().to_string(),
                offset: m.start(),
            })
    }

    /// Whether `text` contains any lexicon match.
    pub fn is_polluted(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }
}

/// Build an escaped regex alternation, longest entries first so a longer
/// entry wins over its own prefix.
pub(crate) fn alternation(items: &[String]) -> Option<String> {
    let mut escaped: Vec<&String> = items.iter().filter(|s| !s.trim().is_empty()).collect();
    if escaped.is_empty() {
        return None;
    }
    escaped.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    Some(
        escaped
            .iter()
            .map(|s| regex::escape(s.trim()))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::from_config(&SanitizerConfig::default()).expect("default lexicon compiles")
    }

    #[test]
    fn default_lexicon_compiles() {
        let lex = lexicon();
        assert_eq!(lex.len(), SanitizerConfig::default().pollution_patterns.len() + 1);
    }

    #[test]
    fn finds_cart_and_account_strings() {
        let lex = lexicon();
        assert!(lex.is_polluted("Your cart is currently empty. Return to shop"));
        assert!(lex.is_polluted("Welcome back! My Account"));
        assert!(lex.is_polluted("Login / Register"));
    }

    #[test]
    fn finds_breadcrumb_even_when_glued() {
        let lex = lexicon();
        let hit = lex.find("searchBack Photography Courses").expect("hit");
        assert_eq!(hit.matched, "Back Photography Courses");
        assert_eq!(hit.offset, 6);
    }

    #[test]
    fn lowercase_back_is_not_a_breadcrumb() {
        let lex = lexicon();
        assert!(!lex.is_polluted("I came back to the blog after a week."));
    }

    #[test]
    fn finds_share_urls_and_labels() {
        let lex = lexicon();
        assert!(lex.is_polluted("https://www.facebook.com/sharer/sharer.php?u=https://x.test"));
        assert!(lex.is_polluted("Click to share on Pinterest (Opens in new window)"));
        assert!(!lex.is_polluted("Share your photos with the class forum."));
    }

    #[test]
    fn finds_signature_lines() {
        let lex = lexicon();
        assert!(lex.is_polluted("Great work.\nBy Jane Doe | March 3, 2023\n"));
        assert!(lex.is_polluted("Posted on July 4, 2022 by John Smith"));
        assert!(!lex.is_polluted("By March, the light changes quickly."));
    }

    #[test]
    fn strip_replaces_matches_with_space() {
        let lex = lexicon();
        let out = lex.strip("Intro Add to cart text");
        assert_eq!(out, "Intro   text");
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let config = SanitizerConfig {
            pollution_patterns: vec!["(unclosed".into()],
            ..SanitizerConfig::default()
        };
        let err = Lexicon::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("invalid sanitizer pattern"));
    }

    #[test]
    fn alternation_prefers_longer_entries() {
        let alt = alternation(&["Assignments".into(), "Practice Assignments".into()]).unwrap();
        assert!(alt.starts_with("Practice"));
        assert!(alternation(&[]).is_none());
    }
}
