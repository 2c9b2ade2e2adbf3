//! Text cleanup passes.
//!
//! Each pass is a function `&str -> String` applied in sequence by
//! [`crate::Sanitizer::sanitize`]. Passes that depend on configuration take
//! their compiled patterns as arguments.

use std::sync::LazyLock;

use regex::Regex;

use ldgraph_shared::{LdGraphError, Result, SanitizerConfig};

use crate::lexicon::alternation;

// ---------------------------------------------------------------------------
// Pass 1: Link-reference tokens and inline link syntax
// ---------------------------------------------------------------------------

/// Remove `[1]`, `[^2]`, `[edit]`-style tokens and unwrap inline Markdown links.
pub(crate) fn strip_link_refs(text: &str) -> String {
    static REF_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)\[(?:\^?\d+|edit|link|source|top|#|↑)\]").expect("valid regex")
    });
    static IMAGE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!\[[^\]\n]*\]\([^)\n]*\)").expect("valid regex"));
    static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\[([^\]\n]+)\]\((?:https?://|/|#)[^)\s]*\)").expect("valid regex")
    });

    let result = REF_RE.replace_all(text, "");
    let result = IMAGE_RE.replace_all(&result, "");
    LINK_RE.replace_all(&result, "$1").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 2: Ambiguous navigation words
// ---------------------------------------------------------------------------

/// Patterns for navigation words that are only removed in chrome positions.
#[derive(Debug, Clone, Default)]
pub(crate) struct NavPatterns {
    /// `search Back`, `menu | Cart`: the word sits right before a marker.
    before_marker: Option<Regex>,
    /// `Menu Search`, `Back > Home`: the word sits right after a marker.
    after_marker: Option<Regex>,
    /// Nav words stacked at the very start of the text.
    leading: Option<Regex>,
}

impl NavPatterns {
    pub(crate) fn compile(config: &SanitizerConfig) -> Result<Self> {
        let Some(words) = alternation(&config.nav_words) else {
            return Ok(Self::default());
        };

        // "Close-up" does not start with the nav word "close".
        let leading = compile(&format!(r"^(?:[\s|>»/]*(?i:{words})(?:[\s|>»/]+|$))+"))?;

        let (before_marker, after_marker) = match alternation(&config.nav_markers) {
            Some(markers) => (
                Some(compile(&format!(
                    r"(?i:\b(?:{words}))[ \t]*(?:[|>»/][ \t]*)?(?P<marker>{markers})"
                ))?),
                Some(compile(&format!(
                    r"(?P<marker>{markers})[ \t]*(?:[|>»/][ \t]*)?(?i:(?:{words}))(?P<tail>[\s|>»/]|$)"
                ))?),
            ),
            None => (None, None),
        };

        Ok(Self {
            before_marker,
            after_marker,
            leading: Some(leading),
        })
    }

    /// Remove nav words adjacent to markers, then any leading run of nav words.
    ///
    /// A text that opens with the title keeps its leading words.
    pub(crate) fn strip(&self, text: &str, title: &str) -> String {
        let mut result = text.to_string();

        if let Some(re) = &self.before_marker {
            result = re.replace_all(&result, "$marker").into_owned();
        }
        if let Some(re) = &self.after_marker {
            result = re.replace_all(&result, "${marker}${tail}").into_owned();
        }

        if let Some(re) = &self.leading {
            if !starts_with_title(&result, title) {
                result = re.replace(&result, "").into_owned();
            }
        }

        result
    }
}

fn starts_with_title(text: &str, title: &str) -> bool {
    let title = title.trim();
    if title.is_empty() {
        return false;
    }
    let head: String = text.trim_start().chars().take(title.chars().count()).collect();
    head.to_lowercase() == title.to_lowercase()
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| LdGraphError::config(format!("invalid sanitizer vocabulary: {e}")))
}

// ---------------------------------------------------------------------------
// Pass 3: Locate the start of the editorial content
// ---------------------------------------------------------------------------

/// Start-of-content anchors other than the title.
#[derive(Debug, Clone, Default)]
pub(crate) struct StartAnchors {
    headers: Option<Regex>,
    opener: Option<Regex>,
}

impl StartAnchors {
    pub(crate) fn compile(config: &SanitizerConfig) -> Result<Self> {
        let headers = alternation(&config.section_headers)
            .map(|alt| compile(&format!(r"\b(?:{alt})\b")))
            .transpose()?;
        let opener = alternation(&config.opener_nouns)
            .map(|alt| compile(&format!(r"\bThis\s+(?i:{alt})\b")))
            .transpose()?;
        Ok(Self { headers, opener })
    }
}

const STOPWORDS: &[&str] = &[
    "about", "after", "before", "from", "have", "into", "that", "their", "them", "then", "there",
    "these", "this", "what", "when", "where", "which", "with", "your", "yours",
];

/// Cut everything before the earliest content anchor found in the first
/// `window_chars` characters. Without an anchor the text is returned as is.
pub(crate) fn locate_start(
    text: &str,
    title: &str,
    window_chars: usize,
    anchors: &StartAnchors,
) -> String {
    let end = text
        .char_indices()
        .nth(window_chars)
        .map_or(text.len(), |(i, _)| i);
    let window = &text[..end];

    let candidates = [
        title_offset(window, title),
        anchors.headers.as_ref().and_then(|re| re.find(window)).map(|m| m.start()),
        anchors.opener.as_ref().and_then(|re| re.find(window)).map(|m| m.start()),
    ];

    match candidates.into_iter().flatten().min() {
        Some(start) => text[start..].to_string(),
        None => text.to_string(),
    }
}

/// Title offset: exact, then case-insensitive, then the first two keywords
/// appearing close together.
fn title_offset(window: &str, title: &str) -> Option<usize> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }

    if let Some(pos) = window.find(title) {
        return Some(pos);
    }

    let words: Vec<String> = title.split_whitespace().map(regex::escape).collect();
    if let Ok(re) = Regex::new(&format!(r"(?i){}", words.join(r"\s+"))) {
        if let Some(m) = re.find(window) {
            return Some(m.start());
        }
    }

    let keywords: Vec<&str> = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 4)
        .filter(|w| !STOPWORDS.contains(&w.to_lowercase().as_str()))
        .take(2)
        .collect();
    if let [first, second] = keywords[..] {
        let pattern = format!(
            r"(?is)\b{}\b.{{0,80}}?\b{}\b",
            regex::escape(first),
            regex::escape(second)
        );
        if let Ok(re) = Regex::new(&pattern) {
            return re.find(window).map(|m| m.start());
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Pass 4: Whitespace
// ---------------------------------------------------------------------------

/// Collapse whitespace inside paragraphs, keep blank-line paragraph breaks.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    static PARAGRAPH_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n[^\S\n]*\n").expect("valid regex"));

    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    PARAGRAPH_RE
        .split(&text)
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
