//! # ldgraph-sanitizer
//!
//! Reduces scraped article text (plain text or HTML) to its editorial content.
//! HTML input is flattened with `htmd`, then a series of passes strips
//! link-reference tokens, navigation words, content before the first content
//! anchor, and the pollution lexicon, and finally normalizes whitespace.

mod html;
mod lexicon;
mod passes;

use tracing::{debug, instrument};

use ldgraph_shared::{Result, SanitizerConfig};

pub use lexicon::{Lexicon, PollutionHit};

use passes::{NavPatterns, StartAnchors};

/// Compiled text sanitizer. Build once per run and reuse for every record.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    window_chars: usize,
    lexicon: Lexicon,
    nav: NavPatterns,
    anchors: StartAnchors,
}

impl Sanitizer {
    /// Compile the configured vocabularies and lexicon.
    ///
    /// Invalid patterns surface here as configuration errors; after this
    /// point sanitizing never fails.
    pub fn new(config: &SanitizerConfig) -> Result<Self> {
        Ok(Self {
            window_chars: config.window_chars,
            lexicon: Lexicon::from_config(config)?,
            nav: NavPatterns::compile(config)?,
            anchors: StartAnchors::compile(config)?,
        })
    }

    /// The pollution lexicon this sanitizer removes.
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Return the editorial content of `raw`, using `title` to find where it starts.
    #[instrument(level = "debug", skip_all, fields(title = %title, raw_len = raw.len()))]
    pub fn sanitize(&self, raw: &str, title: &str) -> String {
        let mut result = if html::looks_like_html(raw) {
            html::flatten(raw)
        } else {
            raw.to_string()
        };

        result = passes::strip_link_refs(&result);
        result = self.nav.strip(&result, title);
        result = passes::locate_start(&result, title, self.window_chars, &self.anchors);
        result = self.lexicon.strip(&result);
        result = passes::normalize_whitespace(&result);

        debug!(clean_len = result.len(), "sanitized body");
        result
    }
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
