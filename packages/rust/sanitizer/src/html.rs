//! HTML flattening for scraped bodies.
//!
//! Picks the editorial container, converts it with `htmd`, then reduces the
//! Markdown syntax to plain paragraphs so the text passes only see prose.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

/// Whether the input carries HTML markup worth flattening.
pub(crate) fn looks_like_html(text: &str) -> bool {
    static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)</?(?:p|div|br|span|h[1-6]|article|section|main|ul|ol|li|a|strong|em|img|figure|body|html)\b[^>]*>")
            .expect("valid regex")
    });

    TAG_RE.is_match(text)
}

/// Flatten an HTML document or fragment to plain text with paragraph breaks.
pub(crate) fn flatten(html: &str) -> String {
    let content_html = extract_content_html(html);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec![
            "script", "style", "nav", "header", "footer", "aside", "form", "iframe", "noscript",
            "svg",
        ])
        .build();

    match converter.convert(&content_html) {
        Ok(md) => strip_markdown(&md),
        Err(e) => {
            debug!(error = %e, "htmd conversion failed, falling back to text nodes");
            text_nodes(&content_html)
        }
    }
}

/// Extract the editorial container, falling back to `<body>`.
fn extract_content_html(html: &str) -> String {
    let doc = Html::parse_document(html);

    // Known content containers in priority order
    let selectors = [
        ".entry-content",
        ".post-content",
        "article",
        "[role=\"main\"]",
        "main",
        ".content",
        "body",
    ];

    for sel_str in &selectors {
        if let Ok(selector) = Selector::parse(sel_str) {
            if let Some(el) = doc.select(&selector).next() {
                return el.inner_html();
            }
        }
    }

    html.to_string()
}

/// Concatenate the text nodes of an HTML fragment.
fn text_nodes(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduce Markdown produced by `htmd` to plain text.
fn strip_markdown(md: &str) -> String {
    static IMAGE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid regex"));
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]\n]*)\]\([^)\s]*(?:\s+[^)]*)?\)").expect("valid regex"));
    static HEADING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").expect("valid regex"));
    static UNDERLINE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:=+|-{3,})[ \t]*$").expect("valid regex"));
    static LIST_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:[-*+]|\d+\.)[ \t]+").expect("valid regex"));
    static QUOTE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").expect("valid regex"));
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^[ \t]*```.*$").expect("valid regex"));
    static EMPHASIS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*|__").expect("valid regex"));
    static ESCAPE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\\([\\`*_{}\[\]()#+\-.!>|])").expect("valid regex"));

    let mut text = IMAGE_RE.replace_all(md, "").into_owned();
    text = LINK_RE.replace_all(&text, "$1").into_owned();
    text = FENCE_RE.replace_all(&text, "").into_owned();
    text = HEADING_RE.replace_all(&text, "").into_owned();
    text = UNDERLINE_RE.replace_all(&text, "").into_owned();
    text = LIST_RE.replace_all(&text, "").into_owned();
    text = QUOTE_RE.replace_all(&text, "").into_owned();
    text = EMPHASIS_RE.replace_all(&text, "").into_owned();
    ESCAPE_RE.replace_all(&text, "$1").into_owned()
}
