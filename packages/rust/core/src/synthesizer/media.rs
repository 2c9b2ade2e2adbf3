//! Image dimension inference.

use std::sync::LazyLock;

use regex::Regex;

/// Dimensions encoded in a `-WxH` filename suffix (`photo-800x600.jpg`).
pub(crate) fn dimensions_from_url(url: &str) -> Option<(u32, u32)> {
    static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)-(\d{1,5})x(\d{1,5})\.(?:jpe?g|png|gif|webp|avif)(?:[?#].*)?$")
            .expect("valid regex")
    });

    let caps = SIZE_RE.captures(url.trim())?;
    let width: u32 = caps[1].parse().ok()?;
    let height: u32 = caps[2].parse().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}
