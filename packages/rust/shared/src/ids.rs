//! Identity and cross-link conventions.
//!
//! Every `@id` and structural link in the graph is a pure function of a
//! normalized URL. The synthesizer uses these helpers to build entities and
//! the validation pipeline uses the same helpers to check them.

use url::Url;

/// Suffix appended to an article URL to form its `@id`.
pub const ARTICLE_ID_SUFFIX: &str = "#article";
/// Suffix of the parent `WebPage` reference (`mainEntityOfPage`).
pub const WEBPAGE_ID_SUFFIX: &str = "#webpage";
/// Suffix of the `primaryImageOfPage` reference.
pub const PRIMARY_IMAGE_ID_SUFFIX: &str = "#primaryimage";
/// Suffix of the `discussionUrl` field.
pub const DISCUSSION_SUFFIX: &str = "#comments";
/// Suffix of the Blog entity `@id` (the parent collection).
pub const BLOG_ID_SUFFIX: &str = "#blog";
/// Suffix of the Organization entity `@id`.
pub const ORGANIZATION_ID_SUFFIX: &str = "/#organization";
/// Suffix of the WebSite entity `@id`.
pub const WEBSITE_ID_SUFFIX: &str = "/#website";
/// Suffix of the ItemList entity `@id`.
pub const ITEM_LIST_ID_SUFFIX: &str = "/#itemlist";

/// Normalize a canonical URL: absolute http(s), no fragment, no trailing slash.
///
/// Returns `None` for anything that is not an absolute http(s) URL.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut url = Url::parse(trimmed).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str()?;
    url.set_fragment(None);

    let mut s = url.to_string();
    while s.ends_with('/') {
        s.pop();
    }
    Some(s)
}

/// `@id` of the Article for a normalized URL.
pub fn article_id(url: &str) -> String {
    format!("{url}{ARTICLE_ID_SUFFIX}")
}

/// `@id` of the parent WebPage for a normalized URL.
pub fn webpage_id(url: &str) -> String {
    format!("{url}{WEBPAGE_ID_SUFFIX}")
}

/// `@id` of the primary image for a normalized URL.
pub fn primary_image_id(url: &str) -> String {
    format!("{url}{PRIMARY_IMAGE_ID_SUFFIX}")
}

/// Discussion thread URL for a normalized URL.
pub fn discussion_url(url: &str) -> String {
    format!("{url}{DISCUSSION_SUFFIX}")
}

/// `@id` of the Blog entity for a normalized blog URL.
pub fn blog_id(blog_url: &str) -> String {
    format!("{blog_url}{BLOG_ID_SUFFIX}")
}

/// `@id` of the Organization entity for a normalized site URL.
pub fn organization_id(site_url: &str) -> String {
    format!("{site_url}{ORGANIZATION_ID_SUFFIX}")
}

/// `@id` of the WebSite entity for a normalized site URL.
pub fn website_id(site_url: &str) -> String {
    format!("{site_url}{WEBSITE_ID_SUFFIX}")
}

/// `@id` of the ItemList entity for a normalized site URL.
pub fn item_list_id(site_url: &str) -> String {
    format!("{site_url}{ITEM_LIST_ID_SUFFIX}")
}
