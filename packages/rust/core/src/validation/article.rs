//! Per-Article checks: field completeness, media, durations, content,
//! attribution, identity links, and publishing readiness.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;
use serde_json::Value;

use ldgraph_shared::ids;

use super::{CheckOutput, ValidationContext, article_nodes, entity_ref, graph_nodes, node_type, str_field, typed_object};

const REQUIRED_STRINGS: &[&str] = &[
    "@id",
    "url",
    "name",
    "headline",
    "alternativeHeadline",
    "description",
    "articleBody",
    "timeRequired",
    "estimatedReadingTime",
    "datePublished",
    "dateCreated",
    "dateModified",
    "inLanguage",
    "genre",
    "articleSection",
    "thumbnailUrl",
    "discussionUrl",
    "learningResourceType",
    "educationalLevel",
    "educationalUse",
    "teaches",
];

const REQUIRED_INTEGERS: &[&str] = &["wordCount", "copyrightYear"];

const REQUIRED_LISTS: &[&str] = &["keywords", "about", "mentions", "educationalAlignment"];

/// Lists whose entries must be typed objects.
const TYPED_LISTS: &[&str] = &["about", "mentions", "educationalAlignment"];

const REQUIRED_OBJECTS: &[&str] = &[
    "image",
    "primaryImageOfPage",
    "mainEntityOfPage",
    "isPartOf",
    "author",
    "publisher",
    "copyrightHolder",
    "audience",
    "speakable",
];

const DATE_FIELDS: &[&str] = &["datePublished", "dateCreated", "dateModified"];

const DURATION_FIELDS: &[&str] = &["timeRequired", "estimatedReadingTime"];

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PT[0-9]+[MH]$").expect("valid regex"));

/// Trimmed string value, if present and non-empty.
fn non_empty(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn is_assignment(node: &Value) -> bool {
    str_field(node, "learningResourceType") == Some("Practice Assignment")
        || str_field(node, "genre") == Some("Assignment")
}

// ---------------------------------------------------------------------------
// Check 4: fields
// ---------------------------------------------------------------------------

pub(crate) fn check_fields(doc: &Value, ctx: &ValidationContext<'_>, out: &mut CheckOutput) {
    for (i, node) in article_nodes(doc) {
        let entity = entity_ref(i, node);
        let e = Some(entity.as_str());

        for &key in REQUIRED_STRINGS {
            match node.get(key) {
                None | Some(Value::Null) => out.error(e, format!("missing {key}")),
                Some(Value::String(_)) => {}
                Some(_) => out.error(e, format!("{key} is not a string")),
            }
        }

        for &key in REQUIRED_INTEGERS {
            if node.get(key).and_then(Value::as_u64).is_none() {
                out.error(e, format!("{key} is missing or not a non-negative integer"));
            }
        }

        for &key in REQUIRED_LISTS {
            match node.get(key) {
                Some(Value::Array(_)) => {}
                None | Some(Value::Null) => out.error(e, format!("missing {key}")),
                Some(_) => out.error(e, format!("{key} is not an array")),
            }
        }

        if let Some(keywords) = node.get("keywords").and_then(Value::as_array) {
            if keywords.iter().any(|k| !k.is_string()) {
                out.error(e, "keywords must contain only strings");
            }
        }
        for &key in TYPED_LISTS {
            let Some(items) = node.get(key).and_then(Value::as_array) else {
                continue;
            };
            for (j, item) in items.iter().enumerate() {
                if typed_object(Some(item)).is_none() {
                    out.error(e, format!("{key}[{j}] is not a typed object"));
                }
            }
        }

        for &key in REQUIRED_OBJECTS {
            if typed_object(node.get(key)).is_none() {
                out.error(e, format!("{key} is not a typed object"));
            }
        }

        for &key in DATE_FIELDS {
            if let Some(date) = str_field(node, key) {
                if DateTime::parse_from_rfc3339(date).is_err() {
                    out.error(e, format!("{key} '{date}' is not an RFC 3339 date"));
                }
            }
        }

        if is_assignment(node) {
            if non_empty(node.get("teaches")).is_none() {
                out.error(e, "assignment has an empty teaches statement");
            }
            if str_field(node, "educationalUse") != Some("Assignment") {
                out.error(e, "assignment must have educationalUse 'Assignment'");
            }
        }

        // Recommended fields
        for key in ["keywords", "about"] {
            if node.get(key).and_then(Value::as_array).is_some_and(Vec::is_empty) {
                out.warn(e, format!("{key} is empty"));
            }
        }
        if str_field(node, "alternativeHeadline").is_some_and(|s| s.trim().is_empty()) {
            out.warn(e, "alternativeHeadline is empty");
        }
        if let Some(description) = str_field(node, "description") {
            let len = description.trim().chars().count();
            if len < ctx.min_description_chars {
                out.warn(
                    e,
                    format!(
                        "description has {len} characters, fewer than {}",
                        ctx.min_description_chars
                    ),
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Check 5: media
// ---------------------------------------------------------------------------

pub(crate) fn check_media(doc: &Value, _ctx: &ValidationContext<'_>, out: &mut CheckOutput) {
    for (i, node) in article_nodes(doc) {
        let entity = entity_ref(i, node);
        let e = Some(entity.as_str());

        match node.get("image").filter(|v| v.is_object()) {
            Some(image) => {
                if non_empty(image.get("url")).is_none() {
                    out.error(e, "image has no url");
                }
                for dim in ["width", "height"] {
                    if !image.get(dim).and_then(Value::as_u64).is_some_and(|n| n > 0) {
                        out.error(e, format!("image {dim} must be a positive number"));
                    }
                }
            }
            None => out.error(e, "image is not an object"),
        }

        match node.get("thumbnailUrl").and_then(Value::as_str) {
            Some(url) if url.trim().is_empty() => out.warn(e, "thumbnailUrl is empty"),
            Some(_) => {}
            None => out.error(e, "missing thumbnailUrl"),
        }

        let primary = node.get("primaryImageOfPage");
        if typed_object(primary) != Some("ImageObject") {
            out.error(e, "primaryImageOfPage is not an ImageObject");
        } else {
            if non_empty(primary.and_then(|p| p.get("@id"))).is_none() {
                out.error(e, "primaryImageOfPage has no @id");
            }
            if non_empty(primary.and_then(|p| p.get("url"))).is_none() {
                out.error(e, "primaryImageOfPage has no url");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Check 6: durations
// ---------------------------------------------------------------------------

pub(crate) fn check_durations(doc: &Value, _ctx: &ValidationContext<'_>, out: &mut CheckOutput) {
    for (i, node) in article_nodes(doc) {
        let entity = entity_ref(i, node);
        for &key in DURATION_FIELDS {
            match str_field(node, key) {
                Some(value) if DURATION_RE.is_match(value) => {}
                Some(value) => out.error(
                    Some(&entity),
                    format!("{key} '{value}' is not a duration like PT5M"),
                ),
                None => out.error(Some(&entity), format!("missing {key}")),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Check 7: content
// ---------------------------------------------------------------------------

pub(crate) fn check_content(doc: &Value, ctx: &ValidationContext<'_>, out: &mut CheckOutput) {
    for (i, node) in article_nodes(doc) {
        let entity = entity_ref(i, node);
        let Some(body) = non_empty(node.get("articleBody")) else {
            out.error(Some(&entity), "articleBody is empty");
            continue;
        };
        if let Some(hit) = ctx.lexicon.find(body) {
            out.error(
                Some(&entity),
                format!("articleBody contains site chrome '{}'", hit.matched),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Check 8: attribution
// ---------------------------------------------------------------------------

pub(crate) fn check_attribution(doc: &Value, _ctx: &ValidationContext<'_>, out: &mut CheckOutput) {
    for (i, node) in article_nodes(doc) {
        let entity = entity_ref(i, node);
        let e = Some(entity.as_str());
        check_party(node, "publisher", &["Organization"], e, out);
        check_party(node, "author", &["Person", "Organization"], e, out);
        check_party(node, "copyrightHolder", &["Organization", "Person"], e, out);
    }
}

fn check_party(node: &Value, key: &str, allowed: &[&str], e: Option<&str>, out: &mut CheckOutput) {
    let party = node.get(key);
    match typed_object(party) {
        Some(t) if allowed.contains(&t) => {
            if non_empty(party.and_then(|p| p.get("name"))).is_none() {
                out.error(e, format!("{key} has no name"));
            }
        }
        Some(t) => out.error(e, format!("{key} has type '{t}', expected one of {allowed:?}")),
        None => out.error(e, format!("{key} is not a typed object")),
    }
}

// ---------------------------------------------------------------------------
// Check 9: linking
// ---------------------------------------------------------------------------

pub(crate) fn check_linking(doc: &Value, _ctx: &ValidationContext<'_>, out: &mut CheckOutput) {
    let blog_id = graph_nodes(doc)
        .iter()
        .find(|n| node_type(n) == Some("Blog"))
        .and_then(|n| str_field(n, "@id"));

    for (i, node) in article_nodes(doc) {
        let entity = entity_ref(i, node);
        let e = Some(entity.as_str());

        let Some(url) = str_field(node, "url") else {
            out.error(e, "missing url");
            continue;
        };
        if url.ends_with('/') {
            out.error(e, format!("url '{url}' has a trailing slash"));
        }

        let expected = [
            ("@id", str_field(node, "@id"), ids::article_id(url)),
            (
                "mainEntityOfPage.@id",
                node.get("mainEntityOfPage").and_then(|p| str_field(p, "@id")),
                ids::webpage_id(url),
            ),
            (
                "primaryImageOfPage.@id",
                node.get("primaryImageOfPage").and_then(|p| str_field(p, "@id")),
                ids::primary_image_id(url),
            ),
            ("discussionUrl", str_field(node, "discussionUrl"), ids::discussion_url(url)),
        ];
        for (field, actual, wanted) in expected {
            if actual != Some(wanted.as_str()) {
                out.error(
                    e,
                    format!("{field} is {}, expected '{wanted}'", describe(actual)),
                );
            }
        }

        let parent = node.get("isPartOf").and_then(|p| str_field(p, "@id"));
        match parent {
            Some(id) if !id.ends_with(ids::BLOG_ID_SUFFIX) => {
                out.error(e, format!("isPartOf.@id '{id}' does not end with '{}'", ids::BLOG_ID_SUFFIX));
            }
            Some(id) => {
                if let Some(blog_id) = blog_id {
                    if id != blog_id {
                        out.error(e, format!("isPartOf.@id '{id}' does not match the Blog '{blog_id}'"));
                    }
                }
            }
            None => out.error(e, "isPartOf has no @id"),
        }
    }
}

fn describe(value: Option<&str>) -> String {
    value.map_or_else(|| "missing".to_string(), |v| format!("'{v}'"))
}

// ---------------------------------------------------------------------------
// Check 10: readiness
// ---------------------------------------------------------------------------

pub(crate) fn check_readiness(doc: &Value, ctx: &ValidationContext<'_>, out: &mut CheckOutput) {
    for (i, node) in article_nodes(doc) {
        let entity = entity_ref(i, node);
        let e = Some(entity.as_str());

        let required = [
            ("headline", node.get("headline")),
            ("description", node.get("description")),
            ("datePublished", node.get("datePublished")),
            ("image.url", node.get("image").and_then(|v| v.get("url"))),
            ("publisher.name", node.get("publisher").and_then(|v| v.get("name"))),
        ];
        for (field, value) in required {
            if non_empty(value).is_none() {
                out.warn(e, format!("{field} is empty"));
            }
        }

        if let Some(headline) = str_field(node, "headline") {
            let len = headline.chars().count();
            if len > ctx.headline_max_chars {
                out.warn(
                    e,
                    format!("headline has {len} characters, more than {}", ctx.headline_max_chars),
                );
            }
        }
    }
}
