//! Graph-level checks: document shape, singleton cardinality, and
//! cross-references between the ItemList and the Articles.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use ldgraph_shared::SCHEMA_CONTEXT;

use super::{
    CheckOutput, ValidationContext, article_nodes, entity_ref, graph_nodes, node_type, str_field,
};

/// Types that must appear exactly once per graph.
const SINGLETONS: [&str; 4] = ["Organization", "WebSite", "Blog", "ItemList"];

// ---------------------------------------------------------------------------
// Check 1: document
// ---------------------------------------------------------------------------

pub(crate) fn check_document(doc: &Value, _ctx: &ValidationContext<'_>, out: &mut CheckOutput) {
    if doc.is_null() {
        // Parse failure already recorded by the caller.
        return;
    }
    if !doc.is_object() {
        out.error(None, "document is not a JSON object");
        return;
    }

    match doc.get("@context") {
        Some(Value::String(ctx)) if ctx == SCHEMA_CONTEXT => {}
        Some(Value::String(ctx)) => {
            out.error(None, format!("@context is '{ctx}', expected '{SCHEMA_CONTEXT}'"));
        }
        Some(_) => out.error(None, "@context is not a string"),
        None => out.error(None, "missing @context"),
    }

    match doc.get("@graph") {
        Some(Value::Array(nodes)) => {
            for (i, node) in nodes.iter().enumerate() {
                if !node.is_object() {
                    out.error(Some(&format!("@graph[{i}]")), "node is not an object");
                } else if node_type(node).is_none() {
                    out.error(Some(&entity_ref(i, node)), "node has no string @type");
                }
            }
        }
        Some(_) => out.error(None, "@graph is not an array"),
        None => out.error(None, "missing @graph"),
    }
}

// ---------------------------------------------------------------------------
// Check 2: cardinality
// ---------------------------------------------------------------------------

pub(crate) fn check_cardinality(doc: &Value, _ctx: &ValidationContext<'_>, out: &mut CheckOutput) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for node in graph_nodes(doc) {
        if let Some(t) = node_type(node) {
            *counts.entry(t).or_default() += 1;
        }
    }

    for singleton in SINGLETONS {
        let n = counts.get(singleton).copied().unwrap_or(0);
        if n != 1 {
            out.error(None, format!("expected exactly one {singleton}, found {n}"));
        }
    }

    if article_nodes(doc).next().is_none() {
        out.error(None, "graph contains no Article");
    }
}

// ---------------------------------------------------------------------------
// Check 3: references
// ---------------------------------------------------------------------------

pub(crate) fn check_references(doc: &Value, _ctx: &ValidationContext<'_>, out: &mut CheckOutput) {
    // Unique @ids across the whole graph
    let mut seen_ids = HashSet::new();
    for (i, node) in graph_nodes(doc).iter().enumerate() {
        if let Some(id) = str_field(node, "@id") {
            if !seen_ids.insert(id) {
                out.error(Some(&entity_ref(i, node)), format!("duplicate @id '{id}'"));
            }
        }
    }

    // Unique Article URLs
    let mut article_urls: Vec<&str> = Vec::new();
    let mut seen_urls = HashSet::new();
    for (i, node) in article_nodes(doc) {
        match str_field(node, "url") {
            Some(url) => {
                if seen_urls.insert(url) {
                    article_urls.push(url);
                } else {
                    out.error(Some(&entity_ref(i, node)), format!("duplicate Article url '{url}'"));
                }
            }
            None => out.error(Some(&entity_ref(i, node)), "Article has no url"),
        }
    }

    let Some((list_index, list)) = graph_nodes(doc)
        .iter()
        .enumerate()
        .find(|(_, node)| node_type(node) == Some("ItemList"))
    else {
        // Absence is reported by the cardinality check.
        return;
    };
    let list_ref = entity_ref(list_index, list);

    let Some(elements) = list.get("itemListElement").and_then(Value::as_array) else {
        out.error(Some(&list_ref), "itemListElement is not an array");
        return;
    };

    match list.get("numberOfItems").and_then(Value::as_u64) {
        Some(n) if n as usize == elements.len() => {}
        Some(n) => out.error(
            Some(&list_ref),
            format!("numberOfItems is {n} but the list has {} entries", elements.len()),
        ),
        None => out.error(Some(&list_ref), "numberOfItems is missing or not a number"),
    }

    let mut listed = HashSet::new();
    let mut listed_urls: Vec<&str> = Vec::with_capacity(elements.len());
    let mut positions = Vec::with_capacity(elements.len());
    for (i, element) in elements.iter().enumerate() {
        match element.get("url").and_then(Value::as_str) {
            Some(url) => {
                if listed.insert(url) {
                    listed_urls.push(url);
                } else {
                    out.error(Some(&list_ref), format!("url '{url}' listed more than once"));
                }
            }
            None => out.error(Some(&list_ref), format!("entry {i} has no url")),
        }
        match element.get("position").and_then(Value::as_u64) {
            Some(p) => positions.push(p),
            None => out.error(Some(&list_ref), format!("entry {i} has no numeric position")),
        }
    }

    for &url in &article_urls {
        if !listed.contains(url) {
            out.error(Some(url), "Article is missing from the ItemList");
        }
    }
    for &url in &listed_urls {
        if !seen_urls.contains(url) {
            out.error(Some(url), "ItemList entry has no matching Article");
        }
    }

    if positions.len() == elements.len() {
        let expected: Vec<u64> = (1..=elements.len() as u64).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        if sorted != expected {
            out.error(Some(&list_ref), "positions are not 1..n");
        } else if positions != expected {
            out.warn(Some(&list_ref), "positions are out of order");
        }
    }
}
