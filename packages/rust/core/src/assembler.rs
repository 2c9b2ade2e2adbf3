//! Graph assembler.
//!
//! Merges the site singletons with the synthesized Articles into one
//! JSON-LD document, keeps the first Article per canonical URL, and builds
//! the ItemList from the survivors. Also owns the output helpers: JSON
//! serialization, HTML script embedding and the document digest.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use ldgraph_shared::{ItemList, JsonLdDocument, LdGraphError, ListItem, Result, SchemaEntity};

use crate::site::SiteEntities;
use crate::synthesizer::Synthesized;

/// `itemListOrder` of the generated ItemList.
const ITEM_LIST_ORDER: &str = "https://schema.org/ItemListUnordered";

/// A later record that repeated an already-kept canonical URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateArticle {
    pub url: String,
    /// Row of the dropped record.
    pub row: usize,
    /// Row of the record that was kept.
    pub kept_row: usize,
}

/// Output from a successful assembly.
#[derive(Debug, Clone)]
pub struct AssembledGraph {
    pub document: JsonLdDocument,
    pub duplicates: Vec<DuplicateArticle>,
}

/// Assemble the graph: Organization, WebSite, Blog, ItemList, then Articles
/// in input order.
#[instrument(skip_all, fields(articles = articles.len()))]
pub fn assemble(site: &SiteEntities, articles: Vec<Synthesized>) -> AssembledGraph {
    let mut kept: Vec<Synthesized> = Vec::with_capacity(articles.len());
    let mut kept_rows: HashMap<String, usize> = HashMap::new();
    let mut duplicates = Vec::new();

    for synthesized in articles {
        let url = synthesized.article.url.clone();
        if let Some(&kept_row) = kept_rows.get(&url) {
            warn!(%url, row = synthesized.row, kept_row, "duplicate article URL, keeping first");
            duplicates.push(DuplicateArticle {
                url,
                row: synthesized.row,
                kept_row,
            });
            continue;
        }
        kept_rows.insert(url, synthesized.row);
        kept.push(synthesized);
    }

    let item_list = build_item_list(site, &kept);

    let mut graph = Vec::with_capacity(kept.len() + 4);
    graph.push(SchemaEntity::Organization(site.organization.clone()));
    graph.push(SchemaEntity::WebSite(site.website.clone()));
    graph.push(SchemaEntity::Blog(site.blog.clone()));
    graph.push(SchemaEntity::ItemList(item_list));
    graph.extend(kept.into_iter().map(Synthesized::into_entity));

    info!(
        nodes = graph.len(),
        duplicates = duplicates.len(),
        "graph assembled"
    );

    AssembledGraph {
        document: JsonLdDocument::new(graph),
        duplicates,
    }
}

fn build_item_list(site: &SiteEntities, articles: &[Synthesized]) -> ItemList {
    let item_list_element: Vec<ListItem> = articles
        .iter()
        .enumerate()
        .map(|(i, s)| ListItem::new(i + 1, &s.article.url, &s.article.name))
        .collect();

    ItemList {
        id: site.item_list_id.clone(),
        name: site.item_list_name.clone(),
        number_of_items: item_list_element.len(),
        item_list_order: ITEM_LIST_ORDER.to_string(),
        item_list_element,
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

/// Pretty-printed JSON for the document.
pub fn to_json(document: &JsonLdDocument) -> Result<String> {
    serde_json::to_string_pretty(document).map_err(|e| LdGraphError::Serialization(e.to_string()))
}

/// Wrap serialized JSON-LD in a script tag for embedding in a page.
///
/// `</` is escaped so article text can never close the script element early.
pub fn embed_html(json: &str) -> String {
    let escaped = json.replace("</", "<\\/");
    format!("<script type=\"application/ld+json\">\n{escaped}\n</script>\n")
}

/// Hex SHA-256 of the serialized document.
pub fn digest(json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use ldgraph_shared::{AppConfig, ArticleKind, ContentRecord};

    use super::*;
    use crate::synthesizer::Synthesizer;

    fn synthesize_all(records: &[ContentRecord]) -> (SiteEntities, Vec<Synthesized>) {
        let config = AppConfig::default();
        let site = SiteEntities::from_config(&config.site);
        let sanitizer = ldgraph_sanitizer::Sanitizer::new(&config.sanitizer).unwrap();
        let synthesizer = Synthesizer::new(&config, &site, &sanitizer).unwrap();
        let out = records.iter().map(|r| synthesizer.synthesize(r).unwrap()).collect();
        (site, out)
    }

    fn record(row: usize, slug: &str) -> ContentRecord {
        ContentRecord {
            row,
            title: format!("Post {slug}"),
            url: format!("https://www.example-photo-school.com/blog/{slug}"),
            body: format!("Body of {slug}."),
            published: "2024-01-01".into(),
            ..ContentRecord::default()
        }
    }

    #[test]
    fn singletons_come_first() {
        let (site, articles) = synthesize_all(&[record(1, "a")]);
        let doc = assemble(&site, articles).document;
        let types: Vec<&str> = doc.graph.iter().map(SchemaEntity::type_name).collect();
        assert_eq!(types, vec!["Organization", "WebSite", "Blog", "ItemList", "Article"]);
        assert_eq!(doc.context, "https://schema.org");
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let mut b2 = record(3, "b/");
        b2.title = "Post b again".into();
        let (site, articles) = synthesize_all(&[record(1, "a"), record(2, "b"), b2]);
        let graph = assemble(&site, articles);

        assert_eq!(graph.document.articles().count(), 2);
        assert_eq!(graph.duplicates.len(), 1);
        assert_eq!(graph.duplicates[0].row, 3);
        assert_eq!(graph.duplicates[0].kept_row, 2);

        let b = graph
            .document
            .articles()
            .find(|a| a.url.ends_with("/b"))
            .unwrap();
        assert_eq!(b.name, "Post b");
    }

    #[test]
    fn item_list_mirrors_articles() {
        let (site, articles) = synthesize_all(&[record(1, "a"), record(2, "b"), record(3, "b")]);
        let doc = assemble(&site, articles).document;

        let SchemaEntity::ItemList(list) = &doc.graph[3] else {
            panic!("expected ItemList at index 3");
        };
        assert_eq!(list.number_of_items, 2);
        let positions: Vec<usize> = list.item_list_element.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![1, 2]);
        let urls: Vec<&str> = list.item_list_element.iter().map(|e| e.url.as_str()).collect();
        let article_urls: Vec<&str> = doc.articles().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, article_urls);
    }

    #[test]
    fn empty_input_still_has_singletons() {
        let (site, articles) = synthesize_all(&[]);
        let doc = assemble(&site, articles).document;
        assert_eq!(doc.graph.len(), 4);
        assert_eq!(doc.articles().count(), 0);
    }

    #[test]
    fn news_articles_keep_their_type() {
        let mut news = record(1, "n");
        news.tags = vec!["announcement".into()];
        let (site, articles) = synthesize_all(&[news]);
        assert_eq!(articles[0].kind, ArticleKind::NewsArticle);
        let doc = assemble(&site, articles).document;
        assert_eq!(doc.graph[4].type_name(), "NewsArticle");
    }

    #[test]
    fn embed_escapes_closing_tags() {
        let html = embed_html(r#"{"articleBody":"a </script> b"}"#);
        assert!(html.starts_with("<script type=\"application/ld+json\">"));
        assert_eq!(html.matches("</script>").count(), 1);
        assert!(html.contains(r"<\/script>"));
    }

    #[test]
    fn digest_is_stable() {
        let (site, articles) = synthesize_all(&[record(1, "a")]);
        let json = to_json(&assemble(&site, articles).document).unwrap();
        let (site, articles) = synthesize_all(&[record(1, "a")]);
        let again = to_json(&assemble(&site, articles).document).unwrap();
        assert_eq!(digest(&json), digest(&again));
        assert_eq!(digest(&json).len(), 64);
    }
}
