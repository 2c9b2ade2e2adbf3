//! schema.org entity types that make up the output graph.
//!
//! Top-level graph nodes are variants of [`SchemaEntity`], discriminated by
//! `@type`. Nested references carry their own `@type` field so they always
//! serialize as fully typed objects, never as bare `@id` stubs.

use serde::{Deserialize, Serialize};

/// Vocabulary URI written to the `@context` key of every document.
pub const SCHEMA_CONTEXT: &str = "https://schema.org";

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The complete output document: `{ "@context": ..., "@graph": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonLdDocument {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@graph")]
    pub graph: Vec<SchemaEntity>,
}

impl JsonLdDocument {
    /// Wrap graph nodes with the schema.org context marker.
    pub fn new(graph: Vec<SchemaEntity>) -> Self {
        Self {
            context: SCHEMA_CONTEXT.to_string(),
            graph,
        }
    }

    /// All Article nodes (any subtype) in graph order.
    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        self.graph.iter().filter_map(SchemaEntity::as_article)
    }
}

/// A top-level graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum SchemaEntity {
    Organization(Organization),
    WebSite(WebSite),
    Blog(Blog),
    ItemList(ItemList),
    Article(Article),
    NewsArticle(Article),
}

impl SchemaEntity {
    /// Wrap an article under the `@type` its kind selects.
    pub fn article(kind: ArticleKind, article: Article) -> Self {
        match kind {
            ArticleKind::Article => Self::Article(article),
            ArticleKind::NewsArticle => Self::NewsArticle(article),
        }
    }

    /// The `@type` tag this node serializes with.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Organization(_) => "Organization",
            Self::WebSite(_) => "WebSite",
            Self::Blog(_) => "Blog",
            Self::ItemList(_) => "ItemList",
            Self::Article(_) => ArticleKind::Article.as_str(),
            Self::NewsArticle(_) => ArticleKind::NewsArticle.as_str(),
        }
    }

    /// The node's `@id`.
    pub fn id(&self) -> &str {
        match self {
            Self::Organization(o) => &o.id,
            Self::WebSite(w) => &w.id,
            Self::Blog(b) => &b.id,
            Self::ItemList(l) => &l.id,
            Self::Article(a) | Self::NewsArticle(a) => &a.id,
        }
    }

    /// Borrow the article payload if this is an Article of any subtype.
    pub fn as_article(&self) -> Option<&Article> {
        match self {
            Self::Article(a) | Self::NewsArticle(a) => Some(a),
            _ => None,
        }
    }
}

/// Article subtype selected by the category-keyword rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleKind {
    Article,
    NewsArticle,
}

impl ArticleKind {
    /// Every `@type` value that denotes an Article node.
    pub const ALL: [ArticleKind; 2] = [ArticleKind::Article, ArticleKind::NewsArticle];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::NewsArticle => "NewsArticle",
        }
    }

    /// Whether a raw `@type` string names an Article subtype.
    pub fn is_article_type(type_name: &str) -> bool {
        Self::ALL.iter().any(|k| k.as_str() == type_name)
    }
}

// ---------------------------------------------------------------------------
// Site singletons
// ---------------------------------------------------------------------------

/// The publishing organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    pub url: String,
    pub logo: ImageObject,
    pub same_as: Vec<String>,
}

/// The website as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSite {
    #[serde(rename = "@id")]
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub in_language: String,
    pub publisher: OrganizationRef,
}

/// The blog section every article belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "@id")]
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub in_language: String,
    pub publisher: OrganizationRef,
}

/// Index of every article in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemList {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    pub number_of_items: usize,
    pub item_list_order: String,
    pub item_list_element: Vec<ListItem>,
}

/// One ItemList entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(rename = "@type")]
    pub kind: String,
    pub position: usize,
    pub url: String,
    pub name: String,
}

impl ListItem {
    pub fn new(position: usize, url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: "ListItem".into(),
            position,
            url: url.into(),
            name: name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// A fully populated Article node. Every field is always serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "@id")]
    pub id: String,
    pub url: String,
    pub name: String,
    pub headline: String,
    pub alternative_headline: String,
    pub description: String,
    pub article_body: String,
    pub word_count: usize,
    pub time_required: String,
    pub estimated_reading_time: String,
    pub date_published: String,
    pub date_created: String,
    pub date_modified: String,
    pub in_language: String,
    pub genre: String,
    pub article_section: String,
    pub keywords: Vec<String>,
    pub about: Vec<Thing>,
    pub mentions: Vec<Thing>,
    pub image: ImageObject,
    pub thumbnail_url: String,
    pub primary_image_of_page: ImageObject,
    pub main_entity_of_page: WebPageRef,
    pub is_part_of: BlogRef,
    pub discussion_url: String,
    pub author: Person,
    pub publisher: OrganizationRef,
    pub copyright_holder: OrganizationRef,
    pub copyright_year: i32,
    pub learning_resource_type: String,
    pub educational_level: String,
    pub educational_use: String,
    pub audience: EducationalAudience,
    pub educational_alignment: Vec<AlignmentObject>,
    pub teaches: String,
    pub speakable: SpeakableSpecification,
}

// ---------------------------------------------------------------------------
// Nested typed objects
// ---------------------------------------------------------------------------

/// An image with explicit dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageObject {
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
    pub content_url: String,
    pub width: u32,
    pub height: u32,
}

impl ImageObject {
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        let url = url.into();
        Self {
            kind: "ImageObject".into(),
            id: None,
            content_url: url.clone(),
            url,
            width,
            height,
        }
    }

    /// Attach an `@id` so the image can be referenced as a page's primary image.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A named topic (`about` / `mentions` entries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thing {
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
}

impl Thing {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            kind: "Thing".into(),
            name: name.into(),
        }
    }
}

/// Article author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Person {
    pub fn new(name: impl Into<String>, url: Option<String>) -> Self {
        Self {
            kind: "Person".into(),
            name: name.into(),
            url,
        }
    }
}

/// Fully typed reference to the publishing organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRef {
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    pub url: String,
    pub logo: ImageObject,
}

impl From<&Organization> for OrganizationRef {
    fn from(org: &Organization) -> Self {
        Self {
            kind: "Organization".into(),
            id: org.id.clone(),
            name: org.name.clone(),
            url: org.url.clone(),
            logo: org.logo.clone(),
        }
    }
}

/// Parent page reference (`mainEntityOfPage`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebPageRef {
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(rename = "@id")]
    pub id: String,
    pub url: String,
    pub name: String,
}

impl WebPageRef {
    pub fn new(id: impl Into<String>, url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: "WebPage".into(),
            id: id.into(),
            url: url.into(),
            name: name.into(),
        }
    }
}

/// Parent collection reference (`isPartOf`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogRef {
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    pub url: String,
}

impl From<&Blog> for BlogRef {
    fn from(blog: &Blog) -> Self {
        Self {
            kind: "Blog".into(),
            id: blog.id.clone(),
            name: blog.name.clone(),
            url: blog.url.clone(),
        }
    }
}

/// Intended audience of educational content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationalAudience {
    #[serde(rename = "@type")]
    pub kind: String,
    pub educational_role: String,
    pub audience_type: String,
}

impl EducationalAudience {
    pub fn new(role: impl Into<String>, audience_type: impl Into<String>) -> Self {
        Self {
            kind: "EducationalAudience".into(),
            educational_role: role.into(),
            audience_type: audience_type.into(),
        }
    }
}

/// Alignment of content to a topic it teaches or requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentObject {
    #[serde(rename = "@type")]
    pub kind: String,
    pub alignment_type: String,
    pub target_name: String,
    pub educational_framework: String,
}

impl AlignmentObject {
    pub fn new(
        alignment_type: impl Into<String>,
        target_name: impl Into<String>,
        framework: impl Into<String>,
    ) -> Self {
        Self {
            kind: "AlignmentObject".into(),
            alignment_type: alignment_type.into(),
            target_name: target_name.into(),
            educational_framework: framework.into(),
        }
    }
}

/// Parts of the page suitable for text-to-speech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakableSpecification {
    #[serde(rename = "@type")]
    pub kind: String,
    pub css_selector: Vec<String>,
}

impl SpeakableSpecification {
    pub fn new(selectors: Vec<String>) -> Self {
        Self {
            kind: "SpeakableSpecification".into(),
            css_selector: selectors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org() -> Organization {
        Organization {
            id: "https://example.com/#organization".into(),
            name: "Example".into(),
            url: "https://example.com".into(),
            logo: ImageObject::new("https://example.com/logo.png", 512, 512),
            same_as: vec![],
        }
    }

    #[test]
    fn entity_serializes_with_type_tag() {
        let json = serde_json::to_value(SchemaEntity::Organization(org())).expect("serialize");
        assert_eq!(json["@type"], "Organization");
        assert_eq!(json["@id"], "https://example.com/#organization");
        assert_eq!(json["logo"]["@type"], "ImageObject");
        assert!(json["sameAs"].is_array());
    }

    #[test]
    fn organization_ref_is_fully_typed() {
        let reference = OrganizationRef::from(&org());
        let json = serde_json::to_value(&reference).expect("serialize");
        assert_eq!(json["@type"], "Organization");
        assert_eq!(json["name"], "Example");
        assert_eq!(json["logo"]["width"], 512);
    }

    #[test]
    fn image_object_without_id_omits_it() {
        let json = serde_json::to_value(ImageObject::new("https://x.test/a.jpg", 10, 20))
            .expect("serialize");
        assert!(json.get("@id").is_none());
        assert_eq!(json["contentUrl"], "https://x.test/a.jpg");

        let with_id = ImageObject::new("https://x.test/a.jpg", 10, 20).with_id("p#primaryimage");
        let json = serde_json::to_value(with_id).expect("serialize");
        assert_eq!(json["@id"], "p#primaryimage");
    }

    #[test]
    fn document_roundtrips_through_json() {
        let doc = JsonLdDocument::new(vec![SchemaEntity::Organization(org())]);
        let text = serde_json::to_string(&doc).expect("serialize");
        assert!(text.contains("\"@context\":\"https://schema.org\""));
        let parsed: JsonLdDocument = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(parsed, doc);
    }

    #[test]
    fn article_type_names() {
        assert!(ArticleKind::is_article_type("NewsArticle"));
        assert!(ArticleKind::is_article_type("Article"));
        assert!(!ArticleKind::is_article_type("BlogPosting"));
    }
}
