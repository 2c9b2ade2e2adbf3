//! Input-side domain types.

use serde::{Deserialize, Serialize};

/// One parsed input row describing one published article.
///
/// Every field is kept as the raw string the export contained; interpretation
/// (URL normalization, date parsing, defaults) happens in the synthesizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// 1-based data row number in the source file (header excluded).
    pub row: usize,
    /// Article title.
    pub title: String,
    /// Canonical URL as exported.
    pub url: String,
    /// Raw body text or HTML. May be empty (hydrated later from a content store).
    #[serde(default)]
    pub body: String,
    /// Publish date as exported.
    #[serde(default)]
    pub published: String,
    /// Created-date override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Modified-date override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Category names in export order.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Tag names in export order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Featured image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Hand-written excerpt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Author display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl ContentRecord {
    /// Categories followed by tags, as the record lists them.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .chain(self.tags.iter())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_chain_categories_then_tags() {
        let record = ContentRecord {
            categories: vec!["Lighting".into()],
            tags: vec!["Practice Assignment".into(), "Portraits".into()],
            ..Default::default()
        };
        let labels: Vec<&str> = record.labels().collect();
        assert_eq!(labels, vec!["Lighting", "Practice Assignment", "Portraits"]);
    }

    #[test]
    fn record_deserializes_with_defaults() {
        let json = r#"{"row": 1, "title": "T", "url": "https://example.com/t"}"#;
        let record: ContentRecord = serde_json::from_str(json).expect("deserialize");
        assert!(record.body.is_empty());
        assert!(record.categories.is_empty());
        assert!(record.image_url.is_none());
    }
}
