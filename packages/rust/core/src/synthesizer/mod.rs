//! Entity synthesizer: one fully populated Article per content record.
//!
//! Every contractual field is either derived from the record or defaulted
//! from configuration, so two runs over the same records produce the same
//! Article. Nothing here reads the clock or the network.

mod dates;
mod media;
mod text;

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use tracing::{debug, instrument};

use ldgraph_sanitizer::{Sanitizer, word_count};
use ldgraph_shared::{
    AlignmentObject, AppConfig, Article, ArticleKind, ContentRecord, EducationalAudience,
    ImageObject, LdGraphError, Person, Result, SchemaEntity, SiteConfig, SpeakableSpecification,
    SynthesisConfig, Thing, WebPageRef, ids,
};

use crate::site::SiteEntities;

pub(crate) use dates::parse_date;

/// Output of synthesizing one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesized {
    /// Source row the article came from.
    pub row: usize,
    pub kind: ArticleKind,
    pub article: Article,
}

impl Synthesized {
    pub fn into_entity(self) -> SchemaEntity {
        SchemaEntity::article(self.kind, self.article)
    }
}

/// How a record's labels classify it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Classification {
    news: bool,
    assignment: bool,
}

/// Turns [`ContentRecord`]s into Articles.
pub struct Synthesizer<'a> {
    site: &'a SiteEntities,
    site_config: &'a SiteConfig,
    rules: &'a SynthesisConfig,
    sanitizer: &'a Sanitizer,
    fallback_date: DateTime<Utc>,
    news: Option<Regex>,
    assignment: Option<Regex>,
}

impl<'a> Synthesizer<'a> {
    /// The configured fallback date must itself parse.
    pub fn new(config: &'a AppConfig, site: &'a SiteEntities, sanitizer: &'a Sanitizer) -> Result<Self> {
        let fallback_date = parse_date(&config.synthesis.fallback_date).ok_or_else(|| {
            LdGraphError::config(format!(
                "synthesis.fallback_date '{}' is not a recognized date",
                config.synthesis.fallback_date
            ))
        })?;

        Ok(Self {
            site,
            site_config: &config.site,
            rules: &config.synthesis,
            sanitizer,
            fallback_date,
            news: keyword_matcher(&config.synthesis.news_keywords)?,
            assignment: keyword_matcher(&config.synthesis.assignment_markers)?,
        })
    }

    /// Build the Article for one record.
    ///
    /// Fails only when the record has no title or no usable URL; the caller
    /// skips such records.
    #[instrument(level = "debug", skip_all, fields(row = record.row))]
    pub fn synthesize(&self, record: &ContentRecord) -> Result<Synthesized> {
        let title = record.title.trim();
        if title.is_empty() {
            return Err(LdGraphError::record(record.row, "missing title"));
        }
        let url = ids::normalize_url(&record.url).ok_or_else(|| {
            if record.url.trim().is_empty() {
                LdGraphError::record(record.row, "missing URL")
            } else {
                LdGraphError::record(record.row, format!("invalid URL '{}'", record.url.trim()))
            }
        })?;

        let class = self.classify(record);
        let kind = if class.news {
            ArticleKind::NewsArticle
        } else {
            ArticleKind::Article
        };

        // Text
        let body = self.sanitizer.sanitize(&record.body, title);
        let words = word_count(&body);
        let (headline, truncated) = text::truncate_at_word(title, self.rules.headline_max_chars);
        let alternative_headline = if truncated {
            title.to_string()
        } else {
            format!("{title} | {}", self.site.blog.name)
        };
        let description = self.description(record, &body, title);

        // Durations
        let reading_minutes = words.div_ceil(self.rules.words_per_minute).max(1);
        let total_minutes = if class.assignment {
            reading_minutes + self.rules.assignment_practice_minutes
        } else {
            reading_minutes
        };

        // Dates
        let published = parse_date(&record.published).unwrap_or(self.fallback_date);
        let created = record.created.as_deref().and_then(parse_date).unwrap_or(published);
        let modified = record.modified.as_deref().and_then(parse_date).unwrap_or(published);

        // Media
        let image = self.image(record);
        let thumbnail_url = record
            .image_url
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        let primary_image_of_page = image.clone().with_id(ids::primary_image_id(&url));

        // Taxonomy
        let categories = dedup(&record.categories);
        let tags = dedup(&record.tags);
        let keywords = dedup(&[tags.clone(), categories.clone()].concat());

        let genre = if class.news {
            "News".to_string()
        } else if class.assignment {
            "Assignment".to_string()
        } else {
            self.rules.default_genre.clone()
        };
        let article_section = categories
            .first()
            .cloned()
            .unwrap_or_else(|| self.rules.default_section.clone());

        let author = match record.author.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Person::new(name, None),
            _ => Person::new(
                &self.site_config.default_author,
                self.site_config.default_author_url.clone(),
            ),
        };

        let educational_alignment = categories
            .iter()
            .map(|c| AlignmentObject::new("teaches", c, &self.rules.educational_framework))
            .collect();

        let (learning_resource_type, educational_use, audience, teaches) = if class.assignment {
            let teaches = self
                .rules
                .teaches_template
                .replace("{topic}", &self.topic(record))
                .replace("{title}", title);
            (
                "Practice Assignment",
                "Assignment",
                EducationalAudience::new("Student", "Student"),
                teaches,
            )
        } else {
            (
                "Article",
                "Self-study",
                EducationalAudience::new("Learner", "Learner"),
                String::new(),
            )
        };

        debug!(
            url = %url,
            kind = kind.as_str(),
            words,
            assignment = class.assignment,
            "synthesized article"
        );

        let article = Article {
            id: ids::article_id(&url),
            name: title.to_string(),
            headline,
            alternative_headline,
            description,
            article_body: body,
            word_count: words,
            time_required: format!("PT{total_minutes}M"),
            estimated_reading_time: format!("PT{reading_minutes}M"),
            date_published: dates::format_date(&published),
            date_created: dates::format_date(&created),
            date_modified: dates::format_date(&modified),
            in_language: self.site_config.language.clone(),
            genre,
            article_section,
            keywords,
            about: categories.iter().map(Thing::new).collect(),
            mentions: tags.iter().map(Thing::new).collect(),
            image,
            thumbnail_url,
            primary_image_of_page,
            main_entity_of_page: WebPageRef::new(ids::webpage_id(&url), &url, title),
            is_part_of: self.site.blog_ref(),
            discussion_url: ids::discussion_url(&url),
            author,
            publisher: self.site.publisher(),
            copyright_holder: self.site.publisher(),
            copyright_year: published.year(),
            learning_resource_type: learning_resource_type.to_string(),
            educational_level: self.rules.default_educational_level.clone(),
            educational_use: educational_use.to_string(),
            audience,
            educational_alignment,
            teaches,
            speakable: SpeakableSpecification::new(self.rules.speakable_selectors.clone()),
            url,
        };

        Ok(Synthesized {
            row: record.row,
            kind,
            article,
        })
    }

    fn classify(&self, record: &ContentRecord) -> Classification {
        let mut class = Classification::default();
        for label in record.labels() {
            class.news |= matches(self.news.as_ref(), label);
            class.assignment |= matches(self.assignment.as_ref(), label);
        }
        class
    }

    /// Excerpt, else the start of the body, else the title.
    fn description(&self, record: &ContentRecord, body: &str, title: &str) -> String {
        let max = self.rules.description_max_chars;

        if let Some(excerpt) = record.excerpt.as_deref().map(text::single_line) {
            if !excerpt.is_empty() {
                return text::truncate_at_word(&excerpt, max).0;
            }
        }

        let flat = text::single_line(body);
        if !flat.is_empty() {
            return text::truncate_at_word(&flat, max).0;
        }

        title.to_string()
    }

    /// Record image with inferred or default dimensions, else the site default image.
    fn image(&self, record: &ContentRecord) -> ImageObject {
        let site = self.site_config;
        let url = record
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(&site.default_image_url);

        let (width, height) = media::dimensions_from_url(url)
            .unwrap_or((site.default_image_width, site.default_image_height));
        ImageObject::new(url, width, height)
    }

    /// Subject of an assignment: the first label that is not itself a
    /// classification marker.
    fn topic(&self, record: &ContentRecord) -> String {
        record
            .labels()
            .map(str::trim)
            .find(|label| {
                !label.is_empty()
                    && !matches(self.assignment.as_ref(), label)
                    && !matches(self.news.as_ref(), label)
            })
            .map_or_else(|| self.rules.default_genre.clone(), str::to_string)
    }
}

/// Case-insensitive whole-word matcher (plural allowed) for a keyword list;
/// `None` when the list is empty.
fn keyword_matcher(keywords: &[String]) -> Result<Option<Regex>> {
    let mut words: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(|k| regex::escape(k).replace(' ', r"\s+"))
        .collect();
    if words.is_empty() {
        return Ok(None);
    }
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));

    Regex::new(&format!(r"(?i)\b(?:{})s?\b", words.join("|")))
        .map(Some)
        .map_err(|e| LdGraphError::config(format!("invalid synthesis keyword list: {e}")))
}

fn matches(matcher: Option<&Regex>, label: &str) -> bool {
    matcher.is_some_and(|re| re.is_match(label))
}

/// Trimmed, non-empty, case-insensitively unique, order preserved.
fn dedup(items: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use regex::Regex;

    use super::*;

    static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^PT[0-9]+M$").unwrap());

    struct Fixture {
        config: AppConfig,
        site: SiteEntities,
        sanitizer: Sanitizer,
    }

    impl Fixture {
        fn new() -> Self {
            let config = AppConfig::default();
            let site = SiteEntities::from_config(&config.site);
            let sanitizer = Sanitizer::new(&config.sanitizer).unwrap();
            Self {
                config,
                site,
                sanitizer,
            }
        }

        fn synthesize(&self, record: &ContentRecord) -> Result<Synthesized> {
            Synthesizer::new(&self.config, &self.site, &self.sanitizer)
                .unwrap()
                .synthesize(record)
        }
    }

    fn record() -> ContentRecord {
        ContentRecord {
            row: 1,
            title: "Understanding Aperture".into(),
            url: "https://www.example-photo-school.com/blog/understanding-aperture/".into(),
            body: "Aperture controls depth of field. Wide apertures blur the background.".into(),
            published: "2024-03-05 10:00:00".into(),
            categories: vec!["Exposure".into(), "Camera Basics".into()],
            tags: vec!["aperture".into(), "depth of field".into(), "Exposure".into()],
            image_url: Some("https://www.example-photo-school.com/uploads/aperture-800x533.jpg".into()),
            ..ContentRecord::default()
        }
    }

    #[test]
    fn identity_is_derived_from_normalized_url() {
        let out = Fixture::new().synthesize(&record()).unwrap();
        let a = &out.article;
        let u = "https://www.example-photo-school.com/blog/understanding-aperture";
        assert_eq!(a.url, u);
        assert_eq!(a.id, format!("{u}#article"));
        assert_eq!(a.main_entity_of_page.id, format!("{u}#webpage"));
        assert_eq!(a.primary_image_of_page.id.as_deref(), Some(format!("{u}#primaryimage").as_str()));
        assert_eq!(a.discussion_url, format!("{u}#comments"));
        assert_eq!(a.is_part_of.id, "https://www.example-photo-school.com/blog#blog");
    }

    #[test]
    fn durations_and_dates() {
        let out = Fixture::new().synthesize(&record()).unwrap();
        let a = &out.article;
        assert_eq!(a.word_count, 10);
        assert_eq!(a.estimated_reading_time, "PT1M");
        assert_eq!(a.time_required, "PT1M");
        assert_eq!(a.date_published, "2024-03-05T10:00:00Z");
        assert_eq!(a.date_created, a.date_published);
        assert_eq!(a.date_modified, a.date_published);
        assert_eq!(a.copyright_year, 2024);
    }

    #[test]
    fn reading_time_rounds_up() {
        let mut r = record();
        r.body = "word ".repeat(401);
        let out = Fixture::new().synthesize(&r).unwrap();
        assert_eq!(out.article.estimated_reading_time, "PT3M");
        assert!(DURATION_RE.is_match(&out.article.time_required));
    }

    #[test]
    fn date_overrides_and_fallback() {
        let mut r = record();
        r.published = "not a date".into();
        r.modified = Some("2024-06-01".into());
        let a = Fixture::new().synthesize(&r).unwrap().article;
        assert_eq!(a.date_published, "2020-01-01T00:00:00Z");
        assert_eq!(a.date_created, "2020-01-01T00:00:00Z");
        assert_eq!(a.date_modified, "2024-06-01T00:00:00Z");
    }

    #[test]
    fn taxonomy_fields() {
        let a = Fixture::new().synthesize(&record()).unwrap().article;
        assert_eq!(a.keywords, vec!["aperture", "depth of field", "Exposure", "Camera Basics"]);
        assert_eq!(a.about.len(), 2);
        assert_eq!(a.about[0].name, "Exposure");
        assert_eq!(a.mentions.len(), 3);
        assert_eq!(a.article_section, "Exposure");
        assert_eq!(a.genre, "Photography");
        assert_eq!(a.educational_alignment.len(), 2);
        assert_eq!(a.educational_alignment[0].target_name, "Exposure");
    }

    #[test]
    fn generic_educational_metadata() {
        let out = Fixture::new().synthesize(&record()).unwrap();
        let a = &out.article;
        assert_eq!(out.kind, ArticleKind::Article);
        assert_eq!(a.learning_resource_type, "Article");
        assert_eq!(a.educational_level, "Beginner");
        assert_eq!(a.educational_use, "Self-study");
        assert_eq!(a.audience.educational_role, "Learner");
        assert_eq!(a.teaches, "");
    }

    #[test]
    fn assignment_metadata_and_practice_time() {
        let mut r = record();
        r.categories = vec!["Practice Assignment".into(), "Composition".into()];
        let a = Fixture::new().synthesize(&r).unwrap().article;
        assert_eq!(a.learning_resource_type, "Practice Assignment");
        assert_eq!(a.educational_use, "Assignment");
        assert_eq!(a.audience.educational_role, "Student");
        assert_eq!(a.genre, "Assignment");
        assert_eq!(
            a.teaches,
            "How to apply Composition techniques in practice: Understanding Aperture"
        );
        assert_eq!(a.estimated_reading_time, "PT1M");
        assert_eq!(a.time_required, "PT31M");
    }

    #[test]
    fn news_keyword_selects_news_article() {
        let mut r = record();
        r.categories = vec!["School News".into()];
        let out = Fixture::new().synthesize(&r).unwrap();
        assert_eq!(out.kind, ArticleKind::NewsArticle);
        assert_eq!(out.article.genre, "News");
        assert_eq!(out.into_entity().type_name(), "NewsArticle");
    }

    #[test]
    fn news_keywords_match_whole_words_only() {
        let fixture = Fixture::new();
        for label in ["Lens Compression", "Newsletter Design", "Impressionism"] {
            let mut r = record();
            r.categories = vec![label.into()];
            let out = fixture.synthesize(&r).unwrap();
            assert_eq!(out.kind, ArticleKind::Article, "{label}");
            assert_eq!(out.article.genre, "Photography", "{label}");
        }

        let mut r = record();
        r.tags = vec!["Press".into()];
        assert_eq!(fixture.synthesize(&r).unwrap().kind, ArticleKind::NewsArticle);
    }

    #[test]
    fn assignment_markers_accept_plurals() {
        let mut r = record();
        r.categories = vec!["Practice Assignments".into(), "Lighting".into()];
        let a = Fixture::new().synthesize(&r).unwrap().article;
        assert_eq!(a.learning_resource_type, "Practice Assignment");
        assert!(a.teaches.contains("Lighting"));
    }

    #[test]
    fn image_dimensions_from_suffix() {
        let a = Fixture::new().synthesize(&record()).unwrap().article;
        assert_eq!((a.image.width, a.image.height), (800, 533));
        assert_eq!(a.thumbnail_url, a.image.url);
        assert_eq!(a.primary_image_of_page.url, a.image.url);
    }

    #[test]
    fn missing_image_uses_site_default() {
        let mut r = record();
        r.image_url = None;
        let a = Fixture::new().synthesize(&r).unwrap().article;
        assert_eq!(a.image.url, "https://www.example-photo-school.com/default-share.jpg");
        assert_eq!((a.image.width, a.image.height), (1200, 630));
        assert_eq!(a.thumbnail_url, "");
        assert_eq!(a.primary_image_of_page.kind, "ImageObject");
    }

    #[test]
    fn headline_truncation_and_alternative() {
        let mut r = record();
        r.title = "A ".repeat(60).trim().to_string() + " ending";
        let a = Fixture::new().synthesize(&r).unwrap().article;
        assert!(a.headline.chars().count() <= 110);
        assert_eq!(a.alternative_headline, r.title);

        let a = Fixture::new().synthesize(&record()).unwrap().article;
        assert_eq!(a.headline, "Understanding Aperture");
        assert_eq!(a.alternative_headline, "Understanding Aperture | Example Photo School Blog");
    }

    #[test]
    fn description_prefers_excerpt_then_body_then_title() {
        let mut r = record();
        r.excerpt = Some("  A short   excerpt. ".into());
        assert_eq!(Fixture::new().synthesize(&r).unwrap().article.description, "A short excerpt.");

        let a = Fixture::new().synthesize(&record()).unwrap().article;
        assert!(a.description.starts_with("Aperture controls depth of field."));

        let mut r = record();
        r.body = String::new();
        assert_eq!(
            Fixture::new().synthesize(&r).unwrap().article.description,
            "Understanding Aperture"
        );
    }

    #[test]
    fn author_falls_back_to_site_default() {
        let a = Fixture::new().synthesize(&record()).unwrap().article;
        assert_eq!(a.author.name, "Example Photo School");
        assert_eq!(a.author.kind, "Person");

        let mut r = record();
        r.author = Some("Jane Doe".into());
        assert_eq!(Fixture::new().synthesize(&r).unwrap().article.author.name, "Jane Doe");
    }

    #[test]
    fn missing_title_or_url_is_a_record_error() {
        let mut r = record();
        r.title = "  ".into();
        let err = Fixture::new().synthesize(&r).unwrap_err();
        assert!(matches!(err, LdGraphError::Record { row: 1, .. }));

        let mut r = record();
        r.url = "not-a-url".into();
        let err = Fixture::new().synthesize(&r).unwrap_err();
        assert!(err.to_string().contains("invalid URL"));
    }

    #[test]
    fn synthesis_is_deterministic() {
        let fixture = Fixture::new();
        assert_eq!(fixture.synthesize(&record()).unwrap(), fixture.synthesize(&record()).unwrap());
    }

    #[test]
    fn unparsable_fallback_date_is_config_error() {
        let mut config = AppConfig::default();
        config.synthesis.fallback_date = "someday".into();
        let site = SiteEntities::from_config(&config.site);
        let sanitizer = Sanitizer::new(&config.sanitizer).unwrap();
        assert!(Synthesizer::new(&config, &site, &sanitizer).is_err());
    }
}
