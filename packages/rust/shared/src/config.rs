//! Application configuration for ldgraph.
//!
//! User config lives at `~/.ldgraph/ldgraph.toml`; `--config <path>` overrides
//! it. Every section carries serde defaults, so an empty file is a valid
//! configuration describing the stock site.
//!
//! Site boilerplate and the pollution lexicon live here rather than in
//! module-level constants so the pipeline can run against any site.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LdGraphError, Result};
use crate::ids::normalize_url;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "ldgraph.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".ldgraph";

// ---------------------------------------------------------------------------
// Config structs (matching ldgraph.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site boilerplate for the singleton entities.
    #[serde(default)]
    pub site: SiteConfig,

    /// Text sanitizer vocabulary and pollution lexicon.
    #[serde(default)]
    pub sanitizer: SanitizerConfig,

    /// Article derivation rules.
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Validation pipeline limits.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Collaborator endpoints and timeouts.
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl AppConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        normalize_url(&self.site.url).ok_or_else(|| {
            LdGraphError::config(format!("site.url '{}' is not an absolute URL", self.site.url))
        })?;
        if let Some(blog_url) = &self.site.blog_url {
            normalize_url(blog_url).ok_or_else(|| {
                LdGraphError::config(format!("site.blog_url '{blog_url}' is not an absolute URL"))
            })?;
        }
        if self.synthesis.words_per_minute == 0 {
            return Err(LdGraphError::config("synthesis.words_per_minute must be positive"));
        }
        if self.sanitizer.window_chars == 0 {
            return Err(LdGraphError::config("sanitizer.window_chars must be positive"));
        }
        if self.validation.max_findings_per_check == 0 {
            return Err(LdGraphError::config(
                "validation.max_findings_per_check must be positive",
            ));
        }
        Ok(())
    }
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root URL of the site.
    pub url: String,
    /// Organization and website name.
    pub name: String,
    /// Website description.
    pub description: String,
    /// Blog root URL. Defaults to `<url>/blog`.
    pub blog_url: Option<String>,
    /// Blog name.
    pub blog_name: String,
    /// Blog description.
    pub blog_description: String,
    /// BCP 47 language tag for all entities.
    pub language: String,
    /// Organization logo.
    pub logo_url: String,
    pub logo_width: u32,
    pub logo_height: u32,
    /// Image used when a record has none.
    pub default_image_url: String,
    /// Dimensions assumed when an image URL does not encode its own.
    pub default_image_width: u32,
    pub default_image_height: u32,
    /// Social profile URLs for the organization's `sameAs`.
    pub same_as: Vec<String>,
    /// Author used when a record names none.
    pub default_author: String,
    pub default_author_url: Option<String>,
    /// Name of the ItemList entity.
    pub item_list_name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "https://www.example-photo-school.com".into(),
            name: "Example Photo School".into(),
            description: "Online photography courses, articles and practice assignments.".into(),
            blog_url: None,
            blog_name: "Example Photo School Blog".into(),
            blog_description: "Articles, tutorials and assignments for photographers.".into(),
            language: "en-US".into(),
            logo_url: "https://www.example-photo-school.com/logo.png".into(),
            logo_width: 600,
            logo_height: 60,
            default_image_url: "https://www.example-photo-school.com/default-share.jpg".into(),
            default_image_width: 1200,
            default_image_height: 630,
            same_as: Vec::new(),
            default_author: "Example Photo School".into(),
            default_author_url: None,
            item_list_name: "All Articles".into(),
        }
    }
}

impl SiteConfig {
    /// Normalized site URL. Falls back to the raw value when it cannot be normalized
    /// (rejected earlier by [`AppConfig::validate`]).
    pub fn site_url(&self) -> String {
        normalize_url(&self.url).unwrap_or_else(|| self.url.trim_end_matches('/').to_string())
    }

    /// Normalized blog URL, defaulting to `<site>/blog`.
    pub fn blog_url(&self) -> String {
        self.blog_url
            .as_deref()
            .and_then(normalize_url)
            .unwrap_or_else(|| format!("{}/blog", self.site_url()))
    }
}

/// `[sanitizer]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Size of the prefix window searched for the content start, in characters.
    pub window_chars: usize,
    /// Section headers that open editorial content.
    pub section_headers: Vec<String>,
    /// Nouns accepted in the generic `This <noun>` opener.
    pub opener_nouns: Vec<String>,
    /// Words that are navigation only in navigational context.
    pub nav_words: Vec<String>,
    /// Markers that make an adjacent ambiguous word navigational.
    pub nav_markers: Vec<String>,
    /// Section names that appear in `Back <Section>` breadcrumbs.
    pub breadcrumb_sections: Vec<String>,
    /// Regex patterns removed anywhere in the text.
    pub pollution_patterns: Vec<String>,
}

const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            window_chars: 600,
            section_headers: to_strings(&[
                "Introduction",
                "Overview",
                "Instructions",
                "Objective",
                "Getting Started",
                "What You'll Learn",
                "The Assignment",
            ]),
            opener_nouns: to_strings(&[
                "assignment",
                "article",
                "lesson",
                "tutorial",
                "guide",
                "post",
                "course",
                "exercise",
            ]),
            nav_words: to_strings(&["search", "menu", "home", "close", "share"]),
            nav_markers: to_strings(&["Back", "Menu", "Cart", "My Account", "Skip to content"]),
            breadcrumb_sections: to_strings(&[
                "Photography Courses",
                "Practice Assignments",
                "Assignments",
                "Articles",
                "Tutorials",
                "Lessons",
                "Blog",
            ]),
            pollution_patterns: vec![
                r"(?i)\byour cart is (?:currently )?empty\b".into(),
                r"(?i)\b(?:add to|view) cart\b".into(),
                r"(?i)\bcart\s*\(\d+\)".into(),
                r"(?i)\bmy account\b".into(),
                r"(?i)\blog ?in\s*(?:/|or)\s*register\b".into(),
                r"(?i)\blost your password\?".into(),
                r"(?i)\bskip to (?:main )?content\b".into(),
                r"https?://(?:www\.)?(?:facebook\.com/sharer|twitter\.com/(?:intent/tweet|share)|x\.com/intent/(?:tweet|post)|pinterest\.com/pin/create|linkedin\.com/(?:shareArticle|sharing)|reddit\.com/submit|api\.whatsapp\.com/send)\S*".into(),
                r"(?i)\b(?:click to )?share on (?:facebook|twitter|x|pinterest|linkedin|reddit|whatsapp|email)\b(?:\s*\(opens in new window\))?".into(),
                r"(?i)\bshare this:".into(),
                format!(
                    r"(?m)^[ \t]*(?:By|Posted by|Written by)[ \t]+[A-Z][\w.'-]*(?:[ \t]+[A-Z][\w.'-]*){{0,3}}[ \t]*[|,·–-]?[ \t]*(?:on[ \t]+)?(?:{MONTHS})[ \t]+\d{{1,2}},[ \t]+\d{{4}}[ \t]*$"
                ),
                format!(
                    r"\b(?:Posted|Published|Updated) on (?:{MONTHS}) \d{{1,2}}, \d{{4}}(?: by [A-Z][\w.'-]*(?: [A-Z][\w.'-]*){{0,2}})?"
                ),
            ],
        }
    }
}

/// `[synthesis]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Reading speed used for both duration fields.
    pub words_per_minute: usize,
    /// Extra minutes added to `timeRequired` for assignment content.
    pub assignment_practice_minutes: usize,
    /// Category/tag substrings that select `NewsArticle`.
    pub news_keywords: Vec<String>,
    /// Category/tag values that mark assignment content (case-insensitive).
    pub assignment_markers: Vec<String>,
    /// Genre for content that is neither news nor an assignment.
    pub default_genre: String,
    /// Section for records without categories.
    pub default_section: String,
    /// Explicit date used when a record's date is missing or unparsable.
    pub fallback_date: String,
    pub headline_max_chars: usize,
    pub description_max_chars: usize,
    /// Template for the assignment `teaches` statement (`{topic}`, `{title}`).
    pub teaches_template: String,
    /// Selectors for the speakable specification.
    pub speakable_selectors: Vec<String>,
    /// Framework named in alignment objects.
    pub educational_framework: String,
    pub default_educational_level: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
            assignment_practice_minutes: 30,
            news_keywords: to_strings(&["news", "announcement", "press"]),
            assignment_markers: to_strings(&["practice assignment", "assignment"]),
            default_genre: "Photography".into(),
            default_section: "Articles".into(),
            fallback_date: "2020-01-01T00:00:00Z".into(),
            headline_max_chars: 110,
            description_max_chars: 160,
            teaches_template: "How to apply {topic} techniques in practice: {title}".into(),
            speakable_selectors: to_strings(&["h1", ".entry-content p:first-of-type"]),
            educational_framework: "Photography Fundamentals".into(),
            default_educational_level: "Beginner".into(),
        }
    }
}

/// `[validation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Enumerated findings kept per check; counts still reflect every finding.
    pub max_findings_per_check: usize,
    /// Serialized size above which a soft warning is emitted.
    pub size_warning_bytes: usize,
    /// Descriptions shorter than this produce a recommended-field warning.
    pub min_description_chars: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_findings_per_check: 25,
            size_warning_bytes: 1_000_000,
            min_description_chars: 50,
        }
    }
}

/// `[remote]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Per-call timeout for every collaborator request.
    pub timeout_secs: u64,
    /// JSON file mapping URL -> page content, used before any live fetch.
    pub content_map: Option<String>,
    /// Fetch missing bodies from the live article URL.
    pub fetch_live_pages: bool,
    /// External validation services.
    pub validators: Vec<ValidatorEndpoint>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            content_map: None,
            fetch_live_pages: false,
            validators: Vec::new(),
        }
    }
}

/// `[[remote.validators]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorEndpoint {
    /// Display name used in report findings.
    pub name: String,
    /// Endpoint accepting `POST {"url": ...}` and answering with a verdict.
    pub endpoint: String,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.ldgraph/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LdGraphError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.ldgraph/ldgraph.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LdGraphError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        LdGraphError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LdGraphError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LdGraphError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LdGraphError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
