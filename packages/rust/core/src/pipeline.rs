//! End-to-end run: records → synthesize → assemble → serialize → validate.
//!
//! [`run`] is pure and synchronous. The optional collaborator stages around
//! it ([`hydrate_bodies`] before, [`run_external_validation`] after) are
//! async and never fail the run: their problems become report notices.

use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use ldgraph_remote::{ContentStore, ExternalValidator};
use ldgraph_sanitizer::Sanitizer;
use ldgraph_shared::{AppConfig, ContentRecord, JsonLdDocument, Result};

use crate::assembler::{self, assemble};
use crate::site::SiteEntities;
use crate::synthesizer::Synthesizer;
use crate::validation::{ValidationContext, ValidationReport, validate_str};

/// Stage names used for notices in the report.
pub const STAGE_INGEST: &str = "ingest";
pub const STAGE_ASSEMBLY: &str = "assembly";
pub const STAGE_OUTPUT: &str = "output";
pub const STAGE_HYDRATION: &str = "hydration";
pub const STAGE_EXTERNAL: &str = "external";

/// An advisory message from a stage outside the validation checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageNotice {
    pub stage: &'static str,
    pub entity: Option<String>,
    pub message: String,
}

impl StageNotice {
    fn new(stage: &'static str, entity: Option<String>, message: impl Into<String>) -> Self {
        Self {
            stage,
            entity,
            message: message.into(),
        }
    }
}

/// Counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub records: usize,
    pub articles: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub bytes: usize,
}

/// Result of [`run`].
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub document: JsonLdDocument,
    /// Pretty-printed JSON of `document`, exactly as validated.
    pub json: String,
    pub report: ValidationReport,
    /// Hex SHA-256 of `json`.
    pub digest: String,
    pub stats: RunStats,
}

impl PipelineOutput {
    /// Fold notices from a collaborator stage into the report.
    pub fn add_notices(&mut self, notices: impl IntoIterator<Item = StageNotice>) {
        for notice in notices {
            self.report.add_notice(notice.stage, notice.entity, notice.message);
        }
    }
}

/// Progress callback for the slow collaborator stages.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each URL is handled.
    fn item(&self, url: &str, current: usize, total: usize);
    /// Called when a phase completes.
    fn finish(&self, message: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn item(&self, _url: &str, _current: usize, _total: usize) {}
    fn finish(&self, _message: &str) {}
}

// ---------------------------------------------------------------------------
// Core run
// ---------------------------------------------------------------------------

/// Build and validate the graph for `records`.
///
/// Only setup problems (invalid configured patterns or dates, serialization)
/// are returned as errors. Bad records, duplicates and check failures end up
/// in the report.
#[instrument(skip_all, fields(records = records.len()))]
pub fn run(records: &[ContentRecord], config: &AppConfig) -> Result<PipelineOutput> {
    let start = Instant::now();

    config.validate()?;
    let sanitizer = Sanitizer::new(&config.sanitizer)?;
    let site = SiteEntities::from_config(&config.site);
    let synthesizer = Synthesizer::new(config, &site, &sanitizer)?;

    let mut notices = Vec::new();
    let mut articles = Vec::with_capacity(records.len());
    for record in records {
        match synthesizer.synthesize(record) {
            Ok(synthesized) => articles.push(synthesized),
            Err(e) => {
                warn!(row = record.row, error = %e, "skipping record");
                notices.push(StageNotice::new(
                    STAGE_INGEST,
                    Some(format!("row {}", record.row)),
                    format!("record skipped: {e}"),
                ));
            }
        }
    }
    let skipped = records.len() - articles.len();

    let graph = assemble(&site, articles);
    for dup in &graph.duplicates {
        notices.push(StageNotice::new(
            STAGE_ASSEMBLY,
            Some(dup.url.clone()),
            format!(
                "row {} repeats the URL of row {}; the first occurrence was kept",
                dup.row, dup.kept_row
            ),
        ));
    }

    let json = assembler::to_json(&graph.document)?;
    if json.len() > config.validation.size_warning_bytes {
        warn!(bytes = json.len(), "document exceeds the size warning threshold");
        notices.push(StageNotice::new(
            STAGE_OUTPUT,
            None,
            format!(
                "document is {} bytes, above the {} byte guideline",
                json.len(),
                config.validation.size_warning_bytes
            ),
        ));
    }

    let ctx = ValidationContext::new(config, sanitizer.lexicon());
    let report = validate_str(&json, &ctx);
    let digest = assembler::digest(&json);

    let stats = RunStats {
        records: records.len(),
        articles: graph.document.articles().count(),
        skipped,
        duplicates: graph.duplicates.len(),
        bytes: json.len(),
    };

    info!(
        articles = stats.articles,
        skipped = stats.skipped,
        duplicates = stats.duplicates,
        errors = report.error_count,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "pipeline complete"
    );

    let mut output = PipelineOutput {
        document: graph.document,
        json,
        report,
        digest,
        stats,
    };
    output.add_notices(notices);
    Ok(output)
}

/// Validate an existing serialized document against the configured lexicon and limits.
pub fn validate_json(json: &str, config: &AppConfig) -> Result<ValidationReport> {
    config.validate()?;
    let sanitizer = Sanitizer::new(&config.sanitizer)?;
    let ctx = ValidationContext::new(config, sanitizer.lexicon());
    Ok(validate_str(json, &ctx))
}

// ---------------------------------------------------------------------------
// Collaborator stages
// ---------------------------------------------------------------------------

/// Fill empty record bodies from a content store, one URL at a time.
///
/// Returns notices for records that stayed empty.
#[instrument(skip_all, fields(records = records.len()))]
pub async fn hydrate_bodies<S: ContentStore>(
    records: &mut [ContentRecord],
    store: &S,
    progress: &dyn ProgressReporter,
) -> Vec<StageNotice> {
    let total = records.iter().filter(|r| needs_body(r)).count();
    let mut notices = Vec::new();
    if total == 0 {
        return notices;
    }

    progress.phase("Fetching missing article bodies");
    let mut filled = 0;
    let mut current = 0;
    for record in records.iter_mut().filter(|r| needs_body(r)) {
        current += 1;
        match store.fetch(&record.url).await {
            Ok(Some(content)) => {
                debug!(row = record.row, url = %record.url, "body hydrated");
                record.body = content;
                filled += 1;
            }
            Ok(None) => {
                notices.push(StageNotice::new(
                    STAGE_HYDRATION,
                    Some(record.url.clone()),
                    "no page content found; body left empty",
                ));
            }
            Err(e) => {
                warn!(row = record.row, url = %record.url, error = %e, "content store unavailable");
                notices.push(StageNotice::new(
                    STAGE_HYDRATION,
                    Some(record.url.clone()),
                    format!("content store unavailable: {e}"),
                ));
            }
        }
        progress.item(&record.url, current, total);
    }

    info!(filled, missing = total - filled, "hydration complete");
    progress.finish(&format!("Hydrated {filled}/{total} bodies"));
    notices
}

fn needs_body(record: &ContentRecord) -> bool {
    record.body.trim().is_empty() && !record.url.trim().is_empty()
}

/// Submit every Article URL to every validator, serially, and fold the
/// verdicts into the report as advisory notices.
#[instrument(skip_all, fields(validators = validators.len()))]
pub async fn run_external_validation<V: ExternalValidator>(
    output: &mut PipelineOutput,
    validators: &[V],
    progress: &dyn ProgressReporter,
) {
    if validators.is_empty() {
        return;
    }

    let urls: Vec<String> = output.document.articles().map(|a| a.url.clone()).collect();
    let total = urls.len() * validators.len();
    let mut notices = Vec::new();
    let mut current = 0;
    let mut unavailable = 0;

    progress.phase("Submitting to external validators");
    for url in &urls {
        for validator in validators {
            current += 1;
            let name = validator.name();
            match validator.submit(url).await {
                Ok(verdict) => {
                    for error in &verdict.errors {
                        notices.push(StageNotice::new(STAGE_EXTERNAL, Some(url.clone()), format!("{name}: {error}")));
                    }
                    for warning in &verdict.warnings {
                        notices.push(StageNotice::new(
                            STAGE_EXTERNAL,
                            Some(url.clone()),
                            format!("{name} warning: {warning}"),
                        ));
                    }
                    if !verdict.valid && verdict.errors.is_empty() {
                        notices.push(StageNotice::new(
                            STAGE_EXTERNAL,
                            Some(url.clone()),
                            format!("{name}: page reported as invalid"),
                        ));
                    }
                }
                Err(e) => {
                    unavailable += 1;
                    warn!(%url, validator = name, error = %e, "external validator unavailable");
                    notices.push(StageNotice::new(
                        STAGE_EXTERNAL,
                        Some(url.clone()),
                        format!("{name}: unavailable ({e})"),
                    ));
                }
            }
            progress.item(url, current, total);
        }
    }

    info!(submitted = total, unavailable, "external validation complete");
    progress.finish(&format!("External validation: {total} submission(s), {unavailable} unavailable"));
    output.add_notices(notices);
}
