//! Validation pipeline.
//!
//! Ten fixed, independent checks run in order over a `serde_json::Value`
//! snapshot of the document. Every check always runs; none short-circuits
//! another. Checks never fail: problems become findings in the report.
//!
//! | check         | severity |
//! |---------------|----------|
//! | `document`    | error    |
//! | `cardinality` | error    |
//! | `references`  | error (position order warns) |
//! | `fields`      | error (recommended fields warn) |
//! | `media`       | error (empty thumbnail warns) |
//! | `durations`   | error    |
//! | `content`     | error    |
//! | `attribution` | error    |
//! | `linking`     | error    |
//! | `readiness`   | warning  |

mod article;
mod report;
mod structure;

use serde_json::Value;
use tracing::{info, instrument};

use ldgraph_sanitizer::Lexicon;
use ldgraph_shared::{AppConfig, ArticleKind};

pub use report::{CheckSummary, Finding, Severity, ValidationReport, Verdict};

/// Check names in execution order.
pub const CHECKS: [&str; 10] = [
    "document",
    "cardinality",
    "references",
    "fields",
    "media",
    "durations",
    "content",
    "attribution",
    "linking",
    "readiness",
];

/// Inputs the checks need beyond the document itself.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub lexicon: &'a Lexicon,
    pub max_findings_per_check: usize,
    pub min_description_chars: usize,
    pub headline_max_chars: usize,
}

impl<'a> ValidationContext<'a> {
    pub fn new(config: &AppConfig, lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            max_findings_per_check: config.validation.max_findings_per_check,
            min_description_chars: config.validation.min_description_chars,
            headline_max_chars: config.synthesis.headline_max_chars,
        }
    }
}

/// Collects the findings of one check.
pub(crate) struct CheckOutput {
    check: &'static str,
    findings: Vec<Finding>,
}

impl CheckOutput {
    fn new(check: &'static str) -> Self {
        Self {
            check,
            findings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, entity: Option<&str>, message: impl Into<String>) {
        self.findings
            .push(Finding::error(self.check, entity.map(str::to_string), message));
    }

    pub(crate) fn warn(&mut self, entity: Option<&str>, message: impl Into<String>) {
        self.findings
            .push(Finding::warning(self.check, entity.map(str::to_string), message));
    }
}

type CheckFn = fn(&Value, &ValidationContext<'_>, &mut CheckOutput);

const CHECK_FNS: [CheckFn; 10] = [
    structure::check_document,
    structure::check_cardinality,
    structure::check_references,
    article::check_fields,
    article::check_media,
    article::check_durations,
    article::check_content,
    article::check_attribution,
    article::check_linking,
    article::check_readiness,
];

/// Validate serialized JSON. Unparsable input is a `document` error; the
/// remaining checks still run against an empty document.
pub fn validate_str(json: &str, ctx: &ValidationContext<'_>) -> ValidationReport {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => validate_value(&value, ctx),
        Err(e) => {
            let parse_error = Finding::error("document", None, format!("not valid JSON: {e}"));
            run_checks(&Value::Null, ctx, Some(parse_error))
        }
    }
}

/// Validate a parsed document.
pub fn validate_value(value: &Value, ctx: &ValidationContext<'_>) -> ValidationReport {
    run_checks(value, ctx, None)
}

#[instrument(skip_all)]
fn run_checks(value: &Value, ctx: &ValidationContext<'_>, parse_error: Option<Finding>) -> ValidationReport {
    let mut report = ValidationReport::with_cap(ctx.max_findings_per_check);

    for (&name, check) in CHECKS.iter().zip(CHECK_FNS) {
        let mut out = CheckOutput::new(name);
        if name == "document" {
            out.findings.extend(parse_error.clone());
        }
        check(value, ctx, &mut out);
        report.record_check(name, out.findings, ctx.max_findings_per_check);
    }

    info!(
        errors = report.error_count,
        warnings = report.warning_count,
        verdict = report.verdict.as_str(),
        "validation complete"
    );
    report
}

// ---------------------------------------------------------------------------
// Value helpers shared by the checks
// ---------------------------------------------------------------------------

/// `@graph` nodes, or nothing when the document has no graph array.
pub(crate) fn graph_nodes(doc: &Value) -> &[Value] {
    doc.get("@graph")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub(crate) fn node_type(node: &Value) -> Option<&str> {
    node.get("@type").and_then(Value::as_str)
}

/// Article and NewsArticle nodes with their graph position.
pub(crate) fn article_nodes(doc: &Value) -> impl Iterator<Item = (usize, &Value)> {
    graph_nodes(doc)
        .iter()
        .enumerate()
        .filter(|(_, node)| node_type(node).is_some_and(ArticleKind::is_article_type))
}

/// Stable reference for a node in findings: `@id`, else `url`, else position.
pub(crate) fn entity_ref(index: usize, node: &Value) -> String {
    str_field(node, "@id")
        .or_else(|| str_field(node, "url"))
        .map_or_else(|| format!("@graph[{index}]"), str::to_string)
}

pub(crate) fn str_field<'v>(node: &'v Value, key: &str) -> Option<&'v str> {
    node.get(key).and_then(Value::as_str)
}

/// The `@type` of an object value, when it is a typed object.
pub(crate) fn typed_object(value: Option<&Value>) -> Option<&str> {
    value.filter(|v| v.is_object()).and_then(node_type)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn run(doc: &Value) -> ValidationReport {
        let config = config();
        let sanitizer = sanitizer();
        let ctx = ValidationContext::new(&config, sanitizer.lexicon());
        validate_value(doc, &ctx)
    }

    #[test]
    fn valid_document_passes_every_check() {
        let report = run(&valid_doc());
        assert!(report.is_valid(), "{}", report.render_text());
        assert_eq!(report.checks.len(), 10);
        let names: Vec<&str> = report.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, CHECKS);
    }

    #[test]
    fn unparsable_json_fails_document_but_runs_everything() {
        let config = config();
        let sanitizer = sanitizer();
        let ctx = ValidationContext::new(&config, sanitizer.lexicon());
        let report = validate_str("{ not json", &ctx);
        assert!(!report.is_valid());
        assert_eq!(report.checks.len(), 10);
        assert!(report
            .findings_for("document")
            .any(|f| f.message.starts_with("not valid JSON")));
    }

    #[test]
    fn independent_checks_all_report() {
        let mut doc = valid_doc();
        let article = first_article(&mut doc);
        article["timeRequired"] = Value::from("45 minutes");
        article["articleBody"] = Value::from("Great shot. Add to cart");
        article["discussionUrl"] = Value::from("https://elsewhere.test/#comments");

        let report = run(&doc);
        assert_eq!(report.summary("durations").unwrap().errors, 1);
        assert_eq!(report.summary("content").unwrap().errors, 1);
        assert_eq!(report.summary("linking").unwrap().errors, 1);
        assert_eq!(report.summary("cardinality").unwrap().errors, 0);
    }

    #[test]
    fn caps_are_applied_per_check() {
        let mut doc = valid_doc();
        for i in 0..3 {
            let mut extra = doc["@graph"][4].clone();
            extra["@id"] = Value::from(format!("https://x.test/{i}#article"));
            doc["@graph"].as_array_mut().unwrap().push(extra);
        }
        let config = {
            let mut c = config();
            c.validation.max_findings_per_check = 2;
            c
        };
        let sanitizer = sanitizer();
        let ctx = ValidationContext::new(&config, sanitizer.lexicon());
        let report = validate_value(&doc, &ctx);

        let linking = report.summary("linking").unwrap();
        assert_eq!(linking.errors, 3);
        let listed: Vec<&Finding> = report.findings_for("linking").collect();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[2].severity, Severity::Info);
    }

    #[test]
    fn entity_refs_prefer_id() {
        let node = serde_json::json!({ "@id": "x#article", "url": "x" });
        assert_eq!(entity_ref(3, &node), "x#article");
        assert_eq!(entity_ref(3, &serde_json::json!({ "url": "x" })), "x");
        assert_eq!(entity_ref(3, &serde_json::json!({})), "@graph[3]");
    }
}
