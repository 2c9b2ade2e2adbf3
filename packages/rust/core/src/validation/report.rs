//! Validation report types: findings, severity levels, and aggregation.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Breaks the document contract; the verdict fails.
    Error,
    /// Advisory only.
    Warning,
    /// Report bookkeeping (omitted-finding summaries). Never counted.
    Info,
}

/// One problem found by a check or reported by a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Check or stage that produced the finding.
    pub check: String,
    pub severity: Severity,
    /// Entity reference (`@id`, URL, or graph position).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    pub message: String,
}

impl Finding {
    pub fn error(check: impl Into<String>, entity: Option<String>, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            severity: Severity::Error,
            entity,
            message: message.into(),
        }
    }

    pub fn warning(check: impl Into<String>, entity: Option<String>, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            severity: Severity::Warning,
            entity,
            message: message.into(),
        }
    }

    fn omitted(check: &str, count: usize) -> Self {
        Self {
            check: check.to_string(),
            severity: Severity::Info,
            entity: None,
            message: format!("{count} more finding(s) omitted"),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Per-check totals, including findings dropped from the enumerated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub name: String,
    pub errors: usize,
    pub warnings: usize,
}

/// Overall outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    PassWithWarnings,
    Fail,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::PassWithWarnings => "PASS (with warnings)",
            Self::Fail => "FAIL",
        }
    }
}

/// Aggregated result of every check plus stage notices.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub verdict: Verdict,
    pub error_count: usize,
    pub warning_count: usize,
    pub checks: Vec<CheckSummary>,
    pub findings: Vec<Finding>,
    /// Enumerated notices kept per stage.
    #[serde(skip)]
    notice_cap: usize,
    #[serde(skip)]
    notice_totals: BTreeMap<String, usize>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::with_cap(usize::MAX)
    }

    /// Empty report that enumerates at most `notice_cap` notices per stage.
    pub fn with_cap(notice_cap: usize) -> Self {
        Self {
            verdict: Verdict::Pass,
            error_count: 0,
            warning_count: 0,
            checks: Vec::new(),
            findings: Vec::new(),
            notice_cap,
            notice_totals: BTreeMap::new(),
        }
    }

    /// Record the findings of one check, keeping at most `cap` of them.
    ///
    /// Counts always reflect every finding; a summary entry notes how many
    /// were left out. Errors are listed ahead of warnings when truncating.
    pub fn record_check(&mut self, name: &str, mut findings: Vec<Finding>, cap: usize) {
        let errors = findings.iter().filter(|f| f.severity == Severity::Error).count();
        let warnings = findings.iter().filter(|f| f.severity == Severity::Warning).count();

        let total = findings.len();
        if total > cap {
            findings.sort_by_key(|f| !f.is_error());
        }
        self.findings.extend(findings.into_iter().take(cap));
        if total > cap {
            self.findings.push(Finding::omitted(name, total - cap));
        }

        self.checks.push(CheckSummary {
            name: name.to_string(),
            errors,
            warnings,
        });
        self.error_count += errors;
        self.warning_count += warnings;
        self.refresh_verdict();
    }

    /// Add an advisory notice from a pipeline stage (ingest, assembly, output, external).
    ///
    /// Past the cap a stage's notices are only counted; its summary entry
    /// tracks how many were left out.
    pub fn add_notice(&mut self, stage: &str, entity: Option<String>, message: impl Into<String>) {
        let total = self.notice_totals.entry(stage.to_string()).or_default();
        *total += 1;
        let total = *total;

        if total <= self.notice_cap {
            self.findings.push(Finding::warning(stage, entity, message));
        } else {
            let summary = Finding::omitted(stage, total - self.notice_cap);
            match self
                .findings
                .iter_mut()
                .find(|f| f.check == stage && f.severity == Severity::Info)
            {
                Some(existing) => *existing = summary,
                None => self.findings.push(summary),
            }
        }

        self.warning_count += 1;
        self.refresh_verdict();
    }

    /// Returns true if no check reported an error.
    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }

    /// Findings produced by one check or stage.
    pub fn findings_for<'a>(&'a self, check: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.check == check)
    }

    pub fn summary(&self, check: &str) -> Option<&CheckSummary> {
        self.checks.iter().find(|c| c.name == check)
    }

    fn refresh_verdict(&mut self) {
        self.verdict = if self.error_count > 0 {
            Verdict::Fail
        } else if self.warning_count > 0 {
            Verdict::PassWithWarnings
        } else {
            Verdict::Pass
        };
    }

    /// Human-readable report for terminals.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for check in &self.checks {
            let mark = if check.errors > 0 {
                "✗"
            } else if check.warnings > 0 {
                "!"
            } else {
                "✓"
            };
            let _ = writeln!(
                out,
                "{mark} {:<12} {} error(s), {} warning(s)",
                check.name, check.errors, check.warnings
            );
        }

        if !self.findings.is_empty() {
            out.push('\n');
        }
        for finding in &self.findings {
            let level = match finding.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info => "note",
            };
            match &finding.entity {
                Some(entity) => {
                    let _ = writeln!(out, "[{level}] {}: {entity}: {}", finding.check, finding.message);
                }
                None => {
                    let _ = writeln!(out, "[{level}] {}: {}", finding.check, finding.message);
                }
            }
        }

        let _ = writeln!(
            out,
            "\n{}: {} error(s), {} warning(s)",
            self.verdict.as_str(),
            self.error_count,
            self.warning_count
        );
        out
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_verdict() {
        let mut report = ValidationReport::new();
        assert_eq!(report.verdict, Verdict::Pass);

        report.record_check("media", vec![Finding::warning("media", None, "thin")], 25);
        assert_eq!(report.verdict, Verdict::PassWithWarnings);
        assert!(report.is_valid());

        report.record_check("fields", vec![Finding::error("fields", None, "missing")], 25);
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 1);
    }

    #[test]
    fn cap_limits_enumeration_but_not_counts() {
        let findings = (0..30)
            .map(|i| Finding::error("content", Some(format!("a{i}")), "polluted"))
            .collect();
        let mut report = ValidationReport::new();
        report.record_check("content", findings, 25);

        assert_eq!(report.error_count, 30);
        assert_eq!(report.summary("content").unwrap().errors, 30);
        let listed: Vec<&Finding> = report.findings_for("content").collect();
        assert_eq!(listed.len(), 26);
        assert_eq!(listed[25].severity, Severity::Info);
        assert_eq!(listed[25].message, "5 more finding(s) omitted");
    }

    #[test]
    fn notices_are_warnings() {
        let mut report = ValidationReport::new();
        report.add_notice("assembly", Some("https://x.test/a".into()), "duplicate URL");
        assert!(report.is_valid());
        assert_eq!(report.warning_count, 1);
        assert_eq!(report.verdict, Verdict::PassWithWarnings);
    }

    #[test]
    fn truncation_lists_errors_first() {
        let mut findings: Vec<Finding> = (0..30)
            .map(|i| Finding::warning("fields", Some(format!("a{i}")), "keywords is empty"))
            .collect();
        findings.push(Finding::error("fields", Some("a30".into()), "missing headline"));
        findings.push(Finding::error("fields", Some("a31".into()), "missing url"));

        let mut report = ValidationReport::new();
        report.record_check("fields", findings, 25);

        let listed: Vec<&Finding> = report.findings_for("fields").collect();
        assert_eq!(listed.len(), 26);
        assert!(listed[0].is_error());
        assert!(listed[1].is_error());
        assert_eq!(listed.iter().filter(|f| f.is_error()).count(), 2);
        assert_eq!(report.error_count, 2);
        assert_eq!(report.warning_count, 30);
    }

    #[test]
    fn untruncated_findings_keep_emission_order() {
        let findings = vec![
            Finding::warning("fields", None, "keywords is empty"),
            Finding::error("fields", None, "missing headline"),
        ];
        let mut report = ValidationReport::new();
        report.record_check("fields", findings, 25);

        let listed: Vec<&Finding> = report.findings_for("fields").collect();
        assert_eq!(listed[0].severity, Severity::Warning);
        assert_eq!(listed[1].severity, Severity::Error);
    }

    #[test]
    fn notices_are_capped_per_stage() {
        let mut report = ValidationReport::with_cap(3);
        for i in 0..5 {
            report.add_notice("hydration", Some(format!("https://x.test/{i}")), "no page content found");
        }
        report.add_notice("assembly", None, "duplicate URL");

        let hydration: Vec<&Finding> = report.findings_for("hydration").collect();
        assert_eq!(hydration.len(), 4);
        assert_eq!(hydration[3].severity, Severity::Info);
        assert_eq!(hydration[3].message, "2 more finding(s) omitted");
        assert_eq!(report.findings_for("assembly").count(), 1);
        assert_eq!(report.warning_count, 6);
        assert!(report.is_valid());
    }

    #[test]
    fn renders_text_and_json() {
        let mut report = ValidationReport::new();
        report.record_check("document", Vec::new(), 25);
        report.record_check(
            "linking",
            vec![Finding::error("linking", Some("https://x.test/a#article".into()), "bad @id")],
            25,
        );

        let text = report.render_text();
        assert!(text.contains("✓ document"));
        assert!(text.contains("✗ linking"));
        assert!(text.contains("[error] linking: https://x.test/a#article: bad @id"));
        assert!(text.contains("FAIL: 1 error(s), 0 warning(s)"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["verdict"], "fail");
        assert_eq!(json["findings"][0]["severity"], "error");
    }
}
