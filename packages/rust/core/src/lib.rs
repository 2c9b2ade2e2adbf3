//! Core domain logic for ldgraph.
//!
//! Turns ingested [`ContentRecord`](ldgraph_shared::ContentRecord)s into a
//! validated schema.org JSON-LD graph: synthesis of one Article per record,
//! assembly of the site-level entities around them, and the fixed
//! ten-check validation pipeline.

pub mod assembler;
pub mod pipeline;
pub mod site;
pub mod synthesizer;
pub mod validation;

pub use pipeline::{
    PipelineOutput, ProgressReporter, RunStats, SilentProgress, StageNotice, hydrate_bodies, run,
    run_external_validation, validate_json,
};
pub use site::SiteEntities;
pub use validation::{Finding, Severity, ValidationReport, Verdict};
