//! Shared types, error model, and configuration for ldgraph.
//!
//! This crate is the foundation depended on by all other ldgraph crates.
//! It provides:
//! - [`LdGraphError`], the unified error type
//! - Input records ([`ContentRecord`]) and graph entities ([`SchemaEntity`], [`Article`], ...)
//! - Identity conventions ([`ids`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod ids;
pub mod schema;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, RemoteConfig, SanitizerConfig, SiteConfig, SynthesisConfig, ValidationConfig,
    ValidatorEndpoint, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{LdGraphError, Result};
pub use schema::{
    AlignmentObject, Article, ArticleKind, Blog, BlogRef, EducationalAudience, ImageObject,
    ItemList, JsonLdDocument, ListItem, Organization, OrganizationRef, Person, SCHEMA_CONTEXT,
    SchemaEntity, SpeakableSpecification, Thing, WebPageRef, WebSite,
};
pub use types::ContentRecord;
