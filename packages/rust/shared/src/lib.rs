//! Shared types, error model, and configuration for seograph.
//!
//! This crate is the foundation depended on by all other seograph crates.
//! It provides:
//! - [`SeoGraphError`], the unified error type
//! - Domain types ([`Indexable`], [`ObjectType`])
//! - The [`IndexableRepository`] seam
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod repository;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CompanyOrPerson, SchemaConfig, SearchAppearanceConfig, SiteConfig, StorageConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, SeoGraphError};
pub use repository::IndexableRepository;
pub use types::{Indexable, ObjectType, permalink_hash};
