//! Shared types, error model, and configuration for Sheetcast.
//!
//! This crate is the foundation depended on by all other Sheetcast crates.
//! It provides:
//! - [`SheetcastError`] — the unified error type
//! - Domain types ([`ArtifactId`], [`Record`], [`QueryResult`], [`ArtifactEnvelope`])
//! - Configuration ([`AppConfig`], [`QueryConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ProviderConfig, QueryConfig, SourceConfig, StoreConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, SheetcastError};
pub use types::{
    ArtifactEnvelope, ArtifactId, ArtifactKind, CSV_ERROR_MARKER, CSV_TOO_LARGE_PLACEHOLDER,
    CsvData, MAX_RECORDS, QueryResult, Record,
};
