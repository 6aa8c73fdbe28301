//! # Lexigraft - dependency-aware record importer
//!
//! Copies graph-structured lexical records (entries, senses, examples,
//! semantic domains, ...) from a source store into a target store while
//! preserving referential integrity.
//!
//! Lexigraft provides:
//! - Stable GUID-based record identity that survives the copy
//! - Bounded-depth resolution of owned children and cross-references
//! - Cycle detection with optional weakest-edge breaking
//! - Deduplication against the target store
//! - Validation, topological planning and a dry-run preview mode
//! - SQLite-backed stores with a ready-made accessor implementation

pub mod record;
pub mod edge;
pub mod graph;
pub mod accessor;
pub mod report;
pub mod config;
pub mod importer;
pub mod storage;
pub mod ui;

#[cfg(test)]
pub(crate) mod testutil;

// Re-exports for convenient access
pub use record::{RecordKind, RecordRef};
pub use edge::{Edge, EdgeKind};
pub use graph::{DependencyGraph, GraphNode};
pub use accessor::{MaterializeContext, RecordAccessor};
pub use report::{ChangeAction, ChangeRecord, ImportResult, Severity, ValidationIssue, ValidationResult};
pub use config::ImportConfig;
pub use importer::Importer;
pub use storage::{SqliteStore, StoreAccessor};

/// Result type alias for Lexigraft operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Lexigraft operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("circular dependency: {}", format_path(.path))]
    CircularDependency { path: Vec<RecordRef> },

    #[error("ownership cycle cannot be broken: {}", format_path(.path))]
    OwnershipCycle { path: Vec<RecordRef> },

    #[error("validation failed: {0}")]
    Validation(ValidationResult),

    #[error("residual cycle survived cycle breaking; plan ordering is impossible")]
    ResidualCycle,

    #[error("accessor error: {0}")]
    Accessor(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("invalid record reference: {0}")]
    InvalidRef(String),

    #[error("record not found: {0}")]
    RecordNotFound(RecordRef),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_path(path: &[RecordRef]) -> String {
    path.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
