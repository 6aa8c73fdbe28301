//! Import reports - change log, validation aggregate, final result
//!
//! `ImportResult` is the only artifact an import call hands back to the
//! caller; it is never mutated after construction.

use crate::record::{RecordKind, RecordRef};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// What the executor did for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    /// The record was (or, in a dry run, would be) copied into the target
    Created,
    /// An equivalent record already existed in the target
    Skipped,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Created => "created",
            ChangeAction::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in the import change log.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRecord {
    pub kind: RecordKind,
    pub guid: Uuid,
    pub action: ChangeAction,
}

impl ChangeRecord {
    /// Change entry for a copied record
    pub fn created(rec: RecordRef) -> Self {
        Self {
            kind: rec.kind,
            guid: rec.guid,
            action: ChangeAction::Created,
        }
    }

    /// Change entry for a record elided because it already exists
    pub fn skipped(rec: RecordRef) -> Self {
        Self {
            kind: rec.kind,
            guid: rec.guid,
            action: ChangeAction::Skipped,
        }
    }

    /// The record this change is about
    pub fn rec(&self) -> RecordRef {
        RecordRef::new(self.kind, self.guid)
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.action, self.kind, self.guid)
    }
}

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single validation finding about one record.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub rec: RecordRef,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    pub fn warning(rec: RecordRef, message: impl Into<String>) -> Self {
        Self {
            rec,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(rec: RecordRef, message: impl Into<String>) -> Self {
        Self {
            rec,
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.rec, self.message)
    }
}

/// Ordered collection of validation issues for one import call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// True iff any issue has Error severity; a critical result blocks the commit
    pub fn is_critical(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn num_errors(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn num_warnings(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.num_errors(),
            self.num_warnings()
        )
    }
}

/// Aggregate report of one import call.
#[derive(Debug, Serialize)]
pub struct ImportResult {
    /// False when materialization failed partway through
    pub success: bool,
    /// Records copied (or simulated in a dry run)
    pub num_created: usize,
    /// Records elided because an equivalent already existed in the target
    pub num_skipped: usize,
    /// Per-record change log in commit order (skips first)
    pub changes: Vec<ChangeRecord>,
    /// Validation findings, when validation ran
    pub validation: Option<ValidationResult>,
    /// Message of the materialization error that stopped execution, if any
    pub failure: Option<String>,
}

impl fmt::Display for ImportResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Import Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Created: {}", self.num_created)?;
        writeln!(f, "  Skipped: {}", self.num_skipped)?;
        if let Some(validation) = &self.validation {
            writeln!(f, "  Validation: {}", validation)?;
        }
        if let Some(failure) = &self.failure {
            writeln!(f, "  Failed on: {}", failure)?;
        }
        Ok(())
    }
}
