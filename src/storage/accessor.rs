//! SQLite-backed RecordAccessor
//!
//! Binds the importer's capability interface to a concrete source store and
//! target store. Materialization copies the record row, attaches it to its
//! owner when the owner's target analogue is available, and rewires only the
//! references the engine reports as surviving.

use super::sqlite::SqliteStore;
use crate::accessor::{MaterializeContext, RecordAccessor};
use crate::record::{RecordKind, RecordRef};
use crate::report::{ChangeRecord, ValidationIssue};
use crate::{Error, Result};

/// RecordAccessor over a (source, target) store pair.
pub struct StoreAccessor<'a> {
    source: &'a SqliteStore,
    target: &'a SqliteStore,
}

impl<'a> StoreAccessor<'a> {
    pub fn new(source: &'a SqliteStore, target: &'a SqliteStore) -> Self {
        Self { source, target }
    }

    fn available(&self, rec: &RecordRef, ctx: &MaterializeContext<'_>) -> Result<bool> {
        // Created earlier in this run, or already in the target before it.
        Ok(ctx.is_available(rec) || self.target.contains(rec)?)
    }
}

impl RecordAccessor for StoreAccessor<'_> {
    fn owned_children(&self, rec: &RecordRef) -> Result<Vec<RecordRef>> {
        self.source.owned_children(rec)
    }

    fn references(&self, rec: &RecordRef) -> Result<Vec<RecordRef>> {
        self.source.references_of(rec)
    }

    fn referrers(&self, rec: &RecordRef, kinds: &[RecordKind]) -> Result<Vec<RecordRef>> {
        self.source.referrers_of(rec, kinds)
    }

    fn exists_in_target(&self, rec: &RecordRef) -> Result<bool> {
        self.target.contains(rec)
    }

    fn materialize(&self, rec: &RecordRef, ctx: &MaterializeContext<'_>) -> Result<ChangeRecord> {
        let record = self
            .source
            .get_record(rec)?
            .ok_or(Error::RecordNotFound(*rec))?;
        self.target.insert_record(&record)?;

        if let Some(owner) = ctx.owner_of(rec) {
            if self.available(&owner, ctx)? {
                let position = self.source.owned_position(rec)?.unwrap_or(0);
                self.target.attach_owner(rec, &owner, position)?;
            }
        }

        for dst in ctx.surviving_references(rec) {
            if self.available(&dst, ctx)? {
                self.target.add_reference(rec, &dst)?;
            }
        }

        Ok(ChangeRecord::created(*rec))
    }

    fn validate_record(&self, rec: &RecordRef) -> Result<Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        match self.source.get_record(rec)? {
            None => {
                issues.push(ValidationIssue::error(*rec, "record not present in source store"));
                return Ok(issues);
            }
            Some(record) if record.rec.kind != rec.kind => {
                issues.push(ValidationIssue::error(
                    *rec,
                    format!("source store holds this GUID as {}", record.rec.kind),
                ));
            }
            Some(_) => {}
        }

        if rec.kind == RecordKind::Sense {
            let has_pos = self
                .source
                .references_of(rec)?
                .iter()
                .any(|r| r.kind == RecordKind::PartOfSpeech);
            if !has_pos {
                issues.push(ValidationIssue::warning(*rec, "sense has no part of speech"));
            }
        }

        Ok(issues)
    }
}
