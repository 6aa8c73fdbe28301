//! In-memory accessor fixtures for pipeline tests.

use crate::accessor::{MaterializeContext, RecordAccessor};
use crate::record::{RecordKind, RecordRef};
use crate::report::{ChangeRecord, Severity, ValidationIssue};
use crate::{Error, Result};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Scriptable in-memory source/target pair.
///
/// Edges are declared up front; the "target store" starts from whatever
/// `put_target` seeds and grows as records materialize. Every materialization
/// is recorded together with the surviving references the context reported,
/// so tests can assert what the accessor was told to wire.
#[derive(Default)]
pub struct MemoryAccessor {
    owned: HashMap<RecordRef, Vec<RecordRef>>,
    refs: HashMap<RecordRef, Vec<RecordRef>>,
    issues: HashMap<RecordRef, Vec<ValidationIssue>>,
    target: RefCell<HashSet<RecordRef>>,
    materialized: RefCell<Vec<(RecordRef, Vec<RecordRef>)>>,
    fail_children: HashSet<RecordRef>,
    fail_materialize: HashSet<RecordRef>,
}

impl MemoryAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_owned(&mut self, owner: RecordRef, owned: RecordRef) {
        self.owned.entry(owner).or_default().push(owned);
    }

    pub fn add_ref(&mut self, from: RecordRef, to: RecordRef) {
        self.refs.entry(from).or_default().push(to);
    }

    /// Seed the target store with an already-existing record
    pub fn put_target(&mut self, rec: RecordRef) {
        self.target.borrow_mut().insert(rec);
    }

    /// Script a validation issue for a record
    pub fn issue(&mut self, rec: RecordRef, severity: Severity, message: &str) {
        let issue = match severity {
            Severity::Warning => ValidationIssue::warning(rec, message),
            Severity::Error => ValidationIssue::error(rec, message),
        };
        self.issues.entry(rec).or_default().push(issue);
    }

    /// Make `owned_children` fail for a record
    pub fn fail_children_of(&mut self, rec: RecordRef) {
        self.fail_children.insert(rec);
    }

    /// Make `materialize` fail for a record
    pub fn fail_materialize(&mut self, rec: RecordRef) {
        self.fail_materialize.insert(rec);
    }

    /// Materializations seen so far: (record, surviving references)
    pub fn materialized(&self) -> Vec<(RecordRef, Vec<RecordRef>)> {
        self.materialized.borrow().clone()
    }

    /// Surviving references reported when `rec` materialized
    pub fn wired_refs(&self, rec: &RecordRef) -> Option<Vec<RecordRef>> {
        self.materialized
            .borrow()
            .iter()
            .find(|(r, _)| r == rec)
            .map(|(_, refs)| refs.clone())
    }
}

impl RecordAccessor for MemoryAccessor {
    fn owned_children(&self, rec: &RecordRef) -> Result<Vec<RecordRef>> {
        if self.fail_children.contains(rec) {
            return Err(Error::Accessor(format!("cannot list children of {}", rec)));
        }
        Ok(self.owned.get(rec).cloned().unwrap_or_default())
    }

    fn references(&self, rec: &RecordRef) -> Result<Vec<RecordRef>> {
        Ok(self.refs.get(rec).cloned().unwrap_or_default())
    }

    fn referrers(&self, rec: &RecordRef, kinds: &[RecordKind]) -> Result<Vec<RecordRef>> {
        let mut found = Vec::new();
        for (from, targets) in &self.refs {
            if kinds.contains(&from.kind) && targets.contains(rec) {
                found.push(*from);
            }
        }
        found.sort_by_key(|r| r.guid);
        Ok(found)
    }

    fn exists_in_target(&self, rec: &RecordRef) -> Result<bool> {
        Ok(self.target.borrow().contains(rec))
    }

    fn materialize(&self, rec: &RecordRef, ctx: &MaterializeContext<'_>) -> Result<ChangeRecord> {
        if self.fail_materialize.contains(rec) {
            return Err(Error::Accessor(format!("target store rejected {}", rec)));
        }
        self.materialized
            .borrow_mut()
            .push((*rec, ctx.surviving_references(rec)));
        self.target.borrow_mut().insert(*rec);
        Ok(ChangeRecord::created(*rec))
    }

    fn validate_record(&self, rec: &RecordRef) -> Result<Vec<ValidationIssue>> {
        Ok(self.issues.get(rec).cloned().unwrap_or_default())
    }
}
