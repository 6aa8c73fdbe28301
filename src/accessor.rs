//! RecordAccessor - the store-facing capability the importer consumes
//!
//! The engine never touches a data store directly. Everything it needs from
//! the source and target stores goes through this trait: enumerating edges,
//! testing existence, copying a record, and type-specific validation. One
//! implementation per store technology; `storage::StoreAccessor` is the
//! SQLite-backed one.

use crate::graph::DependencyGraph;
use crate::record::{RecordKind, RecordRef};
use crate::report::{ChangeRecord, ValidationIssue};
use crate::Result;
use std::collections::HashSet;

/// Capability interface over a source store and a target store.
///
/// All methods take `&self`; implementations own whatever connections or
/// caches they need. Errors are accessor-defined and propagate through the
/// engine unchanged.
pub trait RecordAccessor {
    /// Records the given record owns, in owner-defined order
    fn owned_children(&self, rec: &RecordRef) -> Result<Vec<RecordRef>>;

    /// Records the given record points at without owning them
    fn references(&self, rec: &RecordRef) -> Result<Vec<RecordRef>>;

    /// Reverse-reference scan: records of the given kinds that reference `rec`
    fn referrers(&self, rec: &RecordRef, kinds: &[RecordKind]) -> Result<Vec<RecordRef>>;

    /// Whether an equivalent record (same identity key) exists in the target
    fn exists_in_target(&self, rec: &RecordRef) -> Result<bool>;

    /// Copy one record into the target store.
    ///
    /// Called in topological order, so every dependency the context reports
    /// as available already has its target analogue. The implementation is
    /// expected to rewire only the references the context lists as surviving.
    fn materialize(&self, rec: &RecordRef, ctx: &MaterializeContext<'_>) -> Result<ChangeRecord>;

    /// Type-specific invariant checks for one record.
    ///
    /// The default has no rules; store implementations add their own.
    fn validate_record(&self, rec: &RecordRef) -> Result<Vec<ValidationIssue>> {
        let _ = rec;
        Ok(Vec::new())
    }
}

/// What the executor knows at the moment one record is materialized.
///
/// Lets the accessor look up the surviving (post-cycle-breaking) edges of the
/// record and whether a dependency's target analogue is available, without
/// exposing the rest of the engine.
pub struct MaterializeContext<'a> {
    graph: &'a DependencyGraph,
    available: &'a HashSet<RecordRef>,
}

impl<'a> MaterializeContext<'a> {
    pub(crate) fn new(graph: &'a DependencyGraph, available: &'a HashSet<RecordRef>) -> Self {
        Self { graph, available }
    }

    /// Reference targets of `rec` that survived cycle breaking
    pub fn surviving_references(&self, rec: &RecordRef) -> Vec<RecordRef> {
        self.graph
            .edges_from_by_kind(rec, crate::edge::EdgeKind::References)
            .into_iter()
            .map(|e| e.to)
            .collect()
    }

    /// Owned children of `rec` that were resolved into the graph
    pub fn owned_children(&self, rec: &RecordRef) -> Vec<RecordRef> {
        self.graph
            .edges_from_by_kind(rec, crate::edge::EdgeKind::Owns)
            .into_iter()
            .map(|e| e.to)
            .collect()
    }

    /// Owner of `rec` as recorded during graph building
    pub fn owner_of(&self, rec: &RecordRef) -> Option<RecordRef> {
        self.graph.get(rec).and_then(|n| n.owner)
    }

    /// Whether a dependency's target analogue is available: either created
    /// earlier in this run or already present in the target before it
    pub fn is_available(&self, rec: &RecordRef) -> bool {
        self.available.contains(rec)
    }
}
