//! Deduplication against the target store
//!
//! Marks resolved records whose identity key already exists in the target.
//! Existing records are excluded from the commit plan but still counted and
//! still usable as prerequisites by their dependents.

use crate::accessor::RecordAccessor;
use crate::graph::DependencyGraph;
use crate::record::RecordRef;
use crate::Result;
use std::collections::HashMap;

/// Classifies resolved records as new or already present in the target.
pub struct Deduplicator<'a, A: RecordAccessor> {
    accessor: &'a A,
}

impl<'a, A: RecordAccessor> Deduplicator<'a, A> {
    pub fn new(accessor: &'a A) -> Self {
        Self { accessor }
    }

    /// Returns the existence map (true = exists in target) and marks the
    /// corresponding graph nodes. With `skip_existing` false nothing is
    /// marked and the whole set imports, duplicates included.
    pub fn filter(
        &self,
        graph: &mut DependencyGraph,
        skip_existing: bool,
    ) -> Result<HashMap<RecordRef, bool>> {
        let records: Vec<RecordRef> = graph.refs_in_order().to_vec();
        let mut existing = HashMap::with_capacity(records.len());

        for rec in records {
            let exists = skip_existing && self.accessor.exists_in_target(&rec)?;
            if exists {
                graph.mark_existing(&rec);
            }
            existing.insert(rec, exists);
        }

        Ok(existing)
    }
}
