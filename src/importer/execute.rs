//! Import execution - walking the plan and committing changes
//!
//! Records already in the target are accounted once, as skips, before the
//! plan runs. In dry-run mode the accessor's materialize is never called;
//! change entries simulate the writes for reporting. A materialization
//! failure stops the walk immediately and the result carries the partial
//! change log; nothing is rolled back.

use crate::accessor::{MaterializeContext, RecordAccessor};
use crate::graph::DependencyGraph;
use crate::record::RecordRef;
use crate::report::{ChangeRecord, ImportResult, ValidationResult};
use crate::Result;
use std::collections::HashSet;

/// Walks the plan, materializing each record unless in dry-run mode.
pub struct ImportExecutor<'a, A: RecordAccessor> {
    accessor: &'a A,
}

impl<'a, A: RecordAccessor> ImportExecutor<'a, A> {
    pub fn new(accessor: &'a A) -> Self {
        Self { accessor }
    }

    pub fn execute(
        &self,
        plan: &[RecordRef],
        graph: &DependencyGraph,
        dry_run: bool,
        mut progress: Option<&mut dyn FnMut(&str)>,
        validation: Option<ValidationResult>,
    ) -> Result<ImportResult> {
        let mut changes = Vec::with_capacity(graph.len());
        let mut num_created = 0;
        let mut num_skipped = 0;
        let mut failure = None;

        // Target analogues available to later materializations: pre-existing
        // records first, then everything created as the plan advances.
        let mut available: HashSet<RecordRef> = graph
            .nodes_in_order()
            .filter(|n| n.exists_in_target)
            .map(|n| n.rec)
            .collect();

        // Existing records were classified once by the deduplicator; they are
        // accounted here, outside plan order.
        for node in graph.nodes_in_order() {
            if node.exists_in_target {
                changes.push(ChangeRecord::skipped(node.rec));
                num_skipped += 1;
                if let Some(cb) = progress.as_mut() {
                    cb(&format!("skipped {} (already in target)", node.rec));
                }
            }
        }

        let mut success = true;
        for rec in plan {
            if dry_run {
                changes.push(ChangeRecord::created(*rec));
                num_created += 1;
                available.insert(*rec);
                if let Some(cb) = progress.as_mut() {
                    cb(&format!("would create {}", rec));
                }
                continue;
            }

            let ctx = MaterializeContext::new(graph, &available);
            match self.accessor.materialize(rec, &ctx) {
                Ok(change) => {
                    changes.push(change);
                    num_created += 1;
                    available.insert(*rec);
                    if let Some(cb) = progress.as_mut() {
                        cb(&format!("created {}", rec));
                    }
                }
                Err(e) => {
                    tracing::warn!("materialization of {} failed: {}", rec, e);
                    if let Some(cb) = progress.as_mut() {
                        cb(&format!("failed on {}: {}", rec, e));
                    }
                    failure = Some(e.to_string());
                    success = false;
                    break;
                }
            }
        }

        Ok(ImportResult {
            success,
            num_created,
            num_skipped,
            changes,
            validation,
            failure,
        })
    }
}
