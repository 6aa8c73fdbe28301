//! Topological planning - commit order for the surviving records
//!
//! Kahn's algorithm over the post-cycle-breaking edge set, restricted to
//! records not already in the target. An owns edge makes the owner a
//! prerequisite of the owned record; a reference edge makes the target a
//! prerequisite of the referrer. Ties break by graph insertion order, so
//! identical inputs always plan identically.

use crate::edge::EdgeKind;
use crate::graph::DependencyGraph;
use crate::record::RecordRef;
use crate::{Error, Result};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Orders the non-existing records for the executor.
pub struct TopologicalPlanner;

impl TopologicalPlanner {
    pub fn plan(
        graph: &DependencyGraph,
        existing: &HashMap<RecordRef, bool>,
    ) -> Result<Vec<RecordRef>> {
        let is_existing = |rec: &RecordRef| existing.get(rec).copied().unwrap_or(false);

        // Plan candidates in insertion order; the index doubles as the
        // tie-break key.
        let order: Vec<RecordRef> = graph
            .refs_in_order()
            .iter()
            .copied()
            .filter(|rec| !is_existing(rec))
            .collect();
        let index: HashMap<RecordRef, usize> =
            order.iter().enumerate().map(|(i, rec)| (*rec, i)).collect();

        let mut in_degree: HashMap<RecordRef, usize> =
            order.iter().map(|rec| (*rec, 0)).collect();
        let mut dependents: HashMap<RecordRef, Vec<RecordRef>> = HashMap::new();

        for edge in graph.all_edges() {
            let (prereq, dependent) = match edge.kind {
                EdgeKind::Owns => (edge.from, edge.to),
                EdgeKind::References => (edge.to, edge.from),
            };
            // Prerequisites already in the target (or never resolved) impose
            // no ordering; self-references never can.
            if prereq == dependent
                || !index.contains_key(&prereq)
                || !index.contains_key(&dependent)
            {
                continue;
            }
            *in_degree.get_mut(&dependent).expect("candidate") += 1;
            dependents.entry(prereq).or_default().push(dependent);
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(rec, _)| Reverse(index[rec]))
            .collect();

        let mut plan = Vec::with_capacity(order.len());
        while let Some(Reverse(i)) = ready.pop() {
            let rec = order[i];
            plan.push(rec);
            for dep in dependents.remove(&rec).unwrap_or_default() {
                let d = in_degree.get_mut(&dep).expect("candidate");
                *d -= 1;
                if *d == 0 {
                    ready.push(Reverse(index[&dep]));
                }
            }
        }

        // Unreachable after cycle breaking, but checked rather than assumed.
        if plan.len() != order.len() {
            return Err(Error::ResidualCycle);
        }
        Ok(plan)
    }
}
