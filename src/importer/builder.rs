//! Graph building - bounded-depth traversal over owns and reference edges
//!
//! Breadth-first from the requested roots. Owned children are followed while
//! the owned-depth bound allows; reference targets are always followed at the
//! referrer's own depth, because shared records (a part of speech, a writing
//! system) sit shallow in every store regardless of how deep the referrer is.

use crate::accessor::RecordAccessor;
use crate::config::ImportConfig;
use crate::edge::Edge;
use crate::graph::{DependencyGraph, GraphNode};
use crate::record::RecordRef;
use crate::Result;
use std::collections::VecDeque;

/// One pending traversal step.
struct Pending {
    rec: RecordRef,
    owner: Option<RecordRef>,
    depth: usize,
}

/// Builds the dependency graph for one import call.
pub struct GraphBuilder<'a, A: RecordAccessor> {
    accessor: &'a A,
}

impl<'a, A: RecordAccessor> GraphBuilder<'a, A> {
    pub fn new(accessor: &'a A) -> Self {
        Self { accessor }
    }

    /// Resolve the full dependency graph reachable from `roots` under `config`.
    ///
    /// Accessor failures propagate immediately; no partial graph is returned.
    pub fn build(&self, roots: &[RecordRef], config: &ImportConfig) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();
        let mut queue: VecDeque<Pending> = roots
            .iter()
            .map(|rec| Pending {
                rec: *rec,
                owner: None,
                depth: 0,
            })
            .collect();

        while let Some(pending) = queue.pop_front() {
            // A record visited earlier only gains incoming edges, never a
            // second node.
            if graph.contains(&pending.rec) {
                continue;
            }
            graph.add_node(GraphNode::new(pending.rec, pending.owner, pending.depth));

            if config.include_owned && pending.depth < config.max_owned_depth {
                for child in self.accessor.owned_children(&pending.rec)? {
                    if !config.wants_owned_kind(child.kind) {
                        continue;
                    }
                    graph.add_edge(Edge::owns(pending.rec, child));
                    if !graph.contains(&child) {
                        queue.push_back(Pending {
                            rec: child,
                            owner: Some(pending.rec),
                            depth: pending.depth + 1,
                        });
                    }
                }
            }

            if config.resolve_references {
                for target in self.accessor.references(&pending.rec)? {
                    graph.add_edge(Edge::references(pending.rec, target));
                    if !graph.contains(&target) {
                        queue.push_back(Pending {
                            rec: target,
                            owner: None,
                            depth: pending.depth,
                        });
                    }
                }
            }
        }

        tracing::debug!(
            "resolved {} record(s) from {} root(s)",
            graph.len(),
            roots.len()
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordKind;
    use crate::testutil::MemoryAccessor;

    #[test]
    fn test_resolves_owned_and_referenced() {
        let entry = RecordRef::random(RecordKind::Entry);
        let sense = RecordRef::random(RecordKind::Sense);
        let pos = RecordRef::random(RecordKind::PartOfSpeech);

        let mut accessor = MemoryAccessor::new();
        accessor.add_owned(entry, sense);
        accessor.add_ref(sense, pos);

        let graph = GraphBuilder::new(&accessor)
            .build(&[entry], &ImportConfig::default())
            .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.get(&sense).unwrap().owner, Some(entry));
        assert_eq!(graph.get(&sense).unwrap().depth, 1);
        // reference targets are enqueued at the referrer's depth
        assert_eq!(graph.get(&pos).unwrap().depth, 1);
    }

    #[test]
    fn test_owned_depth_limit_leaves_dangling_edge() {
        let entry = RecordRef::random(RecordKind::Entry);
        let sense = RecordRef::random(RecordKind::Sense);
        let example = RecordRef::random(RecordKind::Example);

        let mut accessor = MemoryAccessor::new();
        accessor.add_owned(entry, sense);
        accessor.add_owned(sense, example);

        let config = ImportConfig {
            max_owned_depth: 1,
            ..ImportConfig::default()
        };
        let graph = GraphBuilder::new(&accessor).build(&[entry], &config).unwrap();

        // sense is resolved at depth 1 but its own children are not expanded
        assert!(graph.contains(&sense));
        assert!(!graph.contains(&example));
        // the declared-but-unresolved leaf still has its incoming edge
        assert_eq!(graph.edges_from(&sense).len(), 1);
    }

    #[test]
    fn test_references_ignore_owned_depth_limit() {
        let entry = RecordRef::random(RecordKind::Entry);
        let sense = RecordRef::random(RecordKind::Sense);
        let pos = RecordRef::random(RecordKind::PartOfSpeech);

        let mut accessor = MemoryAccessor::new();
        accessor.add_owned(entry, sense);
        accessor.add_ref(sense, pos);

        let config = ImportConfig {
            max_owned_depth: 1,
            ..ImportConfig::default()
        };
        let graph = GraphBuilder::new(&accessor).build(&[entry], &config).unwrap();

        // sense sits at the depth bound; its reference is still resolved
        assert!(graph.contains(&pos));
    }

    #[test]
    fn test_owned_kind_filter() {
        let entry = RecordRef::random(RecordKind::Entry);
        let sense = RecordRef::random(RecordKind::Sense);
        let pron = RecordRef::random(RecordKind::Pronunciation);

        let mut accessor = MemoryAccessor::new();
        accessor.add_owned(entry, sense);
        accessor.add_owned(entry, pron);

        let mut config = ImportConfig::default();
        config.owned_kinds.insert(RecordKind::Sense);
        let graph = GraphBuilder::new(&accessor).build(&[entry], &config).unwrap();

        assert!(graph.contains(&sense));
        assert!(!graph.contains(&pron));
        // filtered children get no edge either
        assert_eq!(graph.edges_from(&entry).len(), 1);
    }

    #[test]
    fn test_shared_target_gets_single_node() {
        let e1 = RecordRef::random(RecordKind::Entry);
        let e2 = RecordRef::random(RecordKind::Entry);
        let pos = RecordRef::random(RecordKind::PartOfSpeech);

        let mut accessor = MemoryAccessor::new();
        accessor.add_ref(e1, pos);
        accessor.add_ref(e2, pos);

        let graph = GraphBuilder::new(&accessor)
            .build(&[e1, e2], &ImportConfig::default())
            .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edges_to(&pos).len(), 2);
    }

    #[test]
    fn test_no_traversal_when_disabled() {
        let entry = RecordRef::random(RecordKind::Entry);
        let sense = RecordRef::random(RecordKind::Sense);
        let pos = RecordRef::random(RecordKind::PartOfSpeech);

        let mut accessor = MemoryAccessor::new();
        accessor.add_owned(entry, sense);
        accessor.add_ref(entry, pos);

        let config = ImportConfig {
            include_owned: false,
            resolve_references: false,
            ..ImportConfig::default()
        };
        let graph = GraphBuilder::new(&accessor).build(&[entry], &config).unwrap();

        assert_eq!(graph.len(), 1);
        assert!(graph.edges_from(&entry).is_empty());
    }

    #[test]
    fn test_accessor_failure_is_fail_fast() {
        let entry = RecordRef::random(RecordKind::Entry);
        let mut accessor = MemoryAccessor::new();
        accessor.fail_children_of(entry);

        let result = GraphBuilder::new(&accessor).build(&[entry], &ImportConfig::default());
        assert!(result.is_err());
    }
}
