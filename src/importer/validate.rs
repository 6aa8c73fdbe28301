//! Validation over the resolved, deduplicated record set
//!
//! Two layers of checks per in-scope record: the engine's own referential
//! check (every reference target must be resolved into the graph or already
//! present in the target), and the accessor's type-specific rules. Any
//! error-severity issue makes the aggregate critical and blocks the commit.

use crate::accessor::RecordAccessor;
use crate::edge::EdgeKind;
use crate::graph::DependencyGraph;
use crate::record::RecordRef;
use crate::report::{ValidationIssue, ValidationResult};
use crate::Result;

/// Which records get validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationScope {
    /// Only the requested roots
    RootsOnly,
    /// Every record resolved into the graph
    All,
}

/// Runs referential and business-rule checks over the resolved set.
pub struct Validator<'a, A: RecordAccessor> {
    accessor: &'a A,
}

impl<'a, A: RecordAccessor> Validator<'a, A> {
    pub fn new(accessor: &'a A) -> Self {
        Self { accessor }
    }

    pub fn validate(
        &self,
        graph: &DependencyGraph,
        roots: &[RecordRef],
        scope: ValidationScope,
    ) -> Result<ValidationResult> {
        let in_scope: Vec<RecordRef> = match scope {
            ValidationScope::RootsOnly => roots.to_vec(),
            ValidationScope::All => graph.refs_in_order().to_vec(),
        };

        let mut report = ValidationResult::new();
        for rec in in_scope {
            // Reference targets must end up resolvable: in the graph, or
            // already in the target store.
            for target in self.accessor.references(&rec)? {
                if !graph.contains(&target) && !self.accessor.exists_in_target(&target)? {
                    report.push(ValidationIssue::error(
                        rec,
                        format!(
                            "reference target {} is neither resolved nor present in the target",
                            target
                        ),
                    ));
                }
            }

            // Owned children dropped by the depth bound are only a warning;
            // the subtree can be imported in a later call.
            for edge in graph.edges_from(&rec) {
                if edge.kind == EdgeKind::Owns && !graph.contains(&edge.to) {
                    report.push(ValidationIssue::warning(
                        rec,
                        format!("owned child {} was not resolved (owned-depth limit)", edge.to),
                    ));
                }
            }

            report.extend(self.accessor.validate_record(&rec)?);
        }

        if !report.is_empty() {
            tracing::debug!("validation produced {}", report);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;
    use crate::importer::builder::GraphBuilder;
    use crate::record::RecordKind;
    use crate::report::Severity;
    use crate::testutil::MemoryAccessor;

    #[test]
    fn test_clean_graph_validates() {
        let entry = RecordRef::random(RecordKind::Entry);
        let sense = RecordRef::random(RecordKind::Sense);
        let pos = RecordRef::random(RecordKind::PartOfSpeech);

        let mut accessor = MemoryAccessor::new();
        accessor.add_owned(entry, sense);
        accessor.add_ref(sense, pos);

        let graph = GraphBuilder::new(&accessor)
            .build(&[entry], &ImportConfig::default())
            .unwrap();
        let report = Validator::new(&accessor)
            .validate(&graph, &[entry], ValidationScope::All)
            .unwrap();

        assert!(report.is_empty());
        assert!(!report.is_critical());
    }

    #[test]
    fn test_unresolvable_reference_is_critical() {
        let sense = RecordRef::random(RecordKind::Sense);
        let pos = RecordRef::random(RecordKind::PartOfSpeech);

        let mut accessor = MemoryAccessor::new();
        accessor.add_ref(sense, pos);

        // graph built without reference resolution: pos is nowhere
        let config = ImportConfig {
            resolve_references: false,
            ..ImportConfig::default()
        };
        let graph = GraphBuilder::new(&accessor).build(&[sense], &config).unwrap();
        let report = Validator::new(&accessor)
            .validate(&graph, &[sense], ValidationScope::All)
            .unwrap();

        assert!(report.is_critical());
        assert_eq!(report.issues()[0].severity, Severity::Error);
    }

    #[test]
    fn test_reference_satisfied_by_target_store() {
        let sense = RecordRef::random(RecordKind::Sense);
        let pos = RecordRef::random(RecordKind::PartOfSpeech);

        let mut accessor = MemoryAccessor::new();
        accessor.add_ref(sense, pos);
        accessor.put_target(pos);

        let config = ImportConfig {
            resolve_references: false,
            ..ImportConfig::default()
        };
        let graph = GraphBuilder::new(&accessor).build(&[sense], &config).unwrap();
        let report = Validator::new(&accessor)
            .validate(&graph, &[sense], ValidationScope::All)
            .unwrap();

        assert!(!report.is_critical());
    }

    #[test]
    fn test_depth_truncation_is_a_warning() {
        let entry = RecordRef::random(RecordKind::Entry);
        let sense = RecordRef::random(RecordKind::Sense);

        let mut accessor = MemoryAccessor::new();
        accessor.add_owned(entry, sense);

        let config = ImportConfig {
            max_owned_depth: 0,
            ..ImportConfig::default()
        };
        let graph = GraphBuilder::new(&accessor).build(&[entry], &config).unwrap();
        let report = Validator::new(&accessor)
            .validate(&graph, &[entry], ValidationScope::All)
            .unwrap();

        assert!(!report.is_critical());
        assert_eq!(report.num_warnings(), 1);
    }

    #[test]
    fn test_roots_only_scope_skips_deep_issues() {
        let entry = RecordRef::random(RecordKind::Entry);
        let sense = RecordRef::random(RecordKind::Sense);

        let mut accessor = MemoryAccessor::new();
        accessor.add_owned(entry, sense);
        accessor.issue(sense, Severity::Error, "sense has no gloss");

        let graph = GraphBuilder::new(&accessor)
            .build(&[entry], &ImportConfig::default())
            .unwrap();

        let roots_only = Validator::new(&accessor)
            .validate(&graph, &[entry], ValidationScope::RootsOnly)
            .unwrap();
        assert!(!roots_only.is_critical());

        let all = Validator::new(&accessor)
            .validate(&graph, &[entry], ValidationScope::All)
            .unwrap();
        assert!(all.is_critical());
    }
}
