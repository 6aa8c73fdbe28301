//! Edge types - ownership and reference relationships
//!
//! Every relationship between records reduces to two edge types:
//! - `Owns`: composition - an owned record has exactly one owner and is
//!   deleted with it
//! - `References`: aggregation - a non-owning link to a shared record

use crate::record::RecordRef;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Universal edge kinds - all record relationships map to these types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Owner record owns the target (entry -> sense, sense -> example)
    Owns,
    /// Record points at a shared record (sense -> part of speech)
    References,
}

impl EdgeKind {
    /// Get the string representation of the edge kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Owns => "owns",
            EdgeKind::References => "references",
        }
    }

    /// Get all edge kinds
    pub fn all() -> &'static [EdgeKind] {
        &[EdgeKind::Owns, EdgeKind::References]
    }

    /// Check if an edge of this kind may be severed to break a cycle.
    ///
    /// Owns edges are never breakable: removing one would orphan the owned
    /// record.
    pub fn is_breakable(&self) -> bool {
        matches!(self, EdgeKind::References)
    }
}

impl FromStr for EdgeKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owns" | "own" => Ok(EdgeKind::Owns),
            "references" | "reference" | "ref" => Ok(EdgeKind::References),
            _ => Err(crate::Error::InvalidRef(format!("Unknown edge kind: {}", s))),
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed edge in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source record (owner or referrer)
    pub from: RecordRef,
    /// Target record (owned child or reference target)
    pub to: RecordRef,
    /// Type of relationship
    pub kind: EdgeKind,
}

impl Edge {
    /// Create a new edge
    pub fn new(from: RecordRef, to: RecordRef, kind: EdgeKind) -> Self {
        Self { from, to, kind }
    }

    /// Create an Owns edge
    pub fn owns(owner: RecordRef, owned: RecordRef) -> Self {
        Self::new(owner, owned, EdgeKind::Owns)
    }

    /// Create a References edge
    pub fn references(referrer: RecordRef, target: RecordRef) -> Self {
        Self::new(referrer, target, EdgeKind::References)
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -{}-> {}", self.from, self.kind, self.to)
    }
}
