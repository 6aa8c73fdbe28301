//! Cycle detection and weakest-edge breaking
//!
//! Three-color depth-first search over the union of owns and reference
//! edges. A back-edge to a gray node yields the cycle path. When breaking is
//! allowed, the weakest edge of each cycle is severed in place: a reference
//! edge, the one closest to the edge that closed the cycle. Owns edges are
//! never severed; a cycle made only of them is malformed source data.

use crate::edge::Edge;
use crate::graph::DependencyGraph;
use crate::record::RecordRef;
use crate::{Error, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Detects cycles in a dependency graph, optionally breaking them.
pub struct CycleDetector;

impl CycleDetector {
    /// Check the graph for cycles.
    ///
    /// With `allow_cycles` false, the first cycle aborts the operation with a
    /// `CircularDependency` error naming the cycle path. With it true, each
    /// cycle loses its weakest edge; the severed edges are returned. Cycles
    /// consisting solely of owns edges are fatal either way.
    pub fn detect(graph: &mut DependencyGraph, allow_cycles: bool) -> Result<Vec<Edge>> {
        let mut broken = Vec::new();

        // Breaking an edge invalidates the DFS state, so detection restarts
        // after each break until the graph comes back clean.
        loop {
            let Some(cycle) = Self::find_cycle(graph) else {
                return Ok(broken);
            };
            let path: Vec<RecordRef> = cycle.iter().map(|e| e.from).collect();

            if !allow_cycles {
                return Err(Error::CircularDependency { path });
            }

            // Weakest edge: scanning back from the closing edge, the first
            // reference edge.
            match cycle.iter().rev().find(|e| e.kind.is_breakable()).copied() {
                Some(weakest) => {
                    tracing::debug!("breaking cycle edge {}", weakest);
                    graph.remove_edge(&weakest);
                    broken.push(weakest);
                }
                None => return Err(Error::OwnershipCycle { path }),
            }
        }
    }

    /// Find one cycle, returned as its edge path ending with the closing edge.
    fn find_cycle(graph: &DependencyGraph) -> Option<Vec<Edge>> {
        let mut color: HashMap<RecordRef, Color> = HashMap::with_capacity(graph.len());

        for start in graph.refs_in_order() {
            if color.get(start).copied().unwrap_or(Color::White) != Color::White {
                continue;
            }
            if let Some(cycle) = Self::dfs(graph, *start, &mut color) {
                return Some(cycle);
            }
        }
        None
    }

    fn dfs(
        graph: &DependencyGraph,
        start: RecordRef,
        color: &mut HashMap<RecordRef, Color>,
    ) -> Option<Vec<Edge>> {
        // Frame: (record, index of the next outgoing edge to try).
        let mut stack: Vec<(RecordRef, usize)> = vec![(start, 0)];
        // Edge path from `start` to the current node; len == stack.len() - 1.
        let mut path: Vec<Edge> = Vec::new();
        color.insert(start, Color::Gray);

        while let Some(&(rec, idx)) = stack.last() {
            let edges = graph.edges_from(&rec);
            if idx >= edges.len() {
                color.insert(rec, Color::Black);
                stack.pop();
                path.pop();
                continue;
            }
            stack.last_mut().expect("frame present").1 += 1;

            let edge = edges[idx];
            // Edges to declared-but-unresolved leaves cannot close a cycle.
            if !graph.contains(&edge.to) {
                continue;
            }

            match color.get(&edge.to).copied().unwrap_or(Color::White) {
                Color::White => {
                    color.insert(edge.to, Color::Gray);
                    path.push(edge);
                    stack.push((edge.to, 0));
                }
                Color::Gray => {
                    // Back-edge: the cycle runs from the gray ancestor down the
                    // current path, then through this closing edge.
                    let mut cycle: Vec<Edge> = match path.iter().position(|e| e.from == edge.to) {
                        Some(pos) => path[pos..].to_vec(),
                        None => Vec::new(), // self-loop
                    };
                    cycle.push(edge);
                    return Some(cycle);
                }
                Color::Black => {}
            }
        }
        None
    }
}
