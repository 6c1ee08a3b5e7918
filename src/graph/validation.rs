// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Whole-graph checks run before a graph is handed to an engine.
//!
//! `Graph::connect_with` already rejects every cycle incrementally, so on a graph
//! built through the public API these sweeps always succeed. They exist so an
//! engine can assert the invariant once, and so tests can state it directly.
//!
//! ## Cycle Detection Algorithm
//! Uses **Depth-First Search (DFS) with recursion stack**:
//! - **Time Complexity**: O(V + E)
//! - **Advantage**: Provides the actual cycle path for debugging
//!
//! ## Level Computation
//! Uses **Kahn's algorithm**, grouping nodes whose in-degree drops to zero in
//! the same round into one level. Nodes keep declaration order inside a level.

use std::collections::{HashMap, HashSet};

use crate::errors::GraphError;
use crate::graph::{Graph, NodeId};

pub fn validate_acyclic(graph: &Graph) -> Result<(), GraphError> {
    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for node in graph.nodes() {
        if !visited.contains(node.id()) {
            if let Some(cycle) = dfs_cycle_detection(node.id(), graph, &mut visited, &mut rec_stack, &mut path) {
                let from = cycle.get(cycle.len().saturating_sub(2)).cloned().unwrap_or_default();
                let to = cycle.last().cloned().unwrap_or_default();
                return Err(GraphError::Cycle { from, to, cycle });
            }
        }
    }
    Ok(())
}

fn dfs_cycle_detection<'g>(
    node: &'g NodeId,
    graph: &'g Graph,
    visited: &mut HashSet<&'g NodeId>,
    rec_stack: &mut HashSet<&'g NodeId>,
    path: &mut Vec<&'g NodeId>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    for neighbor in graph.successors(node) {
        if !visited.contains(neighbor) {
            if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                return Some(cycle);
            }
        } else if rec_stack.contains(neighbor) {
            // back edge: the cycle is the path segment starting at `neighbor`
            let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(neighbor.to_string());
            return Some(cycle);
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}

pub fn topological_levels(graph: &Graph) -> Result<Vec<Vec<NodeId>>, GraphError> {
    let mut in_degree: HashMap<&NodeId, usize> = graph.nodes().map(|n| (n.id(), 0)).collect();
    for node in graph.nodes() {
        for next in graph.successors(node.id()) {
            if let Some(count) = in_degree.get_mut(next) {
                *count += 1;
            }
        }
    }

    let mut levels = Vec::new();
    let mut current: Vec<&NodeId> = graph
        .nodes()
        .map(|n| n.id())
        .filter(|id| in_degree.get(id).copied() == Some(0))
        .collect();
    let mut placed = 0;

    while !current.is_empty() {
        placed += current.len();
        let mut ready = HashSet::new();
        for id in &current {
            for next in graph.successors(id) {
                if let Some(count) = in_degree.get_mut(next) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(next);
                    }
                }
            }
        }
        levels.push(current.iter().map(|id| (*id).clone()).collect());
        current = graph
            .nodes()
            .map(|n| n.id())
            .filter(|id| ready.contains(id))
            .collect();
    }

    if placed != graph.node_count() {
        validate_acyclic(graph)?;
        return Err(GraphError::Cycle {
            from: String::new(),
            to: String::new(),
            cycle: Vec::new(),
        });
    }
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeSpec, PortRef};

    fn diamond() -> Graph {
        let mut g = Graph::new("diamond");
        g.declare_node(NodeSpec::identity("a", ["x"])).unwrap();
        g.declare_node(NodeSpec::identity("b", ["x"])).unwrap();
        g.declare_node(NodeSpec::identity("c", ["x"])).unwrap();
        g.declare_node(NodeSpec::identity("d", ["x", "y"])).unwrap();
        g.connect(PortRef::new("a", "x"), PortRef::new("b", "x")).unwrap();
        g.connect(PortRef::new("a", "x"), PortRef::new("c", "x")).unwrap();
        g.connect(PortRef::new("b", "x"), PortRef::new("d", "x")).unwrap();
        g.connect(PortRef::new("c", "x"), PortRef::new("d", "y")).unwrap();
        g
    }

    #[test]
    fn empty_graph_is_valid() {
        let g = Graph::new("empty");
        assert!(validate_acyclic(&g).is_ok());
        assert!(topological_levels(&g).unwrap().is_empty());
    }

    #[test]
    fn diamond_levels() {
        let levels = topological_levels(&diamond()).unwrap();
        let names: Vec<Vec<&str>> = levels
            .iter()
            .map(|l| l.iter().map(|n| n.as_str()).collect())
            .collect();
        assert_eq!(names, vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
    }

    #[test]
    fn disconnected_nodes_start_at_level_zero() {
        let mut g = diamond();
        g.declare_node(NodeSpec::identity("lonely", ["x"])).unwrap();
        let levels = topological_levels(&g).unwrap();
        assert!(levels[0].contains(&NodeId::from("lonely")));
    }

    #[test]
    fn graphs_built_through_connect_are_always_acyclic() {
        let mut g = diamond();
        assert!(g.connect(PortRef::new("d", "x"), PortRef::new("a", "x")).is_err());
        for node in g.nodes() {
            for next in g.successors(node.id()) {
                assert!(!g.is_reachable(next, node.id()));
            }
        }
        assert!(validate_acyclic(&g).is_ok());
    }
}
