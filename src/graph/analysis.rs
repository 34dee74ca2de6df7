//! Circular dependency groups
//!
//! Strongly connected components of the emitted edge set. Only groups with
//! more than one member are reported; self references never reach the map.

use std::collections::HashMap;

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::classify::RenderEdge;
use super::UniqueKey;

/// Groups of artifacts that reference each other in a loop
///
/// Members of a group are sorted, and groups are sorted by their first member.
pub fn find_cycles(edges: &[RenderEdge]) -> Vec<Vec<UniqueKey>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();

    for edge in edges {
        let source = *index
            .entry(edge.source.as_str())
            .or_insert_with(|| graph.add_node(edge.source.as_str()));
        let target = *index
            .entry(edge.target.as_str())
            .or_insert_with(|| graph.add_node(edge.target.as_str()));
        graph.update_edge(source, target, ());
    }

    let mut groups: Vec<Vec<UniqueKey>> = kosaraju_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut members: Vec<UniqueKey> = scc.iter().map(|n| graph[*n].to_string()).collect();
            members.sort();
            members
        })
        .collect();
    groups.sort();
    groups
}
