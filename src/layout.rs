//! Boundary to the layered layout engine.
//!
//! The compiler flattens its graph to sized nodes and plain edges, hands them
//! to a [`LayoutEngine`] once, and reads back one center-based coordinate pair
//! per node. Groups are never passed to the engine. [`ranking`] then
//! re-centers the ranks the engine produced.

pub mod dagre;
pub mod ranking;

use crate::config::LayoutConfig;
use crate::ir::Graph;
use log::debug;
use std::collections::{HashMap, HashSet};

pub use dagre::DagreEngine;

#[derive(Debug, Clone, PartialEq)]
pub struct SizedNode {
    pub id: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
}

/// Flat input handed to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutGraph {
    pub nodes: Vec<SizedNode>,
    pub edges: Vec<LayoutEdge>,
}

/// A positioned node; `x`/`y` are the center of its box.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutNode {
    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

pub trait LayoutEngine {
    /// Returns the center of every node the engine placed. Nodes missing from
    /// the result are dropped by the caller.
    fn layout(&self, graph: &LayoutGraph, config: &LayoutConfig) -> HashMap<String, (f32, f32)>;
}

/// Non-skill nodes at the configured uniform size, plus the rendered flow
/// edges between them, both in stable order.
pub fn build_layout_graph(graph: &Graph, config: &LayoutConfig) -> LayoutGraph {
    let nodes: Vec<SizedNode> = graph
        .ordered_node_ids()
        .into_iter()
        .filter(|id| graph.is_rendered(id))
        .map(|id| SizedNode {
            id: id.to_string(),
            width: config.node_width,
            height: config.node_height,
        })
        .collect();

    let mut edge_set: HashSet<(&str, &str)> = HashSet::new();
    let mut edges = Vec::new();
    for (_, edge) in graph.rendered_edges() {
        if !edge_set.insert((edge.source.as_str(), edge.target.as_str())) {
            continue;
        }
        edges.push(LayoutEdge {
            source: edge.source.clone(),
            target: edge.target.clone(),
        });
    }

    LayoutGraph { nodes, edges }
}

/// Runs `engine` over the flattened graph and re-centers the resulting ranks.
pub fn compute_layout(
    graph: &Graph,
    config: &LayoutConfig,
    engine: &dyn LayoutEngine,
) -> Vec<LayoutNode> {
    let layout_graph = build_layout_graph(graph, config);
    if layout_graph.nodes.is_empty() {
        return Vec::new();
    }

    let positions = engine.layout(&layout_graph, config);
    let mut nodes: Vec<LayoutNode> = layout_graph
        .nodes
        .into_iter()
        .filter_map(|node| {
            let (x, y) = positions.get(&node.id).copied()?;
            Some(LayoutNode {
                id: node.id,
                x,
                y,
                width: node.width,
                height: node.height,
            })
        })
        .collect();
    debug!(
        nodes = nodes.len(),
        edges = layout_graph.edges.len();
        "Layout computed"
    );

    ranking::center_ranks(&mut nodes);
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_diagram;

    struct StackEngine;

    impl LayoutEngine for StackEngine {
        fn layout(
            &self,
            graph: &LayoutGraph,
            config: &LayoutConfig,
        ) -> HashMap<String, (f32, f32)> {
            graph
                .nodes
                .iter()
                .enumerate()
                .filter(|(_, node)| node.id != "dropped")
                .map(|(idx, node)| {
                    let y = idx as f32 * (config.node_height + config.rank_spacing);
                    (node.id.clone(), (10.0 * idx as f32, y))
                })
                .collect()
        }
    }

    #[test]
    fn layout_graph_excludes_skills_and_duplicate_edges() {
        let graph = parse_diagram(
            "a[\"A\"] -.- skills_a[\"Search\"]\na --> b\na --> b\na ==> b\nb --> skills_a",
        );
        let config = LayoutConfig::default();
        let layout_graph = build_layout_graph(&graph, &config);
        let ids: Vec<&str> = layout_graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(layout_graph.edges.len(), 1);
        assert!(
            layout_graph
                .nodes
                .iter()
                .all(|n| n.width == 300.0 && n.height == 200.0)
        );
    }

    #[test]
    fn empty_graph_skips_the_engine() {
        let graph = parse_diagram("");
        assert!(compute_layout(&graph, &LayoutConfig::default(), &StackEngine).is_empty());
    }

    #[test]
    fn nodes_the_engine_did_not_place_are_dropped() {
        let graph = parse_diagram("a --> dropped\na --> c");
        let nodes = compute_layout(&graph, &LayoutConfig::default(), &StackEngine);
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn single_node_ranks_share_one_axis() {
        let graph = parse_diagram("a --> b\nb --> c");
        let nodes = compute_layout(&graph, &LayoutConfig::default(), &StackEngine);
        assert!(nodes.iter().all(|n| n.x == nodes[0].x));
    }
}
