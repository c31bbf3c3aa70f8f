use std::collections::HashMap;

use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use log::debug;

use super::{LayoutEngine, LayoutGraph};
use crate::config::LayoutConfig;

/// Layered top-to-bottom placement backed by `dagre_rust`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DagreEngine;

impl LayoutEngine for DagreEngine {
    fn layout(&self, graph: &LayoutGraph, config: &LayoutConfig) -> HashMap<String, (f32, f32)> {
        if graph.nodes.is_empty() {
            return HashMap::new();
        }

        let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
            DagreGraph::new(Some(GraphOption {
                directed: Some(true),
                multigraph: Some(false),
                compound: Some(false),
            }));

        let mut graph_config = DagreConfig::default();
        graph_config.rankdir = Some("tb".to_string());
        graph_config.nodesep = Some(config.node_spacing);
        graph_config.ranksep = Some(config.rank_spacing);
        graph_config.marginx = Some(config.margin_x);
        graph_config.marginy = Some(config.margin_y);
        dagre_graph.set_graph(graph_config);

        for sized in &graph.nodes {
            let mut node = DagreNode::default();
            node.width = sized.width;
            node.height = sized.height;
            dagre_graph.set_node(sized.id.clone(), Some(node));
        }
        for edge in &graph.edges {
            let _ = dagre_graph.set_edge(&edge.source, &edge.target, Some(DagreEdge::default()), None);
        }

        dagre_layout::run_layout(&mut dagre_graph);

        let mut positions = HashMap::with_capacity(graph.nodes.len());
        for sized in &graph.nodes {
            let Some(placed) = dagre_graph.node(&sized.id) else {
                continue;
            };
            positions.insert(sized.id.clone(), (placed.x, placed.y));
        }
        debug!(
            requested = graph.nodes.len(),
            placed = positions.len();
            "Dagre layout finished"
        );
        positions
    }
}
