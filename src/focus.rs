use crate::render_model::RenderGraph;
use serde::Serialize;
use std::collections::HashSet;

const EDGE_HIGHLIGHT_OPACITY: f32 = 1.0;
const EDGE_DIMMED_OPACITY: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeFocus {
    Selected,
    /// Shares a rendered edge with the selected node.
    Connected,
    Dimmed,
}

impl NodeFocus {
    pub fn opacity(self) -> f32 {
        match self {
            Self::Selected => 1.0,
            Self::Connected => 0.7,
            Self::Dimmed => 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeFocus {
    pub id: String,
    pub highlighted: bool,
}

impl EdgeFocus {
    pub fn opacity(&self) -> f32 {
        if self.highlighted {
            EDGE_HIGHLIGHT_OPACITY
        } else {
            EDGE_DIMMED_OPACITY
        }
    }
}

/// Display state of every node and edge while one node is selected. Entries
/// follow the emission order of the render graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Focus {
    pub selected: String,
    pub nodes: Vec<(String, NodeFocus)>,
    pub edges: Vec<EdgeFocus>,
}

impl Focus {
    pub fn node(&self, id: &str) -> Option<NodeFocus> {
        self.nodes
            .iter()
            .find(|(node_id, _)| node_id == id)
            .map(|(_, state)| *state)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeFocus> {
        self.edges.iter().find(|edge| edge.id == id)
    }
}

impl RenderGraph {
    /// `None` when `node_id` is not a rendered node.
    pub fn focus(&self, node_id: &str) -> Option<Focus> {
        self.node(node_id)?;

        let mut neighbours: HashSet<&str> = HashSet::new();
        let edges = self
            .edges
            .iter()
            .map(|edge| {
                let highlighted = if edge.source == node_id {
                    neighbours.insert(edge.target.as_str());
                    true
                } else if edge.target == node_id {
                    neighbours.insert(edge.source.as_str());
                    true
                } else {
                    false
                };
                EdgeFocus {
                    id: edge.id.clone(),
                    highlighted,
                }
            })
            .collect();

        let nodes = self
            .nodes
            .iter()
            .map(|node| {
                let state = if node.id == node_id {
                    NodeFocus::Selected
                } else if neighbours.contains(node.id.as_str()) {
                    NodeFocus::Connected
                } else {
                    NodeFocus::Dimmed
                };
                (node.id.clone(), state)
            })
            .collect();

        Some(Focus {
            selected: node_id.to_string(),
            nodes,
            edges,
        })
    }
}
