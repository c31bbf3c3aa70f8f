//! Projection of the classified graph plus final coordinates into the
//! node/edge records consumed by the diagram renderer.

use crate::config::{Config, GroupFrameConfig};
use crate::ir::{Emphasis, Graph, Role};
use crate::layout::LayoutNode;
use crate::roles::role_for_group_id;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const EDGE_PATH: &str = "smoothstep";

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub id: String,
    pub role: Option<Role>,
    pub label: String,
    pub slug: String,
    pub skills: Vec<String>,
    /// Has at least one outgoing rendered edge.
    pub has_source: bool,
    /// Has at least one incoming rendered edge.
    pub has_target: bool,
    /// Top-left corner.
    pub position: Position,
    pub width: f32,
    pub height: f32,
    pub draggable: bool,
}

impl RenderNode {
    pub fn right(&self) -> f32 {
        self.position.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub style: Emphasis,
    pub animated: bool,
    pub path: String,
}

/// Informational frame around the rendered members of a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderGroup {
    pub id: String,
    pub label: String,
    pub role: Option<Role>,
    pub members: Vec<String>,
    pub position: Position,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    pub groups: Vec<RenderGroup>,
    pub width: f32,
    pub height: f32,
}

impl RenderGraph {
    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Lower-cased label with every whitespace run replaced by `-`.
pub fn slugify(label: &str) -> String {
    WHITESPACE_RE
        .replace_all(&label.to_lowercase(), "-")
        .into_owned()
}

pub fn project(graph: &Graph, layout: &[LayoutNode], config: &Config) -> RenderGraph {
    let placed: HashSet<&str> = layout.iter().map(|node| node.id.as_str()).collect();

    let edges: Vec<RenderEdge> = graph
        .rendered_edges()
        .filter(|(_, edge)| {
            placed.contains(edge.source.as_str()) && placed.contains(edge.target.as_str())
        })
        .map(|(idx, edge)| RenderEdge {
            id: format!("e-{idx}"),
            source: edge.source.clone(),
            target: edge.target.clone(),
            style: edge.emphasis,
            animated: true,
            path: EDGE_PATH.to_string(),
        })
        .collect();

    let sources: HashSet<&str> = edges.iter().map(|edge| edge.source.as_str()).collect();
    let targets: HashSet<&str> = edges.iter().map(|edge| edge.target.as_str()).collect();

    let mut nodes = Vec::with_capacity(layout.len());
    for placed_node in layout {
        let Some(node) = graph.nodes.get(&placed_node.id) else {
            continue;
        };
        let label = node.label().to_string();
        nodes.push(RenderNode {
            id: node.id.clone(),
            role: node.role,
            slug: slugify(&label),
            label,
            skills: node.skills.clone(),
            has_source: sources.contains(node.id.as_str()),
            has_target: targets.contains(node.id.as_str()),
            position: Position {
                x: placed_node.left(),
                y: placed_node.y - placed_node.height / 2.0,
            },
            width: placed_node.width,
            height: placed_node.height,
            draggable: false,
        });
    }

    let groups = group_frames(graph, &nodes, &config.groups);
    let width = nodes.iter().map(RenderNode::right).fold(0.0, f32::max);
    let height = nodes.iter().map(RenderNode::bottom).fold(0.0, f32::max);

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        groups = groups.len();
        "Render model projected"
    );
    RenderGraph {
        nodes,
        edges,
        groups,
        width,
        height,
    }
}

fn group_frames(graph: &Graph, nodes: &[RenderNode], frame: &GroupFrameConfig) -> Vec<RenderGroup> {
    let by_id: HashMap<&str, &RenderNode> =
        nodes.iter().map(|node| (node.id.as_str(), node)).collect();

    let mut frames = Vec::new();
    for group in &graph.groups {
        let members: Vec<&RenderNode> = group
            .members
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).copied())
            .collect();
        if members.is_empty() {
            continue;
        }

        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        for member in &members {
            min_x = min_x.min(member.position.x);
            min_y = min_y.min(member.position.y);
            max_x = max_x.max(member.right());
            max_y = max_y.max(member.bottom());
        }

        frames.push(RenderGroup {
            id: group.id.clone(),
            label: group.label.clone(),
            role: role_for_group_id(&group.id),
            members: members.iter().map(|member| member.id.clone()).collect(),
            position: Position {
                x: min_x - frame.padding,
                y: min_y - frame.padding - frame.header_height,
            },
            width: max_x - min_x + frame.padding * 2.0,
            height: max_y - min_y + frame.padding * 2.0 + frame.header_height,
        });
    }
    frames
}

/// Writes one model, or a slice of models, as JSON.
pub fn write_render_model<T>(path: &Path, model: &T, pretty: bool) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, model)?;
    } else {
        serde_json::to_writer(&mut writer, model)?;
    }
    writer.flush()?;
    Ok(())
}
