use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Id prefix reserved for skill-definition nodes.
pub const SKILL_PREFIX: &str = "skills_";

/// Semantic category of a diagram node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Entry,
    Orchestrator,
    Service,
    Data,
    /// Carries a capability list for skill aggregation; never rendered.
    Skill,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    /// `None` until a declaration hydrates the node; placeholders display their id.
    pub label: Option<String>,
    pub role: Option<Role>,
    pub group_id: Option<String>,
    pub skills: Vec<String>,
}

impl Node {
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: None,
            role: is_skill_id(id).then_some(Role::Skill),
            group_id: None,
            skills: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn is_skill(&self) -> bool {
        self.role == Some(Role::Skill)
    }

    /// Applies a partial record. Declared labels replace earlier ones; role
    /// and group are only filled when still absent.
    pub fn merge(&mut self, patch: NodePatch) {
        if let Some(label) = patch.label {
            self.label = Some(label);
        }
        if self.role.is_none() {
            self.role = patch.role;
        }
        if self.group_id.is_none() {
            self.group_id = patch.group_id;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub label: Option<String>,
    pub role: Option<Role>,
    pub group_id: Option<String>,
}

impl NodePatch {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Flow,
    Skill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Normal,
    Strong,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub emphasis: Emphasis,
}

impl Edge {
    pub fn is_skill(&self) -> bool {
        self.kind == EdgeKind::Skill
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub label: String,
    pub members: Vec<String>,
}

impl Group {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            members: Vec::new(),
        }
    }

    /// Appends `node_id` unless it is already a member.
    pub fn add_member(&mut self, node_id: &str) -> bool {
        if self.members.iter().any(|member| member == node_id) {
            return false;
        }
        self.members.push(node_id.to_string());
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: BTreeMap<String, Node>,
    /// First-seen index of every node id; drives stable emission order.
    pub node_order: HashMap<String, usize>,
    pub edges: Vec<Edge>,
    pub groups: Vec<Group>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a placeholder for `id` when missing and merges `patch` into it.
    pub fn merge_node(&mut self, id: &str, patch: NodePatch) -> &mut Node {
        if !self.nodes.contains_key(id) {
            let order = self.node_order.len();
            self.node_order.insert(id.to_string(), order);
        }
        let node = self
            .nodes
            .entry(id.to_string())
            .or_insert_with(|| Node::placeholder(id));
        node.merge(patch);
        node
    }

    pub fn ensure_node(&mut self, id: &str) -> &mut Node {
        self.merge_node(id, NodePatch::default())
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    pub fn group_mut(&mut self, id: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|group| group.id == id)
    }

    /// Node ids in first-seen order.
    pub fn ordered_node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_by_key(|id| self.node_order.get(*id).copied().unwrap_or(usize::MAX));
        ids
    }

    /// Flow edges whose endpoints are both renderable (non-skill) nodes,
    /// paired with their index in the raw edge list.
    pub fn rendered_edges(&self) -> impl Iterator<Item = (usize, &Edge)> {
        self.edges.iter().enumerate().filter(|(_, edge)| {
            !edge.is_skill() && self.is_rendered(&edge.source) && self.is_rendered(&edge.target)
        })
    }

    pub fn is_rendered(&self, id: &str) -> bool {
        self.nodes.get(id).is_some_and(|node| !node.is_skill())
    }
}

pub fn is_skill_id(id: &str) -> bool {
    id.starts_with(SKILL_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_uses_id_as_label() {
        let node = Node::placeholder("X");
        assert_eq!(node.label(), "X");
        assert_eq!(node.role, None);
    }

    #[test]
    fn skill_prefix_marks_placeholder_as_skill() {
        assert!(Node::placeholder("skills_agent").is_skill());
    }

    #[test]
    fn merge_fills_role_only_when_absent() {
        let mut graph = Graph::new();
        graph.merge_node(
            "a",
            NodePatch {
                role: Some(Role::Data),
                ..NodePatch::default()
            },
        );
        let node = graph.merge_node(
            "a",
            NodePatch {
                label: Some("Store".to_string()),
                role: Some(Role::Service),
                group_id: None,
            },
        );
        assert_eq!(node.role, Some(Role::Data));
        assert_eq!(node.label(), "Store");
    }

    #[test]
    fn node_order_tracks_first_sighting() {
        let mut graph = Graph::new();
        graph.ensure_node("z");
        graph.ensure_node("a");
        graph.ensure_node("z");
        assert_eq!(graph.ordered_node_ids(), vec!["z", "a"]);
    }

    #[test]
    fn group_members_are_unique() {
        let mut group = Group::new("services", "Services");
        assert!(group.add_member("a"));
        assert!(!group.add_member("a"));
        assert_eq!(group.members, vec!["a"]);
    }
}
