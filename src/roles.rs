//! Role assignment: bulk assignment from well-known group ids, then keyword
//! inference for nodes that no recognised group claimed.

use crate::ir::{Graph, Group, NodePatch, Role};
use log::{debug, trace};

/// Well-known group ids, including legacy spellings, and the role each implies.
const GROUP_ROLES: &[(&str, Role)] = &[
    ("entrypoints", Role::Entry),
    ("entry_points", Role::Entry),
    ("entry", Role::Entry),
    ("entry_group", Role::Entry),
    ("gateway", Role::Entry),
    ("gateways", Role::Entry),
    ("orchestrators", Role::Orchestrator),
    ("orchestrator", Role::Orchestrator),
    ("orchestration", Role::Orchestrator),
    ("orchestrator_group", Role::Orchestrator),
    ("services", Role::Service),
    ("service", Role::Service),
    ("service_group", Role::Service),
    ("service_layer", Role::Service),
    ("data", Role::Data),
    ("data_layer", Role::Data),
    ("data_group", Role::Data),
    ("datastores", Role::Data),
    ("data_stores", Role::Data),
    ("storage", Role::Data),
];

/// Keyword sets tried in order against a floating node's label and id;
/// the first hit wins.
const ROLE_KEYWORDS: &[(Role, &[&str])] = &[
    (
        Role::Service,
        &["service", "svc", "worker", "executor", "tool"],
    ),
    (
        Role::Data,
        &[
            "data",
            "_db",
            " db",
            "db_",
            "store",
            "storage",
            "cache",
            "repository",
            "warehouse",
            "sql",
            "vector",
        ],
    ),
    (
        Role::Orchestrator,
        &[
            "orchestrat",
            "planner",
            "coordinator",
            "router",
            "supervisor",
            "manager",
        ],
    ),
    (
        Role::Entry,
        &["gateway", "entry", "ingress", "frontend", "client", "user"],
    ),
];

pub fn role_for_group_id(group_id: &str) -> Option<Role> {
    GROUP_ROLES
        .iter()
        .find(|(id, _)| *id == group_id)
        .map(|(_, role)| *role)
}

/// Id and label of the group that heuristically classified nodes join.
pub fn synthetic_group(role: Role) -> Option<(&'static str, &'static str)> {
    match role {
        Role::Entry => Some(("entrypoints", "Entry Points")),
        Role::Orchestrator => Some(("orchestrators", "Orchestrators")),
        Role::Service => Some(("services", "Services")),
        Role::Data => Some(("data", "Data Layer")),
        Role::Skill => None,
    }
}

pub fn infer_role(label: &str, id: &str) -> Option<Role> {
    let label = label.to_lowercase();
    let id = id.to_lowercase();
    ROLE_KEYWORDS
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| label.contains(keyword) || id.contains(keyword))
        })
        .map(|(role, _)| *role)
}

/// Gives every member of a recognised group that group's role and id.
pub fn resolve_group_roles(graph: &mut Graph) {
    let mut assigned = 0usize;
    for group in &graph.groups {
        let Some(role) = role_for_group_id(&group.id) else {
            trace!(group = group.id.as_str(); "Opaque group left unclassified");
            continue;
        };
        for member in &group.members {
            let Some(node) = graph.nodes.get_mut(member) else {
                continue;
            };
            if node.role.is_some() {
                continue;
            }
            node.merge(NodePatch {
                label: None,
                role: Some(role),
                group_id: Some(group.id.clone()),
            });
            assigned += 1;
        }
    }
    debug!(assigned; "Group roles resolved");
}

/// Classifies floating nodes by keyword and files them into the synthetic
/// group for their role. Running it again is a no-op.
pub fn infer_roles(graph: &mut Graph) {
    let floating: Vec<String> = graph
        .ordered_node_ids()
        .into_iter()
        .filter(|id| {
            graph.nodes.get(*id).is_some_and(|node| {
                !node.is_skill() && (node.group_id.is_none() || node.role.is_none())
            })
        })
        .map(str::to_string)
        .collect();

    let mut classified = 0usize;
    for id in floating {
        let Some(node) = graph.nodes.get_mut(&id) else {
            continue;
        };
        let Some(role) = infer_role(node.label(), &node.id) else {
            trace!(node = id.as_str(); "No role keyword matched");
            continue;
        };
        let Some((group_id, group_label)) = synthetic_group(role) else {
            continue;
        };
        node.merge(NodePatch {
            label: None,
            role: Some(role),
            group_id: Some(group_id.to_string()),
        });
        if node.group_id.as_deref() != Some(group_id) {
            continue;
        }

        if graph.group(group_id).is_none() {
            graph.groups.push(Group::new(group_id, group_label));
        }
        if let Some(group) = graph.group_mut(group_id) {
            group.add_member(&id);
        }
        classified += 1;
    }
    debug!(classified; "Floating nodes classified");
}
