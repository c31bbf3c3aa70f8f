use crate::ir::Graph;
use log::debug;

/// Folds skill edges into the `skills` list of their source node. Labels of
/// skill targets are comma-split and trimmed; order and duplicates are kept.
pub fn aggregate_skills(graph: &mut Graph) {
    let mut folded = 0usize;
    let mut attachments: Vec<(String, Vec<String>)> = Vec::new();

    for id in graph.ordered_node_ids() {
        let Some(node) = graph.nodes.get(id) else {
            continue;
        };
        if node.is_skill() {
            continue;
        }
        let mut skills = Vec::new();
        for edge in graph
            .edges
            .iter()
            .filter(|edge| edge.is_skill() && edge.source == id)
        {
            let Some(target) = graph.nodes.get(&edge.target) else {
                continue;
            };
            let label = target.label();
            if label.is_empty() {
                continue;
            }
            skills.extend(label.split(',').map(|skill| skill.trim().to_string()));
            folded += 1;
        }
        if !skills.is_empty() {
            attachments.push((id.to_string(), skills));
        }
    }

    for (id, skills) in attachments {
        if let Some(node) = graph.nodes.get_mut(&id) {
            node.skills.extend(skills);
        }
    }
    debug!(folded; "Skill edges folded");
}
