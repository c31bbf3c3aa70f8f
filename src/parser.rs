use crate::ir::{EdgeKind, Emphasis, Graph, Group, NodePatch, Role, is_skill_id};
use crate::roles::role_for_group_id;
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(flowchart|graph)(\s+\w+)?\s*$").unwrap());
static SUBGRAPH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^subgraph\s+(\w+)\s*(?:\["(.*)"\])?\s*$"#).unwrap());
static DECLARATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(\w+)\["(.+)"\]$"#).unwrap());
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)").unwrap());

const GROUP_OPEN: &str = "subgraph";
const GROUP_CLOSE: &str = "end";

/// Edge operators in match precedence; the skill marker must be tested first.
const EDGE_OPERATORS: [(&str, EdgeKind, Emphasis); 3] = [
    ("-.-", EdgeKind::Skill, Emphasis::Normal),
    ("==>", EdgeKind::Flow, Emphasis::Strong),
    ("-->", EdgeKind::Flow, Emphasis::Normal),
];

const IGNORED_PREFIXES: [&str; 4] = ["classDef", "class ", "style ", "linkStyle "];

#[derive(Debug, Clone, PartialEq)]
struct EdgeLine {
    source: String,
    target: String,
    target_label: Option<String>,
    kind: EdgeKind,
    emphasis: Emphasis,
}

/// Trimmed, non-empty lines with comments, the diagram header and styling
/// statements removed. Anything else passes through untouched.
pub fn classify_lines(input: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in input.lines() {
        let trimmed_line = raw_line.trim();
        if trimmed_line.is_empty() || trimmed_line.starts_with("%%") {
            continue;
        }
        let line = strip_trailing_comment(trimmed_line);
        if line.is_empty() {
            continue;
        }
        if HEADER_RE.is_match(&line) {
            continue;
        }
        if IGNORED_PREFIXES
            .iter()
            .any(|prefix| line.starts_with(prefix))
        {
            continue;
        }
        lines.push(line);
    }
    lines
}

/// Builds the node, edge and group tables. Never fails: lines that match no
/// recognised form are dropped.
pub fn parse_diagram(input: &str) -> Graph {
    let mut graph = Graph::new();
    let mut current_group: Option<usize> = None;

    let lines = classify_lines(input);
    for (idx, line) in lines.iter().enumerate() {
        if is_group_open(line) {
            match SUBGRAPH_RE.captures(line) {
                Some(caps) => {
                    let id = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                    let label = caps.get(2).map(|m| m.as_str()).unwrap_or(id);
                    current_group = Some(open_group(&mut graph, id, label));
                }
                None => trace!(line = line.as_str(); "Malformed group header skipped"),
            }
            continue;
        }

        if *line == GROUP_CLOSE {
            current_group = None;
            continue;
        }

        if EDGE_OPERATORS.iter().any(|(op, _, _)| line.contains(op)) {
            match parse_edge_line(line) {
                Some(edge_line) => add_edge(&mut graph, edge_line, current_group),
                None => trace!(line = line.as_str(); "Malformed edge skipped"),
            }
            continue;
        }

        if let Some((id, label)) = parse_declaration(line) {
            if current_group.is_none()
                && role_for_group_id(id).is_some()
                && closes_before_next_group(&lines[idx + 1..])
            {
                current_group = Some(open_group(&mut graph, id, label));
                continue;
            }
            declare_node(&mut graph, id, label, current_group);
            continue;
        }

        trace!(line = line.as_str(); "Unrecognised line ignored");
    }

    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        groups = graph.groups.len();
        "Diagram parsed"
    );
    graph
}

fn is_group_open(line: &str) -> bool {
    line.split_whitespace().next() == Some(GROUP_OPEN)
}

/// A keyword-less header only opens a group when an `end` follows before
/// any other group header; otherwise the line is a plain declaration.
fn closes_before_next_group(rest: &[String]) -> bool {
    for line in rest {
        if line == GROUP_CLOSE {
            return true;
        }
        if is_group_open(line) {
            return false;
        }
    }
    false
}

fn open_group(graph: &mut Graph, id: &str, label: &str) -> usize {
    if let Some(idx) = graph.groups.iter().position(|group| group.id == id) {
        graph.groups[idx].label = label.to_string();
        return idx;
    }
    graph.groups.push(Group::new(id, label));
    graph.groups.len() - 1
}

fn add_to_group(graph: &mut Graph, current_group: Option<usize>, node_id: &str) {
    if let Some(group) = current_group.and_then(|idx| graph.groups.get_mut(idx)) {
        group.add_member(node_id);
    }
}

fn declare_node(graph: &mut Graph, id: &str, label: &str, current_group: Option<usize>) {
    let node = graph.merge_node(id, NodePatch::labelled(label));
    if node.is_skill() {
        return;
    }
    add_to_group(graph, current_group, id);
}

fn parse_declaration(text: &str) -> Option<(&str, &str)> {
    let caps = DECLARATION_RE.captures(text)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

fn parse_bare_id(text: &str) -> Option<&str> {
    ID_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn parse_edge_line(line: &str) -> Option<EdgeLine> {
    let (op, kind, emphasis) = EDGE_OPERATORS
        .iter()
        .find(|(op, _, _)| line.contains(op))
        .copied()?;

    let mut parts = line.split(op).map(str::trim);
    let left = parts.next()?;
    let right = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let source = parse_bare_id(left)?.to_string();
    let (target, target_label) = match parse_declaration(right) {
        Some((id, label)) => (id.to_string(), Some(label.to_string())),
        None => (parse_bare_id(right)?.to_string(), None),
    };

    Some(EdgeLine {
        source,
        target,
        target_label,
        kind,
        emphasis,
    })
}

fn add_edge(graph: &mut Graph, edge_line: EdgeLine, current_group: Option<usize>) {
    graph.ensure_node(&edge_line.source);
    match &edge_line.target_label {
        Some(label) => {
            let patch = NodePatch {
                label: Some(label.clone()),
                role: is_skill_id(&edge_line.target).then_some(Role::Skill),
                group_id: None,
            };
            let node = graph.merge_node(&edge_line.target, patch);
            if !node.is_skill() {
                add_to_group(graph, current_group, &edge_line.target);
            }
        }
        None => {
            graph.ensure_node(&edge_line.target);
        }
    }

    graph.edges.push(crate::ir::Edge {
        source: edge_line.source,
        target: edge_line.target,
        kind: edge_line.kind,
        emphasis: edge_line.emphasis,
    });
}

fn strip_trailing_comment(line: &str) -> String {
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    let mut out = String::new();
    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            out.push(ch);
            continue;
        }
        if ch == '"' {
            quote = Some(ch);
            out.push(ch);
            continue;
        }
        if ch == '%'
            && let Some('%') = chars.peek().copied()
        {
            break;
        }
        out.push(ch);
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_drops_directives_styles_and_comments() {
        let input = "flowchart TD\n  %% a comment\nclassDef hot fill:#f00\nclass a hot\nstyle a fill:#0f0\nlinkStyle 0 stroke:#0ff\n\n  a[\"A\"]  \nwhatever";
        assert_eq!(classify_lines(input), vec!["a[\"A\"]", "whatever"]);
    }

    #[test]
    fn classifier_keeps_ids_that_start_with_graph() {
        let lines = classify_lines("graph TD\ngraph_builder --> b");
        assert_eq!(lines, vec!["graph_builder --> b"]);
    }

    #[test]
    fn classifier_strips_trailing_comments_outside_quotes() {
        let lines = classify_lines("a[\"50%% off\"] %% promo\nb --> c %% note");
        assert_eq!(lines, vec!["a[\"50%% off\"]", "b --> c"]);
    }

    #[test]
    fn parse_group_membership() {
        let graph = parse_diagram(
            "flowchart TD\nsubgraph services[\"Services\"]\nsearch[\"Search\"]\nrank[\"Rank\"]\nend\nother[\"Other\"]",
        );
        assert_eq!(graph.groups.len(), 1);
        assert_eq!(graph.groups[0].label, "Services");
        assert_eq!(graph.groups[0].members, vec!["search", "rank"]);
        assert_eq!(graph.nodes.len(), 3);
    }

    #[test]
    fn keywordless_well_known_group_header_opens_group() {
        let graph = parse_diagram("orchestrator_group[\"Orchestration\"]\nplanner[\"Planner\"]\nend");
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.groups[0].id, "orchestrator_group");
        assert_eq!(graph.groups[0].members, vec!["planner"]);
    }

    #[test]
    fn well_known_group_id_without_end_is_a_plain_declaration() {
        let graph = parse_diagram("gateway[\"API Gateway\"]\nplanner[\"Planner\"]\ngateway --> planner");
        assert!(graph.groups.is_empty());
        assert_eq!(graph.nodes["gateway"].label(), "API Gateway");
        assert_eq!(graph.nodes["planner"].label(), "Planner");
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn keywordless_header_needs_end_before_next_subgraph() {
        let graph = parse_diagram(
            "data[\"Data\"]\nsubgraph services[\"Services\"]\nsearch[\"Search\"]\nend",
        );
        assert_eq!(graph.groups.len(), 1);
        assert_eq!(graph.groups[0].id, "services");
        assert_eq!(graph.nodes["data"].label(), "Data");
    }

    #[test]
    fn well_known_id_inside_a_group_is_a_member() {
        let graph = parse_diagram("subgraph team[\"Team\"]\nstorage[\"Blob Storage\"]\nend");
        assert_eq!(graph.groups.len(), 1);
        assert_eq!(graph.groups[0].members, vec!["storage"]);
        assert_eq!(graph.nodes["storage"].label(), "Blob Storage");
    }

    #[test]
    fn link_style_prefix_needs_a_separator() {
        let lines = classify_lines("linkStyle 0 stroke:#0ff\nlinkStyleRouter --> x");
        assert_eq!(lines, vec!["linkStyleRouter --> x"]);
        let graph = parse_diagram("linkStyleRouter --> x");
        assert!(graph.nodes.contains_key("linkStyleRouter"));
    }

    #[test]
    fn ids_starting_with_the_group_keyword_are_nodes() {
        let graph = parse_diagram("subgraph_a --> b");
        assert!(graph.groups.is_empty());
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn group_without_label_uses_id() {
        let graph = parse_diagram("subgraph misc\na[\"A\"]\nend");
        assert_eq!(graph.groups[0].label, "misc");
    }

    #[test]
    fn edge_operators_set_kind_and_emphasis() {
        let graph = parse_diagram("a --> b\nc ==> d\ne -.- skills_e[\"Search\"]");
        assert_eq!(graph.edges.len(), 3);
        assert_eq!(graph.edges[0].kind, EdgeKind::Flow);
        assert_eq!(graph.edges[0].emphasis, Emphasis::Normal);
        assert_eq!(graph.edges[1].emphasis, Emphasis::Strong);
        assert_eq!(graph.edges[2].kind, EdgeKind::Skill);
        assert!(graph.nodes["skills_e"].is_skill());
    }

    #[test]
    fn left_declaration_is_reduced_to_id() {
        let graph = parse_diagram("a[\"Alpha\"] --> b[\"Beta\"]");
        assert_eq!(graph.edges[0].source, "a");
        assert_eq!(graph.nodes["a"].label(), "a");
        assert_eq!(graph.nodes["b"].label(), "Beta");
    }

    #[test]
    fn right_declaration_joins_current_group_but_source_does_not() {
        let graph = parse_diagram("subgraph services[\"S\"]\nhub --> worker[\"Worker\"]\nend");
        assert_eq!(graph.groups[0].members, vec!["worker"]);
    }

    #[test]
    fn skill_declarations_never_join_groups() {
        let graph = parse_diagram(
            "subgraph services[\"S\"]\nskills_a[\"Search\"]\na[\"A\"] -.- skills_b[\"Rank\"]\nend",
        );
        assert!(graph.groups[0].members.is_empty());
        assert!(graph.nodes["skills_a"].is_skill());
        assert!(graph.nodes["skills_b"].is_skill());
    }

    #[test]
    fn placeholders_hydrate_from_later_declarations() {
        let graph = parse_diagram("X --> Y\nY[\"Why\"]");
        assert_eq!(graph.nodes["X"].label(), "X");
        assert_eq!(graph.nodes["Y"].label(), "Why");
        assert_eq!(graph.nodes["Y"].role, None);
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let forward = parse_diagram("A[\"foo\"]\nA --> B[\"bar\"]");
        let reversed = parse_diagram("A --> B[\"bar\"]\nA[\"foo\"]");
        for id in ["A", "B"] {
            assert_eq!(forward.nodes[id].label(), reversed.nodes[id].label());
            assert_eq!(forward.nodes[id].role, reversed.nodes[id].role);
        }
        assert_eq!(forward.nodes["A"].label(), "foo");
        assert_eq!(forward.nodes["B"].label(), "bar");
    }

    #[test]
    fn malformed_edges_create_nothing() {
        let graph = parse_diagram("a --> \n--> b\na --> b --> c\n\"x\" --> y");
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn unrecognised_lines_are_ignored() {
        let graph = parse_diagram("direction LR\nclick a callback\n???");
        assert!(graph.nodes.is_empty());
        assert!(graph.groups.is_empty());
    }

    #[test]
    fn end_outside_group_is_harmless() {
        let graph = parse_diagram("end\na[\"A\"]");
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn reopening_a_group_accumulates_members() {
        let graph =
            parse_diagram("subgraph data[\"Data\"]\na[\"A\"]\nend\nsubgraph data[\"Data\"]\nb[\"B\"]\nend");
        assert_eq!(graph.groups.len(), 1);
        assert_eq!(graph.groups[0].members, vec!["a", "b"]);
    }

    #[test]
    fn empty_input_gives_empty_graph() {
        let graph = parse_diagram("");
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.groups.is_empty());
    }
}
