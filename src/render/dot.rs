//! GraphViz DOT output

use std::collections::HashSet;

use super::{node_id, RenderOptions};
use crate::graph::RenderModel;

/// Convert the model to DOT format for visualization
pub fn to_dot(model: &RenderModel, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("digraph DependencyGraph {\n");
    output.push_str(&format!("  label=\"{}\";\n", escape(&options.title(model))));
    output.push_str("  labelloc=t;\n");
    output.push_str(&format!("  rankdir={};\n", options.direction));
    output.push_str("  node [shape=box, style=\"filled,rounded\", ");
    output.push_str("fontname=\"Helvetica\", fontsize=10];\n");
    output.push_str("  edge [fontname=\"Helvetica\", fontsize=8, fontcolor=\"#606060\"];\n");
    output.push('\n');

    let mut declared: HashSet<&str> = HashSet::new();
    for node in &model.nodes {
        declared.insert(node.key.as_str());
        let penwidth = if node.independent { 1 } else { 2 };
        output.push_str(&format!(
            "  \"{}\" [label=\"{}\", fillcolor=\"{}\", penwidth={}];\n",
            node_id(&node.key),
            escape(&node.label),
            node.color,
            penwidth
        ));
    }

    // targets outside the scope still get a plain node
    for edge in &model.edges {
        if declared.insert(edge.target.as_str()) {
            let title = edge.label_lines().next().unwrap_or(edge.target.as_str());
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\", fillcolor=\"white\"];\n",
                node_id(&edge.target),
                escape(title)
            ));
        }
    }

    output.push('\n');

    for edge in &model.edges {
        let members: Vec<String> = edge.label_lines().skip(1).map(escape).collect();
        if members.is_empty() {
            output.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                node_id(&edge.source),
                node_id(&edge.target)
            ));
        } else {
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                node_id(&edge.source),
                node_id(&edge.target),
                members.join("\\n")
            ));
        }
    }

    for (i, cycle) in model.cycles.iter().enumerate() {
        output.push_str(&format!("  // cycle {}: {}\n", i + 1, cycle.join(" -> ")));
    }

    output.push_str("}\n");
    output
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
