//! Mermaid diagram embedded in a standalone HTML page

use std::collections::HashMap;

use super::{node_id, RenderOptions};
use crate::graph::{RenderEdge, RenderModel};

const MERMAID_CDN: &str = "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js";

/// The `graph <dir>` definition alone
pub fn to_mermaid(model: &RenderModel, direction: &str) -> String {
    let mut output = format!("graph {}\n", direction);

    let mut edges_by_source: HashMap<&str, Vec<&RenderEdge>> = HashMap::new();
    for edge in &model.edges {
        edges_by_source.entry(edge.source.as_str()).or_default().push(edge);
    }

    for node in &model.nodes {
        for edge in edges_by_source.get(node.key.as_str()).into_iter().flatten() {
            output.push_str(&format!(
                "{}(\"{}\") --> {}(\"{}\")\n",
                node_id(&edge.source),
                multiline_label(&edge.source_label),
                node_id(&edge.target),
                multiline_label(&edge.label)
            ));
        }
        if node.standalone {
            output.push_str(&format!(
                "{}(\"{}\")\n",
                node_id(&node.key),
                escape_label(&node.label)
            ));
        }
    }

    let independent = model.independent_labels();
    if !independent.is_empty() {
        let items: Vec<String> = independent.into_iter().map(escape_label).collect();
        output.push_str(&format!(
            "independentItems(\"ITEMS WITH NO DEPENDENCIES:<br><br>{}\")\n",
            items.join("<br>")
        ));
    }

    let high_fan_out = model.high_fan_out_keys();
    if !high_fan_out.is_empty() {
        let ids: Vec<String> = high_fan_out.into_iter().map(node_id).collect();
        output.push_str("\nclassDef moreRefs fill:orange,stroke-width:4px;\n");
        output.push_str(&format!("class {} moreRefs\n", ids.join(",")));
    }

    for (kind, keys) in model.kind_groups() {
        let color = model
            .kind_colors
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, c)| c.as_str())
            .unwrap_or("white");
        let ids: Vec<String> = keys.into_iter().map(node_id).collect();
        output.push_str(&format!("\nclassDef {} fill:{},stroke-width:4px;\n", kind.label(), color));
        output.push_str(&format!("class {} {}\n", ids.join(","), kind.label()));
    }

    output
}

/// Full HTML page
pub fn to_html(model: &RenderModel, options: &RenderOptions) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    page.push_str(&format!("<title>{}</title></head><body>", escape_html(&options.title(model))));
    page.push_str(&format!("<h2>{}</h2>", escape_html(&options.title(model))));
    page.push_str(&format!(
        "<p>Generated {} &middot; {} nodes, {} references</p>\n",
        options.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        model.nodes.len(),
        model.edges.len()
    ));
    page.push_str("<div id=\"theGraph\" class=\"mermaid\">\n");
    page.push_str(&to_mermaid(model, &options.direction));
    page.push_str("</div>");
    page.push_str(&format!("<script src=\"{}\"></script>", MERMAID_CDN));
    page.push_str("<script>mermaid.initialize(");
    page.push_str("{startOnLoad:true,securityLevel:'loose',maxTextSize:900000}); ");
    page.push_str("setTimeout( () => { var theGraph = document.querySelector(\"#theGraph SVG\"); ");
    page.push_str("if (theGraph) { theGraph.setAttribute(\"height\",\"100%\"); } }, 1000 );");
    page.push_str("</script>");
    page.push_str("</body></html>\n");
    page
}

/// Escaped label lines joined with `<br>`
fn multiline_label(text: &str) -> String {
    text.lines().map(escape_label).collect::<Vec<_>>().join("<br>")
}

/// Mermaid entity codes for characters that break a quoted label
fn escape_label(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("#quot;"),
            '<' => escaped.push_str("#lt;"),
            '>' => escaped.push_str("#gt;"),
            '&' => escaped.push_str("#amp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
