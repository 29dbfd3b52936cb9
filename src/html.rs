//! HTML Report Rendering
//!
//! Renders a documentation tree into a single self-contained HTML page
//! (inline CSS, no scripts, no external assets) and exports it as a public
//! artifact. The page carries no timestamps, so re-exporting an unchanged
//! schema produces identical bytes.

use std::collections::HashMap;

use crate::artifact::{write_artifact, ExportedArtifact};
use crate::config::ExplorerConfig;
use crate::doctype::DocType;
use crate::error::Result;
use crate::explore::{DocTypeNode, Explorer, MaxLevel, NodeKind};
use crate::resolver;
use crate::store::SchemaStore;

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 20px; background: #f5f5f5; }
    .container { max-width: 1200px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; }
    h1 { color: #2c3e50; border-bottom: 3px solid #3498db; padding-bottom: 10px; }
    h2 { color: #34495e; margin-top: 30px; }
    table { width: 100%; border-collapse: collapse; margin: 20px 0; }
    th { background: #3498db; color: white; padding: 12px; text-align: left; }
    td { padding: 10px; border-bottom: 1px solid #ddd; }
    tr:hover { background: #f8f9fa; }
    a { color: #2980b9; }
    .badge { display: inline-block; padding: 4px 8px; border-radius: 4px; font-size: 12px; }
    .required { background: #e74c3c; color: white; }
    .optional { background: #95a5a6; color: white; }
    .cut { background: #f39c12; color: white; }
    .cycle { background: #8e44ad; color: white; }
    .unresolved { background: #c0392b; color: white; }
    .meta-info { background: #ecf0f1; padding: 15px; border-radius: 5px; margin: 20px 0; }
    .children { margin-left: 24px; padding-left: 16px; border-left: 3px solid #ecf0f1; }
    .leaf { margin: 12px 0; }
"#;

/// Render a documentation tree as an HTML page
pub fn render(tree: &DocTypeNode) -> String {
    let mut output = String::new();

    output.push_str("<!DOCTYPE html>\n");
    output.push_str("<html lang=\"en\">\n<head>\n");
    output.push_str("<meta charset=\"utf-8\">\n");
    output.push_str(&format!("<title>{} Documentation</title>\n", escape(&tree.name)));
    output.push_str(&format!("<style>{}</style>\n", STYLE));
    output.push_str("</head>\n<body>\n<div class=\"container\">\n");
    output.push_str(&format!("<h1>{}</h1>\n", escape(&tree.name)));

    render_node(tree, "dt", &mut output);

    output.push_str("</div>\n</body>\n</html>\n");
    output
}

fn render_node(node: &DocTypeNode, anchor: &str, output: &mut String) {
    match &node.kind {
        NodeKind::Expanded(doctype) => render_expanded(node, doctype, anchor, output),
        NodeKind::Cut => render_leaf(node, anchor, "cut", "Depth limit reached", output),
        NodeKind::Cycle { ancestor_depth } => render_leaf(
            node,
            anchor,
            "cycle",
            &format!("Circular reference to level {}", ancestor_depth),
            output,
        ),
        NodeKind::Unresolved { reason } => {
            render_leaf(node, anchor, "unresolved", &format!("Unresolved: {}", reason), output)
        }
    }
}

fn render_expanded(node: &DocTypeNode, doctype: &DocType, anchor: &str, output: &mut String) {
    output.push_str(&format!("<section id=\"{}\">\n", anchor));

    // The root's title is the page heading
    if node.depth > 0 {
        output.push_str(&format!("<h2>{}</h2>\n", escape(&node.name)));
    }

    output.push_str("<div class=\"meta-info\">\n");
    if !node.referenced_by.is_empty() {
        meta_line(output, "Referenced By", &node.referenced_by.join(", "));
    }
    meta_line(output, "Level", &node.depth.to_string());
    meta_line(output, "Module", doctype.module.as_deref().unwrap_or("-"));
    meta_line(output, "Submittable", yes_no(doctype.is_submittable));
    meta_line(output, "Child Table", yes_no(doctype.istable));
    meta_line(output, "Naming Rule", doctype.naming_rule());
    meta_line(output, "Total Fields", &doctype.fields.len().to_string());
    meta_line(output, "Required Fields", &doctype.required_field_count().to_string());
    meta_line(output, "Link Fields", &doctype.link_field_count().to_string());
    meta_line(output, "Child Tables", &doctype.child_table_count().to_string());
    if let Some(description) = doctype.description.as_deref().filter(|d| !d.is_empty()) {
        meta_line(output, "Description", description);
    }
    output.push_str("</div>\n");

    let child_anchors: HashMap<&str, String> = node
        .children
        .iter()
        .enumerate()
        .map(|(i, child)| (child.name.as_str(), format!("{}-{}", anchor, i)))
        .collect();

    output.push_str("<table>\n<tr><th>Field Name</th><th>Label</th><th>Type</th><th>Linked DocType</th><th>Required</th></tr>\n");
    for field in &doctype.fields {
        let linked = match resolver::resolve(field) {
            Some(target) => match child_anchors.get(target) {
                Some(child_anchor) => format!("<a href=\"#{}\">{}</a>", child_anchor, escape(target)),
                None => escape(target),
            },
            None => "-".to_string(),
        };
        let required = if field.reqd {
            "<span class=\"badge required\">Required</span>"
        } else {
            "<span class=\"badge optional\">Optional</span>"
        };
        output.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&field.fieldname),
            escape(field.label.as_deref().unwrap_or("")),
            escape(field.fieldtype.as_str()),
            linked,
            required,
        ));
    }
    output.push_str("</table>\n");

    if !node.children.is_empty() {
        output.push_str("<div class=\"children\">\n");
        for (i, child) in node.children.iter().enumerate() {
            render_node(child, &format!("{}-{}", anchor, i), output);
        }
        output.push_str("</div>\n");
    }

    output.push_str("</section>\n");
}

fn render_leaf(node: &DocTypeNode, anchor: &str, class: &str, text: &str, output: &mut String) {
    output.push_str(&format!(
        "<div class=\"leaf\" id=\"{}\"><h2>{}</h2><span class=\"badge {}\">{}</span></div>\n",
        anchor,
        escape(&node.name),
        class,
        escape(text),
    ));
}

fn meta_line(output: &mut String, label: &str, value: &str) {
    output.push_str(&format!("<p><strong>{}:</strong> {}</p>\n", label, escape(value)));
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Explore `doctype_name` with the export depth policy, render it and write
/// the HTML artifact, replacing any previous export.
pub fn export(store: &dyn SchemaStore, config: &ExplorerConfig, doctype_name: &str) -> Result<ExportedArtifact> {
    let max_level = MaxLevel::from_level(config.export.html_max_level);
    let tree = Explorer::new(store, max_level).explore(doctype_name)?;
    let html = render(&tree);
    write_artifact(&config.export, &tree.name, "html", &html)
}
