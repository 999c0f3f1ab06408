//! Markup for a document value: elements by type, leaves by marks.

use crate::model::{mark, Element, ElementType, Node, Text};

/// HTML for a whole value, one block element per line
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, &mut out);
    }
    out
}

/// Text blocks joined by newlines, marks dropped
pub fn to_plain_text(nodes: &[Node]) -> String {
    let mut lines = Vec::new();
    collect_lines(nodes, &mut lines);
    lines.join("\n")
}

/// Opening and closing tags for an element type
pub fn element_tags(kind: &ElementType) -> (&'static str, &'static str) {
    match kind {
        ElementType::Code => ("<pre><code>", "</code></pre>"),
        ElementType::BulletedList => ("<ul>", "</ul>"),
        ElementType::NumberedList => ("<ol>", "</ol>"),
        ElementType::ListItem => ("<li>", "</li>"),
        ElementType::Paragraph => ("<p>", "</p>"),
        ElementType::Other(_) => ("<div>", "</div>"),
    }
}

pub fn render_element(element: &Element, out: &mut String) {
    let (open, close) = element_tags(&element.kind);
    out.push_str(open);
    if matches!(element.children.first(), Some(Node::Element(_))) {
        out.push('\n');
    }
    for child in &element.children {
        render_node(child, out);
    }
    out.push_str(close);
    out.push('\n');
}

/// A leaf is a span carrying its weight, with the other marks nested inside
pub fn render_leaf(text: &Text, out: &mut String) {
    let weight = if text.has_mark(mark::BOLD) { "bold" } else { "normal" };
    let mut inner = escape(&text.text);
    if text.has_mark(mark::CODE) {
        inner = format!("<code>{inner}</code>");
    }
    if text.has_mark(mark::ITALIC) {
        inner = format!("<em>{inner}</em>");
    }
    if text.has_mark(mark::UNDERLINE) {
        inner = format!("<u>{inner}</u>");
    }
    out.push_str(&format!(r#"<span style="font-weight: {weight}">{inner}</span>"#));
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(element) => render_element(element, out),
        Node::Text(text) => render_leaf(text, out),
    }
}

fn collect_lines(nodes: &[Node], lines: &mut Vec<String>) {
    for node in nodes {
        if let Node::Element(element) = node {
            match element.children.first() {
                Some(Node::Element(_)) => collect_lines(&element.children, lines),
                _ => lines.push(node.string()),
            }
        }
    }
}
