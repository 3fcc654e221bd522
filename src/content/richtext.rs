//! Storyblok rich-text documents
//!
//! Rich text arrives as a ProseMirror-style JSON tree:
//!
//! ```json
//! {"type": "doc", "content": [
//!   {"type": "paragraph", "content": [
//!     {"type": "text", "text": "Hello", "marks": [{"type": "bold"}]}
//!   ]}
//! ]}
//! ```
//!
//! This module turns such a tree into HTML (every text node and attribute
//! escaped) or into plain text for excerpts.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::markdown::MarkdownRenderer;
use crate::helpers::html_escape;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Node {
    #[serde(rename = "type")]
    kind: String,
    attrs: Option<Map<String, Value>>,
    content: Vec<Node>,
    text: Option<String>,
    marks: Vec<Mark>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Mark {
    #[serde(rename = "type")]
    kind: String,
    attrs: Option<Map<String, Value>>,
}

fn attr<'a>(attrs: &'a Option<Map<String, Value>>, name: &str) -> Option<&'a Value> {
    attrs.as_ref().and_then(|attrs| attrs.get(name))
}

fn attr_str<'a>(attrs: &'a Option<Map<String, Value>>, name: &str) -> Option<&'a str> {
    attr(attrs, name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Whether a JSON value looks like a rich-text document
pub fn is_document(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("doc")
}

fn parse(doc: &Value) -> Option<Node> {
    match serde_json::from_value::<Node>(doc.clone()) {
        Ok(node) => Some(node),
        Err(e) => {
            tracing::warn!("Skipping malformed rich-text document: {}", e);
            None
        }
    }
}

/// Render a rich-text document to HTML
pub fn render_html(doc: &Value, renderer: &MarkdownRenderer) -> String {
    let mut out = String::new();
    if let Some(node) = parse(doc) {
        render_node(&node, renderer, &mut out);
    }
    out
}

/// Extract the visible text of a document, blocks separated by spaces
pub fn plain_text(doc: &Value) -> String {
    let mut out = String::new();
    if let Some(node) = parse(doc) {
        collect_text(&node, &mut out);
    }
    out
}

fn render_children(node: &Node, renderer: &MarkdownRenderer, out: &mut String) {
    for child in &node.content {
        render_node(child, renderer, out);
    }
}

fn wrap(tag: &str, node: &Node, renderer: &MarkdownRenderer, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    render_children(node, renderer, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn render_node(node: &Node, renderer: &MarkdownRenderer, out: &mut String) {
    match node.kind.as_str() {
        "doc" => render_children(node, renderer, out),
        "paragraph" => wrap("p", node, renderer, out),
        "heading" => {
            let level = attr(&node.attrs, "level")
                .and_then(Value::as_u64)
                .unwrap_or(2)
                .clamp(1, 6);
            wrap(&format!("h{}", level), node, renderer, out);
        }
        "bullet_list" => wrap("ul", node, renderer, out),
        "ordered_list" => {
            match attr(&node.attrs, "order").and_then(Value::as_u64) {
                Some(start) if start != 1 => out.push_str(&format!(r#"<ol start="{}">"#, start)),
                _ => out.push_str("<ol>"),
            }
            render_children(node, renderer, out);
            out.push_str("</ol>");
        }
        "list_item" => wrap("li", node, renderer, out),
        "blockquote" => wrap("blockquote", node, renderer, out),
        "code_block" => {
            let mut code = String::new();
            collect_raw_text(node, &mut code);
            let lang = attr_str(&node.attrs, "class").map(|c| c.trim_start_matches("language-"));
            out.push_str(&renderer.highlight_code(&code, lang));
        }
        "horizontal_rule" => out.push_str("<hr>"),
        "hard_break" => out.push_str("<br>"),
        "image" => {
            if let Some(src) = attr_str(&node.attrs, "src") {
                out.push_str(&format!(
                    r#"<img src="{}" alt="{}""#,
                    html_escape(src),
                    html_escape(attr_str(&node.attrs, "alt").unwrap_or(""))
                ));
                if let Some(title) = attr_str(&node.attrs, "title") {
                    out.push_str(&format!(r#" title="{}""#, html_escape(title)));
                }
                out.push('>');
            }
        }
        "text" => render_text(node, out),
        "blok" => tracing::debug!("Skipping embedded component in rich text"),
        other => {
            tracing::debug!("Unknown rich-text node {:?}, rendering its children", other);
            render_children(node, renderer, out);
        }
    }
}

fn render_text(node: &Node, out: &mut String) {
    let text = match &node.text {
        Some(text) => html_escape(text),
        None => return,
    };

    let mut closing = Vec::new();
    for mark in &node.marks {
        if let Some((open, close)) = mark_tags(mark) {
            out.push_str(&open);
            closing.push(close);
        }
    }
    out.push_str(&text);
    for close in closing.iter().rev() {
        out.push_str(close);
    }
}

fn mark_tags(mark: &Mark) -> Option<(String, &'static str)> {
    let simple = |tag: &'static str, close: &'static str| Some((format!("<{}>", tag), close));

    match mark.kind.as_str() {
        "bold" => simple("strong", "</strong>"),
        "italic" => simple("em", "</em>"),
        "strike" => simple("s", "</s>"),
        "underline" => simple("u", "</u>"),
        "code" => simple("code", "</code>"),
        "superscript" => simple("sup", "</sup>"),
        "subscript" => simple("sub", "</sub>"),
        "highlight" => simple("mark", "</mark>"),
        "link" => {
            let href = link_href(&mark.attrs);
            let mut open = format!(r#"<a href="{}""#, html_escape(&href));
            if let Some(target) = attr_str(&mark.attrs, "target") {
                open.push_str(&format!(r#" target="{}""#, html_escape(target)));
                if target == "_blank" {
                    open.push_str(r#" rel="noopener noreferrer""#);
                }
            }
            open.push('>');
            Some((open, "</a>"))
        }
        _ => None,
    }
}

fn link_href(attrs: &Option<Map<String, Value>>) -> String {
    let href = attr_str(attrs, "href").unwrap_or("#").trim();

    if href.to_ascii_lowercase().starts_with("javascript:") {
        return "#".to_string();
    }

    let mut href = match attr_str(attrs, "linktype") {
        Some("email") if !href.starts_with("mailto:") => format!("mailto:{}", href),
        _ => href.to_string(),
    };

    if let Some(anchor) = attr_str(attrs, "anchor") {
        href.push('#');
        href.push_str(anchor);
    }
    href
}

fn collect_raw_text(node: &Node, out: &mut String) {
    if let Some(text) = &node.text {
        out.push_str(text);
    }
    for child in &node.content {
        collect_raw_text(child, out);
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node.kind.as_str() {
        "text" => {
            if let Some(text) = &node.text {
                out.push_str(text);
            }
        }
        "hard_break" => out.push(' '),
        _ => {
            for child in &node.content {
                collect_text(child, out);
            }
            if node.kind != "doc" {
                out.push(' ');
            }
        }
    }
}
