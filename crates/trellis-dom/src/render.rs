//! Markup serialization
//!
//! Attribute order on elements is fixed: `id` first, then `style`, then
//! `class`, then the stored attributes in insertion order. Boolean
//! attributes render as the bare name. Void elements close with `/>` only
//! in XHTML-compatible mode.

use crate::attr::AttrValue;
use crate::node::{ElementData, NodeData};
use crate::{Document, NodeId};

/// Serialization options, carried per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Quote every attribute value; when false, values from a safe
    /// alphabet render unquoted.
    pub quote_all_attributes: bool,
    /// Render void elements as `<br />` instead of `<br>`.
    pub self_close_void: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            quote_all_attributes: true,
            self_close_void: false,
        }
    }
}

pub(crate) fn render_node(doc: &Document, id: NodeId, options: RenderOptions) -> String {
    let mut out = String::new();
    push_node(doc, id, options, &mut out);
    out
}

pub(crate) fn render_children(doc: &Document, id: NodeId, options: RenderOptions) -> String {
    let mut out = String::new();
    for &child in doc.children(id) {
        push_node(doc, child, options, &mut out);
    }
    out
}

fn push_node(doc: &Document, id: NodeId, options: RenderOptions, out: &mut String) {
    match doc.node(id).data() {
        NodeData::Document => {
            for &child in doc.children(id) {
                push_node(doc, child, options, out);
            }
        }
        NodeData::Element(el) => push_element(doc, id, el, options, out),
        NodeData::Text(text) => {
            if text.raw {
                out.push_str(&text.content);
            } else {
                escape_text(&text.content, out);
            }
        }
        NodeData::Comment(content) => {
            out.push_str("<!--");
            out.push_str(content);
            out.push_str("-->");
        }
    }
}

fn push_element(
    doc: &Document,
    id: NodeId,
    el: &ElementData,
    options: RenderOptions,
    out: &mut String,
) {
    let quote_all = options.quote_all_attributes;
    let tokens = doc.tokens();
    let tokens = tokens.borrow();
    let tag_name = tokens.name(el.tag());

    out.push('<');
    out.push_str(tag_name);

    // id first, then style, then class, then the rest in stored order.
    if let Some(value) = el.attrs().and_then(|a| a.get(doc.wk.id)) {
        out.push(' ');
        push_attribute("id", attr_text(value), quote_all, out);
    }
    if el.has_styles() {
        let style = el.style().map(ToString::to_string).unwrap_or_default();
        out.push(' ');
        push_attribute("style", Some(&style), quote_all, out);
    }
    if el.has_classes() {
        out.push(' ');
        push_attribute("class", Some(&doc.class_name(id)), quote_all, out);
    }
    if let Some(attrs) = el.attrs() {
        for (token, value) in attrs.iter() {
            if token == doc.wk.id {
                continue;
            }
            out.push(' ');
            push_attribute(tokens.name(token), attr_text(value), quote_all, out);
        }
    }

    if doc.wk.children_allowed(el.tag()) {
        out.push('>');
        for &child in doc.children(id) {
            push_node(doc, child, options, out);
        }
        out.push_str("</");
        out.push_str(tag_name);
        out.push('>');
    } else if options.self_close_void {
        out.push_str(" />");
    } else {
        out.push('>');
    }
}

fn attr_text(value: &AttrValue) -> Option<&str> {
    match value {
        AttrValue::Value(v) => Some(v),
        AttrValue::Boolean => None,
    }
}

fn push_attribute(name: &str, value: Option<&str>, quote_all: bool, out: &mut String) {
    let Some(value) = value else {
        // Boolean attribute: bare name.
        out.push_str(name);
        return;
    };
    out.push_str(name);
    out.push('=');
    if !quote_all && can_render_unquoted(value) {
        out.push_str(value);
        return;
    }
    // Prefer single quotes only when the value itself holds double quotes.
    let quote = if value.contains('"') && !value.contains('\'') {
        '\''
    } else {
        '"'
    };
    out.push(quote);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out.push(quote);
}

fn can_render_unquoted(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '/'))
}

pub(crate) fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
