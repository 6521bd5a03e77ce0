//! Arena nodes
//!
//! Tree shape (parent link, ordered children, connectivity, cached path)
//! lives on [`Node`]; kind-specific payloads live in [`NodeData`]. Element
//! facets that the index cares about - attribute store, class tokens, style
//! declaration - are plain owned fields of [`ElementData`].

use crate::{AttributeStore, NodeId, StyleDeclaration, Token};

/// A node in the document arena.
#[derive(Debug)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// True while the node is attached under the document root.
    pub(crate) connected: bool,
    /// Position among the parent's *element* children; text and comment
    /// nodes are excluded from the numbering.
    pub(crate) sibling_index: u32,
    /// Cached encoded path, cleared on any structural move.
    pub(crate) path: Option<Box<str>>,
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn with_data(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            connected: false,
            sibling_index: 0,
            path: None,
            data,
        }
    }

    /// The document root node.
    pub(crate) fn document() -> Self {
        let mut node = Self::with_data(NodeData::Document);
        node.connected = true;
        node
    }

    pub(crate) fn element(data: ElementData) -> Self {
        Self::with_data(NodeData::Element(data))
    }

    pub(crate) fn text(content: String, raw: bool) -> Self {
        Self::with_data(NodeData::Text(TextData { content, raw }))
    }

    pub(crate) fn comment(content: String) -> Self {
        Self::with_data(NodeData::Comment(content))
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Element payload, if this is an element.
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Text content, if this is a text node.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Kind-specific node payload
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
    /// Comment
    Comment(String),
}

/// Element payload: tag token plus the three lazily allocated facets.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Immutable after creation; there is deliberately no setter.
    tag: Token,
    pub(crate) attrs: Option<AttributeStore>,
    /// Ordered, duplicate-free class tokens (case-sensitive).
    pub(crate) classes: Vec<Token>,
    pub(crate) style: Option<StyleDeclaration>,
}

impl ElementData {
    pub fn new(tag: Token) -> Self {
        Self {
            tag,
            attrs: None,
            classes: Vec::new(),
            style: None,
        }
    }

    /// The element's tag token.
    pub fn tag(&self) -> Token {
        self.tag
    }

    pub fn has_classes(&self) -> bool {
        !self.classes.is_empty()
    }

    pub fn has_styles(&self) -> bool {
        self.style.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// True if the element holds any plain attributes (class and style
    /// excluded).
    pub fn has_inner_attributes(&self) -> bool {
        self.attrs.as_ref().is_some_and(|a| !a.is_empty())
    }

    pub fn attrs(&self) -> Option<&AttributeStore> {
        self.attrs.as_ref()
    }

    /// The attribute store, allocated on first use.
    pub fn attrs_mut(&mut self) -> &mut AttributeStore {
        self.attrs.get_or_insert_with(AttributeStore::new)
    }

    pub fn classes(&self) -> &[Token] {
        &self.classes
    }

    pub fn style(&self) -> Option<&StyleDeclaration> {
        self.style.as_ref()
    }

    /// The style declaration, allocated on first use.
    pub fn style_mut(&mut self) -> &mut StyleDeclaration {
        self.style.get_or_insert_with(StyleDeclaration::new)
    }
}

/// Text node payload
#[derive(Debug, Clone)]
pub struct TextData {
    pub content: String,
    /// Raw text renders unescaped (script/style/textarea content).
    pub raw: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_facets() {
        let mut el = ElementData::new(Token(3));
        assert!(el.attrs().is_none());
        assert!(!el.has_styles());
        el.attrs_mut().set(Token(9), "x");
        assert!(el.has_inner_attributes());
        el.style_mut().set("color", "red");
        assert!(el.has_styles());
    }

    #[test]
    fn test_node_accessors() {
        let el = Node::element(ElementData::new(Token(1)));
        assert!(el.is_element());
        assert!(el.as_text().is_none());

        let text = Node::text("hi".into(), false);
        assert!(text.is_text());
        assert_eq!(text.as_text(), Some("hi"));
    }
}
