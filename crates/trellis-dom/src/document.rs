//! Document - arena owner and structural operations
//!
//! All nodes live in the document's arena and are addressed by [`NodeId`].
//! Every structural edit renumbers the affected element siblings, clears
//! their cached paths, and keeps the document index exactly in step: old
//! keys are removed before the tree changes (while the old paths are still
//! derivable) and new keys are added after.

use std::rc::Rc;

use crate::node::{ElementData, Node, NodeData};
use crate::path::push_encoded;
use crate::render::RenderOptions;
use crate::token::{SharedTokenTable, TokenTable, WellKnown};
use crate::{DocumentIndex, DomError, DomResult, NodeId};

/// Markup-parser capability consumed by [`Document::set_inner_html`].
///
/// Implementations create nodes directly in the target document (through
/// its token table) and return the disconnected fragment roots.
pub trait FragmentParser {
    fn parse_fragment(&self, doc: &mut Document, html: &str) -> Vec<NodeId>;
}

/// An HTML document: node arena, selector index, shared token table.
pub struct Document {
    nodes: Vec<Node>,
    index: DocumentIndex,
    tokens: SharedTokenTable,
    /// Copy of the table's structural tokens, resolved once.
    pub(crate) wk: WellKnown,
    parser: Option<Rc<dyn FragmentParser>>,
    options: RenderOptions,
}

impl Document {
    /// Create an empty document using the process-wide shared token table.
    pub fn new() -> Self {
        Self::with_tokens(TokenTable::shared())
    }

    /// Create an empty document over an explicitly injected token table.
    pub fn with_tokens(tokens: SharedTokenTable) -> Self {
        let wk = tokens.borrow().well_known().clone();
        Self {
            nodes: vec![Node::document()],
            index: DocumentIndex::new(),
            tokens,
            wk,
            parser: None,
            options: RenderOptions::default(),
        }
    }

    /// The document root node.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Handle to the token table shared with this document.
    pub fn tokens(&self) -> SharedTokenTable {
        Rc::clone(&self.tokens)
    }

    /// The selector index. Read-only; mutation happens through the
    /// element facade and structural operations.
    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    pub(crate) fn index_mut(&mut self) -> &mut DocumentIndex {
        &mut self.index
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    /// Install the markup-parser capability used by `set_inner_html`.
    pub fn set_fragment_parser(&mut self, parser: Rc<dyn FragmentParser>) {
        self.parser = Some(parser);
    }

    pub(crate) fn fragment_parser(&self) -> Option<Rc<dyn FragmentParser>> {
        self.parser.clone()
    }

    /// Borrow a node. The id must have been produced by this document.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub(crate) fn expect_element_mut(&mut self, id: NodeId) -> &mut ElementData {
        match &mut self.nodes[id.0 as usize].data {
            NodeData::Element(el) => el,
            _ => panic!("node {id:?} is not an element"),
        }
    }

    /// Number of nodes ever allocated (detached nodes included).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // -- node factories --

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a disconnected element.
    pub fn create_element(&mut self, tag: &str) -> DomResult<NodeId> {
        if tag.is_empty() {
            return Err(DomError::InvalidArgument(
                "an element requires a non-empty tag name".into(),
            ));
        }
        let token = self.tokens.borrow_mut().intern(tag);
        Ok(self.alloc(Node::element(ElementData::new(token))))
    }

    /// Create a disconnected text node.
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(Node::text(content.into(), false))
    }

    /// Create a disconnected raw text node (renders unescaped).
    pub fn create_raw_text(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(Node::text(content.into(), true))
    }

    /// Create a disconnected comment node.
    pub fn create_comment(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(Node::comment(content.into()))
    }

    // -- connectivity and paths --

    /// True while the node is attached under the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.node(id).connected
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Element children only, in order.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(|&c| self.node(c).is_element())
    }

    /// Position among the parent's element children.
    pub fn element_index(&self, id: NodeId) -> u32 {
        self.node(id).sibling_index
    }

    /// The node's encoded path. Computed lazily from the ancestor chain and
    /// cached until a structural edit moves the node.
    pub fn path(&mut self, id: NodeId) -> String {
        if id == NodeId::ROOT {
            return String::new();
        }
        if let Some(p) = &self.node(id).path {
            return p.to_string();
        }
        let (parent, is_element, sibling_index) = {
            let node = self.node(id);
            (node.parent, node.is_element(), node.sibling_index)
        };
        let mut path = match parent {
            Some(p) => self.path(p),
            None => String::new(),
        };
        if is_element {
            push_encoded(&mut path, sibling_index);
            self.node_mut(id).path = Some(path.clone().into_boxed_str());
        }
        path
    }

    fn is_ancestor_of(&self, maybe_ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = self.node(node).parent;
        while let Some(id) = cursor {
            if id == maybe_ancestor {
                return true;
            }
            cursor = self.node(id).parent;
        }
        false
    }

    /// All element nodes in the subtree rooted at `root`, root included.
    pub(crate) fn subtree_elements(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if self.node(id).is_element() {
                out.push(id);
            }
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    fn invalidate_paths(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            self.node_mut(id).path = None;
            stack.extend(self.node(id).children.iter().copied());
        }
    }

    fn set_connected(&mut self, root: NodeId, connected: bool) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            self.node_mut(id).connected = connected;
            stack.extend(self.node(id).children.iter().copied());
        }
    }

    pub(crate) fn index_subtree(&mut self, root: NodeId) {
        for el in self.subtree_elements(root) {
            for key in self.index_keys(el) {
                self.index.add(key, el);
            }
        }
    }

    pub(crate) fn deindex_subtree(&mut self, root: NodeId) {
        for el in self.subtree_elements(root) {
            for key in self.index_keys(el) {
                self.index.remove(&key);
            }
        }
    }

    // -- structural operations --

    /// Append `child` as the last child of `parent`. An attached child is
    /// moved (detached from its old position first).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        if child == parent || self.is_ancestor_of(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if !matches!(
            self.node(parent).data,
            NodeData::Document | NodeData::Element(_)
        ) {
            return Err(DomError::InvalidOperation(
                "text and comment nodes cannot have children".into(),
            ));
        }
        if reference == Some(child) {
            // Inserting a node before itself leaves the tree unchanged.
            return Ok(());
        }
        // Validate the reference before detaching anything, so a failing
        // call mutates nothing.
        if let Some(r) = reference {
            if self.node(r).parent != Some(parent) {
                return Err(DomError::NotAChild);
            }
        }
        if self.node(child).parent.is_some() {
            self.detach(child);
        }
        let pos = match reference {
            Some(r) => self
                .node(parent)
                .children
                .iter()
                .position(|&c| c == r)
                .ok_or(DomError::NotAChild)?,
            None => self.node(parent).children.len(),
        };
        self.attach(parent, child, pos);
        Ok(())
    }

    /// Remove `child` from `parent`, leaving it (and its subtree)
    /// disconnected but alive.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if self.node(child).parent != Some(parent) {
            return Err(DomError::NotAChild);
        }
        self.detach(child);
        Ok(())
    }

    /// Detach a node from its parent. A no-op for nodes with no parent.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.node(child).parent else {
            return;
        };
        let was_connected = self.node(child).connected;
        let child_is_element = self.node(child).is_element();
        let pos = self
            .node(parent)
            .children
            .iter()
            .position(|&c| c == child)
            .unwrap_or_else(|| panic!("node {child:?} missing from its parent's child list"));

        // Later element siblings shift down; their paths (and the detached
        // subtree's) change, so their index entries go first, while the old
        // paths are still derivable.
        let displaced: Vec<NodeId> = if child_is_element {
            self.node(parent).children[pos + 1..]
                .iter()
                .copied()
                .filter(|&c| self.node(c).is_element())
                .collect()
        } else {
            Vec::new()
        };
        if was_connected && child_is_element {
            self.deindex_subtree(child);
            for &sib in &displaced {
                self.deindex_subtree(sib);
            }
        }

        self.node_mut(parent).children.remove(pos);
        self.node_mut(child).parent = None;
        if child_is_element {
            let start = self.node(child).sibling_index;
            for (offset, &sib) in displaced.iter().enumerate() {
                self.node_mut(sib).sibling_index = start + offset as u32;
            }
        }

        self.invalidate_paths(child);
        for &sib in &displaced {
            self.invalidate_paths(sib);
        }
        self.set_connected(child, false);

        if was_connected && child_is_element {
            for &sib in &displaced {
                self.index_subtree(sib);
            }
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, pos: usize) {
        let parent_connected = self.node(parent).connected;
        let child_is_element = self.node(child).is_element();

        let elem_pos = self.node(parent).children[..pos]
            .iter()
            .filter(|&&c| self.node(c).is_element())
            .count() as u32;
        let displaced: Vec<NodeId> = if child_is_element {
            self.node(parent).children[pos..]
                .iter()
                .copied()
                .filter(|&c| self.node(c).is_element())
                .collect()
        } else {
            Vec::new()
        };
        if parent_connected && child_is_element {
            for &sib in &displaced {
                self.deindex_subtree(sib);
            }
        }

        self.node_mut(parent).children.insert(pos, child);
        self.node_mut(child).parent = Some(parent);
        if child_is_element {
            self.node_mut(child).sibling_index = elem_pos;
            for (offset, &sib) in displaced.iter().enumerate() {
                self.node_mut(sib).sibling_index = elem_pos + 1 + offset as u32;
            }
        }

        self.invalidate_paths(child);
        for &sib in &displaced {
            self.invalidate_paths(sib);
        }
        self.set_connected(child, parent_connected);

        if parent_connected && child_is_element {
            self.index_subtree(child);
            for &sib in &displaced {
                self.index_subtree(sib);
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
