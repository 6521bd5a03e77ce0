//! trellis-dom - Mutable HTML document model
//!
//! An arena-based DOM whose elements keep their tag, attribute, class and id
//! names interned as compact tokens, with an inverted index over encoded
//! path keys so a selector engine can resolve queries without walking the
//! tree.

mod attr;
mod document;
mod element;
mod error;
mod index;
mod node;
mod path;
mod render;
mod style;
mod token;

pub use attr::{AttrValue, AttributeStore};
pub use document::{Document, FragmentParser};
pub use error::{DomError, DomResult};
pub use index::DocumentIndex;
pub use node::{ElementData, Node, NodeData, TextData};
pub use path::{attribute_key, class_key, encode_path, existence_key, id_key, tag_key, KEY_SEPARATOR};
pub use render::RenderOptions;
pub use style::{StyleDeclaration, StyleParseError};
pub use token::{SharedTokenTable, Token, TokenTable, WellKnown};

/// Node identifier (index into the document's arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The document root node
    pub const ROOT: NodeId = NodeId(0);
}
