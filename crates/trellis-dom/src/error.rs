//! DOM operation errors.

use crate::style::StyleParseError;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The operation is not valid for the addressed node
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A caller-supplied argument is unusable
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Strict style parsing failed
    #[error(transparent)]
    StyleParse(#[from] StyleParseError),

    /// Inserting a node into its own subtree
    #[error("a node cannot be inserted into its own subtree")]
    HierarchyRequest,

    /// The reference node is not a child of the addressed parent
    #[error("the reference node is not a child of this parent")]
    NotAChild,
}
