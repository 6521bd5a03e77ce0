//! Per-element attribute storage
//!
//! An ordered token -> value map for one element. `class` and `style` are
//! modeled separately on the element and never pass through here. Index
//! maintenance is the element facade's job; this store has no side effects.

use crate::Token;

/// An attribute value: a string, or present with no value at all
/// (a boolean attribute such as `checked`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Value(String),
    Boolean,
}

impl AttrValue {
    /// Uniform string view; boolean attributes read as the empty string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Value(v) => v,
            Self::Boolean => "",
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }
}

/// Ordered attribute collection, insertion order preserved for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeStore {
    entries: Vec<(Token, AttrValue)>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute's value.
    pub fn get(&self, token: Token) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, v)| v)
    }

    /// Uniform string view of an attribute; boolean entries read as `""`.
    pub fn get_str(&self, token: Token) -> Option<&str> {
        self.get(token).map(AttrValue::as_str)
    }

    /// Set an attribute to a string value, keeping its position if it
    /// already exists.
    pub fn set(&mut self, token: Token, value: impl Into<String>) {
        let value = AttrValue::Value(value.into());
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some((_, v)) => *v = value,
            None => self.entries.push((token, value)),
        }
    }

    /// Mark an attribute present with no value.
    pub fn set_boolean(&mut self, token: Token) {
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some((_, v)) => *v = AttrValue::Boolean,
            None => self.entries.push((token, AttrValue::Boolean)),
        }
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn unset(&mut self, token: Token) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(t, _)| *t != token);
        self.entries.len() != before
    }

    pub fn contains(&self, token: Token) -> bool {
        self.entries.iter().any(|(t, _)| *t == token)
    }

    /// Ordered (token, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Token, &AttrValue)> {
        self.entries.iter().map(|(t, v)| (*t, v))
    }

    /// Ordered attribute tokens.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
