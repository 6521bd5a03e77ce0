//! Token table - intern tag, attribute, class and id names as compact ids
//!
//! Tag and attribute names are case-insensitive and are lowercased before
//! interning; id and class values are case-sensitive and interned verbatim.
//! Both modes share one table, so equal strings always resolve to the same
//! token.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Interned name id - 2 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Token(pub u16);

/// Shared handle to a token table.
///
/// The table is scoped to the process (or to whatever scope the caller
/// arranges), never to a single document: documents created with
/// [`Document::new`](crate::Document::new) all use [`TokenTable::shared`].
pub type SharedTokenTable = Rc<RefCell<TokenTable>>;

thread_local! {
    static SHARED: SharedTokenTable = Rc::new(RefCell::new(TokenTable::new()));
}

/// Structural tokens resolved once at table construction.
///
/// Components compare against these instead of re-tokenizing the name
/// strings on every dispatch.
#[derive(Debug, Clone)]
pub struct WellKnown {
    pub id: Token,
    pub class: Token,
    /// Also the token of the `<style>` tag; same name, same token.
    pub style: Token,
    pub checked: Token,
    pub selected: Token,
    pub readonly: Token,
    pub type_attr: Token,
    pub name: Token,
    pub value: Token,
    pub input: Token,
    pub textarea: Token,
    void_tags: Box<[Token]>,
    raw_text_tags: Box<[Token]>,
}

impl WellKnown {
    /// False for void elements (`<br>`, `<img>`, ...), which may hold
    /// neither markup nor text children.
    pub fn children_allowed(&self, tag: Token) -> bool {
        !self.void_tags.contains(&tag)
    }

    /// False for void elements and for raw-text elements (`<script>`,
    /// `<textarea>`, ...), whose content is text-only.
    pub fn markup_allowed(&self, tag: Token) -> bool {
        self.children_allowed(tag) && !self.raw_text_tags.contains(&tag)
    }

    /// True for elements whose text content is stored and rendered raw.
    pub fn raw_text(&self, tag: Token) -> bool {
        self.raw_text_tags.contains(&tag)
    }
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen",
    "link", "meta", "param", "source", "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

const COMMON_TAGS: &[&str] = &[
    "html", "head", "body", "div", "span", "p", "a", "ul", "ol", "li",
    "table", "tr", "td", "th", "form", "button", "select", "option",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "footer", "nav", "main",
    "section", "article", "strong", "em", "b", "i", "u", "label", "iframe",
];

const COMMON_ATTRS: &[&str] = &[
    "href", "src", "alt", "title", "placeholder", "disabled", "rel",
    "width", "height", "role", "tabindex", "action", "method", "for",
];

/// Bidirectional name / token mapping
pub struct TokenTable {
    names: Vec<Box<str>>,
    map: HashMap<Box<str>, u16>,
    well_known: WellKnown,
}

fn intern_into(names: &mut Vec<Box<str>>, map: &mut HashMap<Box<str>, u16>, s: &str) -> Token {
    if let Some(&id) = map.get(s) {
        return Token(id);
    }
    assert!(
        names.len() <= u16::MAX as usize,
        "token table overflow: more than {} distinct names interned",
        u16::MAX
    );
    let id = names.len() as u16;
    names.push(s.into());
    map.insert(s.into(), id);
    Token(id)
}

impl TokenTable {
    /// Create a new table with the structural and common HTML names
    /// pre-interned.
    pub fn new() -> Self {
        let mut names = Vec::with_capacity(128);
        let mut map = HashMap::with_capacity(128);

        let well_known = WellKnown {
            id: intern_into(&mut names, &mut map, "id"),
            class: intern_into(&mut names, &mut map, "class"),
            style: intern_into(&mut names, &mut map, "style"),
            checked: intern_into(&mut names, &mut map, "checked"),
            selected: intern_into(&mut names, &mut map, "selected"),
            readonly: intern_into(&mut names, &mut map, "readonly"),
            type_attr: intern_into(&mut names, &mut map, "type"),
            name: intern_into(&mut names, &mut map, "name"),
            value: intern_into(&mut names, &mut map, "value"),
            input: intern_into(&mut names, &mut map, "input"),
            textarea: intern_into(&mut names, &mut map, "textarea"),
            void_tags: VOID_TAGS
                .iter()
                .map(|t| intern_into(&mut names, &mut map, t))
                .collect(),
            raw_text_tags: RAW_TEXT_TAGS
                .iter()
                .map(|t| intern_into(&mut names, &mut map, t))
                .collect(),
        };

        for tag in COMMON_TAGS {
            intern_into(&mut names, &mut map, tag);
        }
        for attr in COMMON_ATTRS {
            intern_into(&mut names, &mut map, attr);
        }

        Self { names, map, well_known }
    }

    /// The process-wide shared table.
    pub fn shared() -> SharedTokenTable {
        SHARED.with(Rc::clone)
    }

    /// Intern a tag or attribute name (case-insensitive).
    pub fn intern(&mut self, name: &str) -> Token {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.intern_exact(&name.to_ascii_lowercase())
        } else {
            self.intern_exact(name)
        }
    }

    /// Intern an id or class value (case-sensitive).
    pub fn intern_exact(&mut self, name: &str) -> Token {
        intern_into(&mut self.names, &mut self.map, name)
    }

    /// Resolve a tag or attribute name without interning it.
    pub fn lookup(&self, name: &str) -> Option<Token> {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.lookup_exact(&name.to_ascii_lowercase())
        } else {
            self.lookup_exact(name)
        }
    }

    /// Resolve a case-sensitive value without interning it.
    pub fn lookup_exact(&self, name: &str) -> Option<Token> {
        self.map.get(name).map(|&id| Token(id))
    }

    /// The name a token was interned from.
    ///
    /// Panics on a token that was never produced by this table; tokens are
    /// only ever minted here, so that is a programming error.
    pub fn name(&self, token: Token) -> &str {
        match self.names.get(token.0 as usize) {
            Some(name) => name,
            None => panic!("unknown token {:?}", token),
        }
    }

    /// The structural tokens for this table.
    pub fn well_known(&self) -> &WellKnown {
        &self.well_known
    }

    /// Number of interned names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if empty (never true in practice; construction pre-interns)
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for TokenTable {
    fn default() -> Self {
        Self::new()
    }
}
