//! Tokens produced by the HTML tokenizer.

/// A single token emitted by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    /// `<!DOCTYPE ...>`; the content after the keyword.
    Doctype(String),
    /// A start tag like `<div class="x">`. Attribute values are `None`
    /// for name-only (boolean) attributes, which is distinct from an
    /// explicit empty value.
    StartTag {
        name: String,
        attrs: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    /// An end tag like `</div>`.
    EndTag { name: String },
    /// `<!-- text -->`
    Comment(String),
    /// A run of character data, references already decoded.
    Text(String),
    /// End of input.
    Eof,
}
