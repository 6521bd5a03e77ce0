//! trellis-html - Lenient HTML parsing for trellis-dom
//!
//! Tokenizer and tree builder that create nodes directly in a
//! [`trellis_dom::Document`], interning tag and attribute names through the
//! document's token table as they are read. Malformed markup never fails;
//! it degrades to text.

mod builder;
mod token;
mod tokenizer;

pub use builder::{parse_fragment, HtmlParser};
pub use token::HtmlToken;
pub use tokenizer::Tokenizer;

use std::rc::Rc;

use trellis_dom::{Document, SharedTokenTable, TokenTable};

/// Parse a complete document using the process-wide shared token table.
pub fn parse(html: &str) -> Document {
    parse_with_tokens(html, TokenTable::shared())
}

/// Parse a complete document over an explicitly injected token table.
pub fn parse_with_tokens(html: &str, tokens: SharedTokenTable) -> Document {
    let mut doc = Document::with_tokens(tokens);
    doc.set_fragment_parser(Rc::new(HtmlParser));
    let roots = parse_fragment(&mut doc, html);
    let root = doc.root();
    for node in roots {
        if let Err(err) = doc.append_child(root, node) {
            tracing::debug!(%err, "could not attach parsed root");
        }
    }
    tracing::debug!(nodes = doc.len(), "parsed document");
    doc
}
