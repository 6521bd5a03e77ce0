//! Tree builder
//!
//! Feeds tokenizer output into a `trellis-dom` document: an open-element
//! stack, void tags never pushed, raw-text content attached as a single
//! unescaped node, unmatched end tags ignored. Built nodes stay
//! disconnected; the caller decides where (and whether) to attach them.

use trellis_dom::{Document, FragmentParser, NodeId, Token};

use crate::token::HtmlToken;
use crate::tokenizer::Tokenizer;

/// The [`FragmentParser`] capability backed by this crate.
///
/// Install on a document with
/// [`Document::set_fragment_parser`](trellis_dom::Document::set_fragment_parser)
/// to enable `set_inner_html`.
pub struct HtmlParser;

impl FragmentParser for HtmlParser {
    fn parse_fragment(&self, doc: &mut Document, html: &str) -> Vec<NodeId> {
        parse_fragment(doc, html)
    }
}

/// Parse markup into disconnected nodes owned by `doc`, returning the
/// fragment roots in order.
pub fn parse_fragment(doc: &mut Document, html: &str) -> Vec<NodeId> {
    FragmentBuilder::new(doc).run(html)
}

struct FragmentBuilder<'d> {
    doc: &'d mut Document,
    stack: Vec<NodeId>,
    roots: Vec<NodeId>,
    in_raw_text: bool,
}

impl<'d> FragmentBuilder<'d> {
    fn new(doc: &'d mut Document) -> Self {
        Self {
            doc,
            stack: Vec::new(),
            roots: Vec::new(),
            in_raw_text: false,
        }
    }

    fn run(mut self, html: &str) -> Vec<NodeId> {
        let mut tokenizer = Tokenizer::new(html);
        loop {
            match tokenizer.next_token() {
                HtmlToken::StartTag {
                    name,
                    attrs,
                    self_closing,
                } => self.start_tag(&mut tokenizer, &name, attrs, self_closing),
                HtmlToken::EndTag { name } => self.end_tag(&name),
                HtmlToken::Text(text) => self.text(text),
                HtmlToken::Comment(content) => {
                    let node = self.doc.create_comment(content);
                    self.insert(node);
                }
                HtmlToken::Doctype(content) => {
                    tracing::debug!(doctype = %content, "skipping doctype in fragment");
                }
                HtmlToken::Eof => break,
            }
        }
        tracing::debug!(roots = self.roots.len(), "fragment built");
        self.roots
    }

    fn start_tag(
        &mut self,
        tokenizer: &mut Tokenizer,
        name: &str,
        attrs: Vec<(String, Option<String>)>,
        self_closing: bool,
    ) {
        let el = match self.doc.create_element(name) {
            Ok(el) => el,
            Err(err) => {
                tracing::debug!(%err, tag = %name, "dropping unusable start tag");
                return;
            }
        };
        for (attr, value) in attrs {
            let outcome = match value {
                Some(v) => self.doc.set_attribute(el, &attr, Some(&v)),
                // Name-only attribute; class/style refuse the boolean form
                // and degrade to an empty value.
                None => self
                    .doc
                    .set_attribute_boolean(el, &attr)
                    .or_else(|_| self.doc.set_attribute(el, &attr, Some(""))),
            };
            if let Err(err) = outcome {
                tracing::debug!(%err, attr = %attr, "dropping attribute");
            }
        }
        self.insert(el);

        let (children_allowed, markup_allowed) = self.tag_capabilities(el);
        if self_closing || !children_allowed {
            return;
        }
        self.stack.push(el);
        if !markup_allowed {
            tokenizer.enter_raw_text(name);
            self.in_raw_text = true;
        }
    }

    fn end_tag(&mut self, name: &str) {
        self.in_raw_text = false;
        let token = self.doc.tokens().borrow_mut().intern(name);
        if let Some(pos) = self.stack.iter().rposition(|&el| self.tag_of(el) == Some(token)) {
            self.stack.truncate(pos);
        }
        // Unmatched end tags are ignored.
    }

    fn text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        let node = if self.in_raw_text {
            self.in_raw_text = false;
            self.doc.create_raw_text(text)
        } else {
            self.doc.create_text(text)
        };
        self.insert(node);
    }

    fn insert(&mut self, node: NodeId) {
        match self.stack.last() {
            Some(&parent) => {
                if let Err(err) = self.doc.append_child(parent, node) {
                    tracing::debug!(%err, "could not append parsed node");
                }
            }
            None => self.roots.push(node),
        }
    }

    fn tag_of(&self, el: NodeId) -> Option<Token> {
        self.doc.tag(el)
    }

    fn tag_capabilities(&self, el: NodeId) -> (bool, bool) {
        let Some(tag) = self.doc.tag(el) else {
            return (false, false);
        };
        let tokens = self.doc.tokens();
        let tokens = tokens.borrow();
        let wk = tokens.well_known();
        (wk.children_allowed(tag), wk.markup_allowed(tag))
    }
}
