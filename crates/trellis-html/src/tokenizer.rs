//! Lenient HTML tokenizer
//!
//! A cursor over the input with WHATWG-shaped tag/attribute/comment
//! handling, trimmed to what fragment parsing needs: malformed input never
//! fails, it degrades to text. Raw-text element content (`<script>`,
//! `<style>`, `<textarea>`, `<title>`) is handed back as one undecoded
//! chunk; the tree builder switches that mode on after the start tag.

use crate::token::HtmlToken;

/// HTML tokenizer - call [`next_token`](Tokenizer::next_token) until
/// [`HtmlToken::Eof`].
pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
    /// When set, the next token is the raw content run ending before
    /// `</{tag}`.
    raw_text_end: Option<String>,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            raw_text_end: None,
        }
    }

    /// Treat everything up to `</tag>` as one raw text chunk.
    pub fn enter_raw_text(&mut self, tag: &str) {
        self.raw_text_end = Some(tag.to_ascii_lowercase());
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Case-insensitive lookahead without consuming.
    fn lookahead_ci(&self, s: &str) -> bool {
        let mut offset = 0;
        for expected in s.chars() {
            match self.peek_at(offset) {
                Some(actual) if actual.to_ascii_lowercase() == expected.to_ascii_lowercase() => {
                    offset += 1;
                }
                _ => return false,
            }
        }
        true
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> HtmlToken {
        if let Some(end_tag) = self.raw_text_end.take() {
            let chunk = self.raw_text_run(&end_tag);
            if !chunk.is_empty() {
                return HtmlToken::Text(chunk);
            }
        }
        let Some(c) = self.peek() else {
            return HtmlToken::Eof;
        };
        if c == '<' {
            match self.peek_at(1) {
                Some('/') => self.end_tag(),
                Some('!') => self.markup_declaration(),
                Some(c) if c.is_ascii_alphabetic() => self.start_tag(),
                // A lone '<' is character data.
                _ => self.text_run(),
            }
        } else {
            self.text_run()
        }
    }

    fn raw_text_run(&mut self, end_tag: &str) -> String {
        let close = format!("</{end_tag}");
        let start = self.pos;
        while self.pos < self.input.len() {
            if self.input[self.pos] == '<' && self.lookahead_ci(&close) {
                break;
            }
            self.pos += 1;
        }
        self.input[start..self.pos].iter().collect()
    }

    fn text_run(&mut self) -> HtmlToken {
        let mut out = String::new();
        // The first character may be a non-tag '<'.
        if self.peek() == Some('<') {
            out.push('<');
            self.pos += 1;
        }
        while let Some(c) = self.peek() {
            match c {
                '<' => break,
                '&' => out.push_str(&self.character_reference()),
                _ => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
        HtmlToken::Text(out)
    }

    fn tag_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() || c == '>' || c == '/' {
                break;
            }
            name.push(c.to_ascii_lowercase());
            self.pos += 1;
        }
        name
    }

    fn start_tag(&mut self) -> HtmlToken {
        self.pos += 1; // '<'
        let name = self.tag_name();
        let mut attrs: Vec<(String, Option<String>)> = Vec::new();
        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    break;
                }
                Some('/') => {
                    self.pos += 1;
                    if self.peek() == Some('>') {
                        self.pos += 1;
                        self_closing = true;
                        break;
                    }
                }
                Some(_) => {
                    let before = self.pos;
                    let (attr, value) = self.attribute();
                    if !attr.is_empty() && !attrs.iter().any(|(n, _)| *n == attr) {
                        attrs.push((attr, value));
                    } else if self.pos == before {
                        // Stray character; skip it rather than loop forever.
                        self.pos += 1;
                    }
                }
            }
        }
        HtmlToken::StartTag {
            name,
            attrs,
            self_closing,
        }
    }

    fn attribute(&mut self) -> (String, Option<String>) {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() || c == '=' || c == '>' || c == '/' {
                break;
            }
            name.push(c.to_ascii_lowercase());
            self.pos += 1;
        }
        self.skip_whitespace();
        if self.peek() != Some('=') {
            return (name, None);
        }
        self.pos += 1; // '='
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                while let Some(c) = self.peek() {
                    if c == quote {
                        self.pos += 1;
                        break;
                    }
                    if c == '&' {
                        value.push_str(&self.character_reference());
                    } else {
                        value.push(c);
                        self.pos += 1;
                    }
                }
                value
            }
            _ => {
                let mut value = String::new();
                while let Some(c) = self.peek() {
                    if c.is_ascii_whitespace() || c == '>' {
                        break;
                    }
                    if c == '&' {
                        value.push_str(&self.character_reference());
                    } else {
                        value.push(c);
                        self.pos += 1;
                    }
                }
                value
            }
        };
        (name, Some(value))
    }

    fn end_tag(&mut self) -> HtmlToken {
        self.pos += 2; // '</'
        let name = self.tag_name();
        while let Some(c) = self.consume() {
            if c == '>' {
                break;
            }
        }
        HtmlToken::EndTag { name }
    }

    fn markup_declaration(&mut self) -> HtmlToken {
        if self.lookahead_ci("<!--") {
            self.pos += 4;
            return self.comment();
        }
        if self.lookahead_ci("<!doctype") {
            self.pos += 9;
            let mut content = String::new();
            while let Some(c) = self.consume() {
                if c == '>' {
                    break;
                }
                content.push(c);
            }
            return HtmlToken::Doctype(content.trim().to_string());
        }
        // Bogus declaration: swallow to '>' as a comment.
        self.pos += 2;
        let mut content = String::new();
        while let Some(c) = self.consume() {
            if c == '>' {
                break;
            }
            content.push(c);
        }
        HtmlToken::Comment(content)
    }

    fn comment(&mut self) -> HtmlToken {
        let mut content = String::new();
        while self.pos < self.input.len() {
            if self.input[self.pos] == '-' && self.lookahead_ci("-->") {
                self.pos += 3;
                return HtmlToken::Comment(content);
            }
            content.push(self.input[self.pos]);
            self.pos += 1;
        }
        // Unterminated comment: the rest of the input.
        HtmlToken::Comment(content)
    }

    /// Decode one character reference at the cursor, or return the literal
    /// `&` when it is not one we recognize.
    fn character_reference(&mut self) -> String {
        debug_assert_eq!(self.peek(), Some('&'));
        let start = self.pos;
        self.pos += 1;
        if self.peek() == Some('#') {
            self.pos += 1;
            let hex = matches!(self.peek(), Some('x' | 'X'));
            if hex {
                self.pos += 1;
            }
            let mut digits = String::new();
            while let Some(c) = self.peek() {
                if (hex && c.is_ascii_hexdigit()) || (!hex && c.is_ascii_digit()) {
                    digits.push(c);
                    self.pos += 1;
                } else {
                    break;
                }
            }
            if self.peek() == Some(';') && !digits.is_empty() {
                self.pos += 1;
                let radix = if hex { 16 } else { 10 };
                if let Some(c) = u32::from_str_radix(&digits, radix)
                    .ok()
                    .and_then(char::from_u32)
                {
                    return c.to_string();
                }
            }
            self.pos = start + 1;
            return "&".to_string();
        }
        const NAMED: &[(&str, char)] = &[
            ("amp;", '&'),
            ("lt;", '<'),
            ("gt;", '>'),
            ("quot;", '"'),
            ("apos;", '\''),
            ("nbsp;", '\u{a0}'),
        ];
        for (name, c) in NAMED {
            if self.lookahead_ci(name) {
                self.pos += name.len();
                return c.to_string();
            }
        }
        "&".to_string()
    }
}
