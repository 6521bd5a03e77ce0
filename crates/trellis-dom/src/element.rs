//! Element facade
//!
//! One surface over the three per-element facets. Reads and writes
//! addressed by attribute name dispatch to the class list, the style
//! declaration, or the attribute store depending on which token the name
//! resolves to, and every mutation keeps the document index in step before
//! it returns. Routing rules: `class` never reaches the attribute store
//! (the class list owns it), `style` never does either (the declaration
//! owns it), and `id` passes through id-key maintenance first.

use crate::attr::AttrValue;
use crate::node::{ElementData, Node};
use crate::path::{attribute_key, class_key, existence_key, id_key, tag_key, KEY_SEPARATOR};
use crate::render;
use crate::style::StyleDeclaration;
use crate::{Document, DomError, DomResult, NodeId, RenderOptions, Token};

impl Document {
    fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).as_element()
    }

    fn not_an_element() -> DomError {
        DomError::InvalidOperation("only element nodes carry attributes".into())
    }

    /// The element's tag token.
    pub fn tag(&self, id: NodeId) -> Option<Token> {
        self.element(id).map(ElementData::tag)
    }

    /// Canonical (lowercase) tag name.
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        let tag = self.tag(id)?;
        Some(self.tokens().borrow().name(tag).to_string())
    }

    // -- attribute reads --

    /// Get an attribute value. `class` and `style` read back as their
    /// rendered forms when non-empty; a boolean attribute reads as
    /// `Some("")` - use [`has_attribute`](Self::has_attribute) to tell it
    /// apart from a valued empty string.
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<String> {
        let token = self.tokens().borrow().lookup(name)?;
        self.get_attribute_token(id, token)
    }

    pub(crate) fn get_attribute_token(&self, id: NodeId, token: Token) -> Option<String> {
        let el = self.element(id)?;
        if token == self.wk.class {
            return el.has_classes().then(|| self.class_name(id));
        }
        if token == self.wk.style {
            return el.style().filter(|s| !s.is_empty()).map(|s| s.to_string());
        }
        el.attrs()?.get(token).map(|v| v.as_str().to_string())
    }

    /// Attribute existence, including the synthetic `class`/`style` view.
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        let Some(token) = self.tokens().borrow().lookup(name) else {
            return false;
        };
        self.has_attribute_token(id, token)
    }

    pub(crate) fn has_attribute_token(&self, id: NodeId, token: Token) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if token == self.wk.class {
            return el.has_classes();
        }
        if token == self.wk.style {
            return el.has_styles();
        }
        el.attrs().is_some_and(|a| a.contains(token))
    }

    /// The unified attribute view: synthetic `class` and `style` entries
    /// first (when present), then the stored attributes in order. Boolean
    /// attributes carry `None`.
    pub fn attributes(&self, id: NodeId) -> Vec<(String, Option<String>)> {
        let Some(el) = self.element(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        if el.has_classes() {
            out.push(("class".to_string(), Some(self.class_name(id))));
        }
        if el.has_styles() {
            out.push(("style".to_string(), el.style().map(ToString::to_string)));
        }
        if let Some(attrs) = el.attrs() {
            let tokens = self.tokens();
            let tokens = tokens.borrow();
            for (token, value) in attrs.iter() {
                let value = match value {
                    AttrValue::Value(v) => Some(v.clone()),
                    AttrValue::Boolean => None,
                };
                out.push((tokens.name(token).to_string(), value));
            }
        }
        out
    }

    // -- attribute writes --

    /// Set or remove (`None`) an attribute, routing `class`, `style` and
    /// `id` to their facets.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: Option<&str>) -> DomResult<()> {
        let token = self.tokens().borrow_mut().intern(name);
        self.set_attribute_token(id, token, value)
    }

    pub(crate) fn set_attribute_token(
        &mut self,
        id: NodeId,
        token: Token,
        value: Option<&str>,
    ) -> DomResult<()> {
        if self.element(id).is_none() {
            return Err(Self::not_an_element());
        }
        if token == self.wk.class {
            self.set_class_name(id, value);
            return Ok(());
        }
        if token == self.wk.style {
            match value {
                Some(text) => self.set_styles(id, text, false)?,
                None => self.clear_styles(id),
            }
            return Ok(());
        }
        if token == self.wk.id {
            self.set_id(id, value);
            return Ok(());
        }
        if token == self.wk.checked && value.is_some() {
            self.uncheck_radio_peers(id);
        }
        self.set_attribute_raw(id, token, value);
        Ok(())
    }

    /// Mark an attribute present with no value.
    pub fn set_attribute_boolean(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        let token = self.tokens().borrow_mut().intern(name);
        if self.element(id).is_none() {
            return Err(Self::not_an_element());
        }
        if token == self.wk.class || token == self.wk.style {
            return Err(DomError::InvalidOperation(
                "class and style cannot be set as boolean attributes".into(),
            ));
        }
        self.attribute_add_to_index(id, token);
        self.expect_element_mut(id).attrs_mut().set_boolean(token);
        Ok(())
    }

    /// Remove an attribute. `class` clears the class list, `style` clears
    /// the declaration. Returns whether anything was removed.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        let token = match self.tokens().borrow().lookup(name) {
            Some(t) => t,
            None => return false,
        };
        let (has_classes, has_styles, in_store) = match self.element(id) {
            Some(el) => (
                el.has_classes(),
                el.has_styles(),
                el.attrs().is_some_and(|a| a.contains(token)),
            ),
            None => return false,
        };
        if token == self.wk.class {
            if !has_classes {
                return false;
            }
            self.set_class_name(id, None);
            return true;
        }
        if token == self.wk.style {
            if !has_styles {
                return false;
            }
            self.clear_styles(id);
            return true;
        }
        if !in_store {
            return false;
        }
        if token == self.wk.id {
            self.set_id(id, None);
            return true;
        }
        self.set_attribute_raw(id, token, None)
    }

    /// Store-level set/unset plus `!` key maintenance. Returns whether the
    /// store changed.
    fn set_attribute_raw(&mut self, id: NodeId, token: Token, value: Option<&str>) -> bool {
        match value {
            Some(v) => {
                // Key first: the guard below reads the store before the
                // new value lands.
                self.attribute_add_to_index(id, token);
                self.expect_element_mut(id).attrs_mut().set(token, v);
                true
            }
            None => {
                let removed = self.expect_element_mut(id).attrs_mut().unset(token);
                self.attribute_remove_from_index(id, token);
                removed
            }
        }
    }

    /// Add the `!attr` key unless the attribute is already present (its
    /// key is then already in the index).
    fn attribute_add_to_index(&mut self, id: NodeId, token: Token) {
        if !self.is_connected(id) {
            return;
        }
        let present = self
            .element(id)
            .and_then(ElementData::attrs)
            .is_some_and(|a| a.contains(token));
        if present {
            return;
        }
        let path = self.path(id);
        self.index_mut().add(attribute_key(token, &path), id);
    }

    fn attribute_remove_from_index(&mut self, id: NodeId, token: Token) {
        if !self.is_connected(id) {
            return;
        }
        let path = self.path(id);
        self.index_mut().remove(&attribute_key(token, &path));
    }

    /// Id changes maintain the `#` key around the raw store update. The
    /// old entry is removed while the store still holds the old value;
    /// the key computation must not see the new one.
    fn set_id(&mut self, id: NodeId, value: Option<&str>) {
        if self.is_connected(id) {
            let id_token = self.wk.id;
            let old = self
                .element(id)
                .and_then(ElementData::attrs)
                .and_then(|a| a.get(id_token))
                .map(|v| v.as_str().to_string());
            if let Some(old) = old.filter(|v| !v.is_empty()) {
                let token = self.tokens().borrow_mut().intern_exact(&old);
                let path = self.path(id);
                self.index_mut().remove(&id_key(token, &path));
            }
            if let Some(new) = value.filter(|v| !v.is_empty()) {
                let token = self.tokens().borrow_mut().intern_exact(new);
                let path = self.path(id);
                self.index_mut().add(id_key(token, &path), id);
            }
        }
        self.set_attribute_raw(id, self.wk.id, value);
    }

    /// Setting `checked` on a connected radio input unchecks the rest of
    /// its name group. Peers come from the tag index and are snapshotted
    /// before any write.
    fn uncheck_radio_peers(&mut self, id: NodeId) {
        if !self.is_connected(id) {
            return;
        }
        let Some(el) = self.element(id) else {
            return;
        };
        if el.tag() != self.wk.input {
            return;
        }
        if self.input_type(id).as_deref() != Some("radio") {
            return;
        }
        let Some(group) = self.name_attr(id).filter(|n| !n.is_empty()) else {
            return;
        };
        let prefix = format!("+{:04x}{}", self.wk.input.0, KEY_SEPARATOR);
        let peers = self.index().lookup_prefix(&prefix);
        tracing::debug!(group = %group, peers = peers.len(), "radio exclusivity sweep");
        let checked = self.wk.checked;
        for peer in peers {
            if peer == id {
                continue;
            }
            if self.input_type(peer).as_deref() != Some("radio") {
                continue;
            }
            if self.name_attr(peer).as_deref() != Some(group.as_str()) {
                continue;
            }
            if self.has_attribute_token(peer, checked) {
                self.set_attribute_raw(peer, checked, None);
            }
        }
    }

    // -- classes --

    /// The rendered class attribute (empty string when no classes).
    pub fn class_name(&self, id: NodeId) -> String {
        let Some(el) = self.element(id) else {
            return String::new();
        };
        let tokens = self.tokens();
        let tokens = tokens.borrow();
        let mut out = String::new();
        for &cls in el.classes() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(tokens.name(cls));
        }
        out
    }

    /// Case-sensitive single-class membership test.
    pub fn has_class(&self, id: NodeId, name: &str) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        self.tokens()
            .borrow()
            .lookup_exact(name)
            .is_some_and(|tok| el.classes().contains(&tok))
    }

    /// Add one or more whitespace-separated classes. Returns true if at
    /// least one was actually added. The first class ever also creates the
    /// synthetic `class` attribute entry in the index.
    pub fn add_class(&mut self, id: NodeId, name: &str) -> bool {
        let (had_classes, existing) = match self.element(id) {
            Some(el) => (el.has_classes(), el.classes().to_vec()),
            None => return false,
        };
        let mut to_add: Vec<Token> = Vec::new();
        {
            let tokens = self.tokens();
            let mut tokens = tokens.borrow_mut();
            for cls in name.split_whitespace() {
                let tok = tokens.intern_exact(cls);
                if !existing.contains(&tok) && !to_add.contains(&tok) {
                    to_add.push(tok);
                }
            }
        }
        if to_add.is_empty() {
            return false;
        }
        let connected = self.is_connected(id);
        let path = connected.then(|| self.path(id));
        for &tok in &to_add {
            self.expect_element_mut(id).classes.push(tok);
            if let Some(path) = &path {
                self.index_mut().add(class_key(tok, path), id);
            }
        }
        if !had_classes && connected {
            let class_token = self.wk.class;
            self.attribute_add_to_index(id, class_token);
        }
        true
    }

    /// Remove one or more whitespace-separated classes. Returns true if at
    /// least one was actually removed. Removing the last class also drops
    /// the synthetic `class` attribute entry.
    pub fn remove_class(&mut self, id: NodeId, name: &str) -> bool {
        let (had_classes, existing) = match self.element(id) {
            Some(el) => (el.has_classes(), el.classes().to_vec()),
            None => return false,
        };
        let mut to_remove: Vec<Token> = Vec::new();
        {
            let tokens = self.tokens();
            let tokens = tokens.borrow();
            for cls in name.split_whitespace() {
                if let Some(tok) = tokens.lookup_exact(cls) {
                    if existing.contains(&tok) && !to_remove.contains(&tok) {
                        to_remove.push(tok);
                    }
                }
            }
        }
        if to_remove.is_empty() {
            return false;
        }
        let connected = self.is_connected(id);
        let path = connected.then(|| self.path(id));
        for &tok in &to_remove {
            self.expect_element_mut(id).classes.retain(|c| *c != tok);
            if let Some(path) = &path {
                self.index_mut().remove(&class_key(tok, path));
            }
        }
        let now_empty = self.element(id).is_some_and(|el| !el.has_classes());
        if now_empty && had_classes && connected {
            let class_token = self.wk.class;
            self.attribute_remove_from_index(id, class_token);
        }
        true
    }

    /// Replace the whole class list from a space-separated string
    /// (`None` clears it).
    pub fn set_class_name(&mut self, id: NodeId, value: Option<&str>) {
        let current = self.class_name(id);
        if !current.is_empty() {
            self.remove_class(id, &current);
        }
        if let Some(value) = value {
            if !value.trim().is_empty() {
                self.add_class(id, value);
            }
        }
    }

    // -- styles --

    /// The rendered style attribute, if any styles are set.
    pub fn style_text(&self, id: NodeId) -> Option<String> {
        self.get_attribute_token(id, self.wk.style)
    }

    pub fn has_style(&self, id: NodeId, name: &str) -> bool {
        self.element(id)
            .and_then(ElementData::style)
            .is_some_and(|s| s.has_style(name))
    }

    /// Replace the element's style declaration with the parse of `text`.
    /// Strict parse failures apply nothing.
    pub fn set_styles(&mut self, id: NodeId, text: &str, strict: bool) -> DomResult<()> {
        let had = match self.element(id) {
            Some(el) => el.has_styles(),
            None => return Err(Self::not_an_element()),
        };
        let parsed = StyleDeclaration::parse(text, strict)?;
        let has = !parsed.is_empty();
        self.expect_element_mut(id).style = has.then_some(parsed);
        self.sync_style_key(id, had, has);
        Ok(())
    }

    /// Merge the parse of `text` into the element's styles.
    pub fn add_styles(&mut self, id: NodeId, text: &str, strict: bool) -> DomResult<()> {
        let had = match self.element(id) {
            Some(el) => el.has_styles(),
            None => return Err(Self::not_an_element()),
        };
        let parsed = StyleDeclaration::parse(text, strict)?;
        for (name, value) in parsed.iter() {
            self.expect_element_mut(id).style_mut().set(name, value);
        }
        let has = self.element(id).is_some_and(ElementData::has_styles);
        self.sync_style_key(id, had, has);
        Ok(())
    }

    /// Set a single style property.
    pub fn set_style(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let had = match self.element(id) {
            Some(el) => el.has_styles(),
            None => return Err(Self::not_an_element()),
        };
        self.expect_element_mut(id).style_mut().set(name, value);
        let has = self.element(id).is_some_and(ElementData::has_styles);
        self.sync_style_key(id, had, has);
        Ok(())
    }

    /// Remove a single style property. Returns whether it was present.
    pub fn remove_style(&mut self, id: NodeId, name: &str) -> bool {
        let had = match self.element(id) {
            Some(el) => el.has_styles(),
            None => return false,
        };
        let removed = match self.expect_element_mut(id).style.as_mut() {
            Some(style) => style.remove(name),
            None => false,
        };
        if removed {
            let has = self.element(id).is_some_and(ElementData::has_styles);
            self.sync_style_key(id, had, has);
        }
        removed
    }

    fn clear_styles(&mut self, id: NodeId) {
        let had = self.element(id).is_some_and(ElementData::has_styles);
        self.expect_element_mut(id).style = None;
        self.sync_style_key(id, had, false);
    }

    /// The synthetic `!style` entry tracks has-styles exactly like
    /// `!class` tracks has-classes.
    fn sync_style_key(&mut self, id: NodeId, had: bool, has: bool) {
        if !self.is_connected(id) {
            return;
        }
        let style_token = self.wk.style;
        if has && !had {
            self.attribute_add_to_index(id, style_token);
        } else if had && !has {
            self.attribute_remove_from_index(id, style_token);
        }
    }

    // -- form-state accessors --

    pub fn checked(&self, id: NodeId) -> bool {
        self.has_attribute_token(id, self.wk.checked)
    }

    /// Check or uncheck; checking a radio input triggers the group sweep.
    pub fn set_checked(&mut self, id: NodeId, value: bool) -> DomResult<()> {
        let checked = self.wk.checked;
        self.set_attribute_token(id, checked, value.then_some(""))
    }

    pub fn selected(&self, id: NodeId) -> bool {
        self.has_attribute_token(id, self.wk.selected)
    }

    pub fn read_only(&self, id: NodeId) -> bool {
        self.has_attribute_token(id, self.wk.readonly)
    }

    /// The `type` attribute; for `<input>` it is lowercased and defaults
    /// to `"text"`.
    pub fn input_type(&self, id: NodeId) -> Option<String> {
        let el = self.element(id)?;
        let value = self.get_attribute_token(id, self.wk.type_attr);
        if el.tag() == self.wk.input {
            Some(value.unwrap_or_else(|| "text".into()).to_ascii_lowercase())
        } else {
            value
        }
    }

    /// The `name` attribute.
    pub fn name_attr(&self, id: NodeId) -> Option<String> {
        self.get_attribute_token(id, self.wk.name)
    }

    /// The `value` attribute of an `<input>`; `None` for other elements.
    pub fn value_attr(&self, id: NodeId) -> Option<String> {
        let el = self.element(id)?;
        if el.tag() != self.wk.input {
            return None;
        }
        self.get_attribute_token(id, self.wk.value)
    }

    // -- content --

    /// Children rendered as markup; empty string if none.
    pub fn inner_html(&self, id: NodeId) -> String {
        render::render_children(self, id, self.options())
    }

    /// The node rendered as markup.
    pub fn outer_html(&self, id: NodeId) -> String {
        render::render_node(self, id, self.options())
    }

    /// The node rendered under explicit options.
    pub fn render_with(&self, id: NodeId, options: RenderOptions) -> String {
        render::render_node(self, id, options)
    }

    /// Replace the children with the parse of `html`. Fails for tags that
    /// do not permit markup children; the replacement is parsed before the
    /// old children are touched, so a failure mutates nothing.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> DomResult<()> {
        let tag = match self.element(id) {
            Some(el) => el.tag(),
            None => return Err(Self::not_an_element()),
        };
        if !self.wk.markup_allowed(tag) {
            let name = self.tokens().borrow().name(tag).to_string();
            return Err(DomError::InvalidOperation(format!(
                "cannot set the inner HTML of a <{name}> element"
            )));
        }
        let parser = self.fragment_parser().ok_or_else(|| {
            DomError::InvalidOperation("no fragment parser is configured for this document".into())
        })?;
        let roots = parser.parse_fragment(self, html);
        while let Some(&first) = self.children(id).first() {
            self.detach(first);
        }
        for root in roots {
            self.append_child(id, root)?;
        }
        Ok(())
    }

    /// Concatenated content of the direct text children (not deep).
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            if let Some(text) = self.node(child).as_text() {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace the children with a single text node. Raw-text tags
    /// (script, style, textarea, title) get an unescaped node.
    pub fn set_inner_text(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        let tag = match self.element(id) {
            Some(el) => el.tag(),
            None => return Err(Self::not_an_element()),
        };
        if !self.wk.children_allowed(tag) {
            let name = self.tokens().borrow().name(tag).to_string();
            return Err(DomError::InvalidOperation(format!(
                "cannot set the text of a <{name}> element"
            )));
        }
        let node = if self.wk.markup_allowed(tag) {
            self.create_text(text)
        } else {
            self.create_raw_text(text)
        };
        while let Some(&first) = self.children(id).first() {
            self.detach(first);
        }
        self.append_child(id, node)
    }

    /// Concatenated text content of the whole subtree, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let Some(text) = self.node(node).as_text() {
                out.push_str(text);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    // -- index keys and cloning --

    /// Every key this element should currently occupy in the index: the
    /// bare existence key, the tag key, the id key (if any), one class key
    /// per class token, and one attribute key per present attribute token
    /// (synthetic `class`/`style` entries included). This enumeration is
    /// authoritative: the index holds exactly these keys for every
    /// connected element.
    pub fn index_keys(&mut self, id: NodeId) -> Vec<String> {
        let path = self.path(id);
        let id_token = self.wk.id;
        let (tag, classes, attr_tokens, has_classes, has_styles, id_value) =
            match self.element(id) {
                Some(el) => (
                    el.tag(),
                    el.classes().to_vec(),
                    el.attrs()
                        .map(|a| a.tokens().collect::<Vec<_>>())
                        .unwrap_or_default(),
                    el.has_classes(),
                    el.has_styles(),
                    el.attrs()
                        .and_then(|a| a.get(id_token))
                        .map(|v| v.as_str().to_string()),
                ),
                None => return Vec::new(),
            };
        let mut keys = Vec::with_capacity(4 + classes.len() + attr_tokens.len());
        keys.push(existence_key(&path));
        keys.push(tag_key(tag, &path));
        if let Some(value) = id_value.filter(|v| !v.is_empty()) {
            let token = self.tokens().borrow_mut().intern_exact(&value);
            keys.push(id_key(token, &path));
        }
        for cls in classes {
            keys.push(class_key(cls, &path));
        }
        if has_classes {
            keys.push(attribute_key(self.wk.class, &path));
        }
        if has_styles {
            keys.push(attribute_key(self.wk.style, &path));
        }
        for token in attr_tokens {
            keys.push(attribute_key(token, &path));
        }
        keys
    }

    /// Deep copy: new identity, copied attributes, classes and style,
    /// recursively cloned children. The clone starts disconnected and
    /// unindexed.
    pub fn clone_node(&mut self, id: NodeId) -> NodeId {
        let data = self.node(id).data().clone();
        let new = self.alloc(Node::with_data(data));
        let children = self.children(id).to_vec();
        let mut element_count = 0u32;
        for child in children {
            let copy = self.clone_node(child);
            if self.node(copy).is_element() {
                self.node_mut(copy).sibling_index = element_count;
                element_count += 1;
            }
            self.node_mut(copy).parent = Some(new);
            self.node_mut(new).children.push(copy);
        }
        new
    }
}
