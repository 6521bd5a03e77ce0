//! Index integrity across mutations
//!
//! The contract under test: for every connected element, the index's key
//! set equals `index_keys()`, after every class of mutation - and nothing
//! else is in the index.

use std::rc::Rc;

use trellis_dom::{
    attribute_key, class_key, id_key, tag_key, Document, DomError, FragmentParser, NodeId,
};

fn connected_elements(doc: &Document) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![doc.root()];
    while let Some(id) = stack.pop() {
        if doc.node(id).is_element() {
            out.push(id);
        }
        stack.extend(doc.children(id).iter().rev().copied());
    }
    out
}

fn assert_index_consistent(doc: &mut Document) {
    let elements = connected_elements(doc);
    let mut total = 0;
    for el in elements {
        for key in doc.index_keys(el) {
            assert_eq!(
                doc.index().lookup(&key),
                Some(el),
                "index is missing key {key:?} for {el:?}"
            );
            total += 1;
        }
    }
    assert_eq!(doc.index().len(), total, "index holds stale keys");
}

fn fixture() -> (Document, NodeId, NodeId, NodeId) {
    let mut doc = Document::new();
    let outer = doc.create_element("div").unwrap();
    let inner = doc.create_element("span").unwrap();
    let input = doc.create_element("input").unwrap();
    doc.set_attribute(outer, "id", Some("outer")).unwrap();
    doc.add_class(inner, "hot cold");
    doc.set_attribute(input, "type", Some("text")).unwrap();
    doc.append_child(doc.root(), outer).unwrap();
    doc.append_child(outer, inner).unwrap();
    doc.append_child(outer, input).unwrap();
    (doc, outer, inner, input)
}

#[test]
fn attach_indexes_whole_subtree() {
    let (mut doc, outer, inner, input) = fixture();
    assert_index_consistent(&mut doc);
    // Spot-check a few concrete keys.
    let tokens = doc.tokens();
    let span = tokens.borrow().lookup("span").unwrap();
    let hot = tokens.borrow().lookup_exact("hot").unwrap();
    let path = doc.path(inner);
    assert_eq!(doc.index().lookup(&tag_key(span, &path)), Some(inner));
    assert_eq!(doc.index().lookup(&class_key(hot, &path)), Some(inner));
    assert!(doc.index_keys(outer).len() >= 3);
    assert!(doc.index_keys(input).len() >= 3);
}

#[test]
fn detach_removes_every_key() {
    let (mut doc, outer, ..) = fixture();
    doc.detach(outer);
    assert!(doc.index().is_empty());
    assert_index_consistent(&mut doc);
}

#[test]
fn disconnected_mutations_never_touch_the_index() {
    let mut doc = Document::new();
    let el = doc.create_element("div").unwrap();
    doc.set_attribute(el, "id", Some("x")).unwrap();
    doc.add_class(el, "a");
    doc.set_style(el, "color", "red").unwrap();
    assert!(doc.index().is_empty());
}

#[test]
fn id_change_swaps_the_id_key() {
    let mut doc = Document::new();
    let el = doc.create_element("div").unwrap();
    doc.set_attribute(el, "id", Some("x")).unwrap();
    doc.append_child(doc.root(), el).unwrap();

    let path = doc.path(el);
    let tokens = doc.tokens();
    let x = tokens.borrow_mut().intern_exact("x");
    assert_eq!(doc.index().lookup(&id_key(x, &path)), Some(el));

    doc.set_attribute(el, "id", Some("y")).unwrap();
    let y = tokens.borrow_mut().intern_exact("y");
    assert_eq!(doc.index().lookup(&id_key(x, &path)), None);
    assert_eq!(doc.index().lookup(&id_key(y, &path)), Some(el));
    assert_index_consistent(&mut doc);

    doc.set_attribute(el, "id", None).unwrap();
    assert_eq!(doc.index().lookup(&id_key(y, &path)), None);
    assert_index_consistent(&mut doc);
}

#[test]
fn class_keys_and_single_synthetic_entry() {
    let mut doc = Document::new();
    let el = doc.create_element("div").unwrap();
    doc.append_child(doc.root(), el).unwrap();

    assert!(doc.add_class(el, "a b a"));
    assert_eq!(doc.class_name(el), "a b");

    let path = doc.path(el);
    let tokens = doc.tokens();
    let a = tokens.borrow_mut().intern_exact("a");
    let b = tokens.borrow_mut().intern_exact("b");
    let class_attr = tokens.borrow().lookup("class").unwrap();
    assert_eq!(doc.index().lookup(&class_key(a, &path)), Some(el));
    assert_eq!(doc.index().lookup(&class_key(b, &path)), Some(el));
    assert_eq!(doc.index().lookup(&attribute_key(class_attr, &path)), Some(el));
    assert_index_consistent(&mut doc);

    // Dropping one class keeps the synthetic entry; dropping the last
    // removes it.
    doc.remove_class(el, "a");
    assert_eq!(doc.index().lookup(&class_key(a, &path)), None);
    assert_eq!(doc.index().lookup(&attribute_key(class_attr, &path)), Some(el));
    doc.remove_class(el, "b");
    assert_eq!(doc.index().lookup(&attribute_key(class_attr, &path)), None);
    assert_index_consistent(&mut doc);
}

#[test]
fn style_mutations_track_the_synthetic_entry() {
    let mut doc = Document::new();
    let el = doc.create_element("div").unwrap();
    doc.append_child(doc.root(), el).unwrap();

    let path = doc.path(el);
    let tokens = doc.tokens();
    let style_attr = tokens.borrow().lookup("style").unwrap();

    doc.set_style(el, "color", "red").unwrap();
    assert_eq!(doc.index().lookup(&attribute_key(style_attr, &path)), Some(el));
    assert_index_consistent(&mut doc);

    assert!(doc.remove_style(el, "color"));
    assert_eq!(doc.index().lookup(&attribute_key(style_attr, &path)), None);
    assert_index_consistent(&mut doc);
}

#[test]
fn reparenting_reindexes_moved_and_displaced_subtrees() {
    let mut doc = Document::new();
    let left = doc.create_element("div").unwrap();
    let right = doc.create_element("div").unwrap();
    let child = doc.create_element("span").unwrap();
    doc.add_class(child, "payload");
    doc.append_child(doc.root(), left).unwrap();
    doc.append_child(doc.root(), right).unwrap();
    doc.append_child(left, child).unwrap();
    assert_index_consistent(&mut doc);

    let old_path = doc.path(child);
    doc.append_child(right, child).unwrap();
    let new_path = doc.path(child);
    assert_ne!(old_path, new_path);
    assert_index_consistent(&mut doc);

    // Removing the first root shifts the second; its subtree must follow.
    doc.detach(left);
    assert_index_consistent(&mut doc);
    assert!(doc.is_connected(child));
}

#[test]
fn insert_before_displaces_later_siblings() {
    let mut doc = Document::new();
    let a = doc.create_element("p").unwrap();
    let b = doc.create_element("p").unwrap();
    doc.append_child(doc.root(), b).unwrap();
    assert_index_consistent(&mut doc);
    doc.insert_before(doc.root(), a, Some(b)).unwrap();
    assert_index_consistent(&mut doc);
    assert!(doc.path(a) < doc.path(b));
}

#[test]
fn subtree_prefix_queries() {
    let mut doc = Document::new();
    let section_one = doc.create_element("section").unwrap();
    let section_two = doc.create_element("section").unwrap();
    doc.append_child(doc.root(), section_one).unwrap();
    doc.append_child(doc.root(), section_two).unwrap();

    let mut marked_in_one = Vec::new();
    for section in [section_one, section_two] {
        for _ in 0..2 {
            let item = doc.create_element("span").unwrap();
            doc.add_class(item, "marked");
            doc.append_child(section, item).unwrap();
            if section == section_one {
                marked_in_one.push(item);
            }
        }
    }

    let tokens = doc.tokens();
    let marked = tokens.borrow_mut().intern_exact("marked");
    let scope = doc.path(section_one);
    // "descendants of section_one with class marked", no tree walk.
    let hits = doc.index().lookup_prefix(&class_key(marked, &scope));
    assert_eq!(hits, marked_in_one);

    // Document-wide class query.
    let all = doc.index().lookup_prefix(&class_key(marked, ""));
    assert_eq!(all.len(), 4);
}

#[test]
fn failed_mutations_leave_element_and_index_untouched() {
    let (mut doc, _, inner, _) = fixture();
    doc.set_styles(inner, "color: red", true).unwrap();
    let before: Vec<String> = doc.index_keys(inner);

    assert!(matches!(
        doc.set_styles(inner, "color: blue; nope", true),
        Err(DomError::StyleParse(_))
    ));
    assert_eq!(doc.style_text(inner), Some("color: red".into()));
    assert_eq!(doc.index_keys(inner), before);
    assert_index_consistent(&mut doc);

    // A bad structural reference leaves everything as it was.
    let stray = doc.create_element("p").unwrap();
    let not_a_child = doc.create_element("p").unwrap();
    assert_eq!(
        doc.insert_before(inner, stray, Some(not_a_child)),
        Err(DomError::NotAChild)
    );
    assert_index_consistent(&mut doc);
}

/// A stub markup parser: proves the capability seam without pulling the
/// real one in.
struct OneSpan;

impl FragmentParser for OneSpan {
    fn parse_fragment(&self, doc: &mut Document, html: &str) -> Vec<NodeId> {
        let span = match doc.create_element("span") {
            Ok(el) => el,
            Err(_) => return Vec::new(),
        };
        let text = doc.create_text(html);
        let _ = doc.append_child(span, text);
        vec![span]
    }
}

#[test]
fn set_inner_html_reindexes_replaced_children() {
    let (mut doc, outer, inner, _) = fixture();
    doc.set_fragment_parser(Rc::new(OneSpan));

    doc.set_inner_html(outer, "payload").unwrap();
    assert!(!doc.is_connected(inner), "old children must be detached");
    assert_eq!(doc.children(outer).len(), 1);
    assert_eq!(doc.inner_text(doc.children(outer)[0]), "payload");
    assert_index_consistent(&mut doc);
}

#[test]
fn set_inner_html_without_parser_fails_cleanly() {
    let (mut doc, outer, ..) = fixture();
    let children_before = doc.children(outer).to_vec();
    assert!(matches!(
        doc.set_inner_html(outer, "<b>x</b>"),
        Err(DomError::InvalidOperation(_))
    ));
    assert_eq!(doc.children(outer), &children_before[..]);
    assert_index_consistent(&mut doc);
}

#[test]
fn clone_starts_unindexed() {
    let (mut doc, outer, ..) = fixture();
    let before = doc.index().len();
    let copy = doc.clone_node(outer);
    assert_eq!(doc.index().len(), before);

    doc.append_child(doc.root(), copy).unwrap();
    assert_index_consistent(&mut doc);
}
