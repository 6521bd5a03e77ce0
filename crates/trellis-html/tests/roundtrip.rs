//! Render / reparse round-trips
//!
//! Rendering a tree and parsing it back must reproduce an equivalent tree:
//! same tags, same attribute sets, same text. Literal formatting (quoting
//! style, whitespace inside tags) is allowed to differ.

use trellis_dom::{Document, NodeData, NodeId, RenderOptions};

fn assert_tree_equiv(a: &Document, an: NodeId, b: &Document, bn: NodeId) {
    match (a.node(an).data(), b.node(bn).data()) {
        (NodeData::Document, NodeData::Document) | (NodeData::Element(_), NodeData::Element(_)) => {
            if a.node(an).is_element() {
                assert_eq!(a.tag_name(an), b.tag_name(bn), "tag mismatch");
                let mut attrs_a = a.attributes(an);
                let mut attrs_b = b.attributes(bn);
                attrs_a.sort();
                attrs_b.sort();
                assert_eq!(attrs_a, attrs_b, "attribute mismatch on <{:?}>", a.tag_name(an));
            }
            let ca = a.children(an);
            let cb = b.children(bn);
            assert_eq!(ca.len(), cb.len(), "child count mismatch");
            for (&x, &y) in ca.iter().zip(cb.iter()) {
                assert_tree_equiv(a, x, b, y);
            }
        }
        (NodeData::Text(ta), NodeData::Text(tb)) => {
            assert_eq!(ta.content, tb.content, "text mismatch");
        }
        (NodeData::Comment(ca), NodeData::Comment(cb)) => {
            assert_eq!(ca, cb, "comment mismatch");
        }
        (x, y) => panic!("node kind mismatch: {x:?} vs {y:?}"),
    }
}

fn assert_round_trips(doc: &Document, options: RenderOptions) {
    let rendered = doc.render_with(doc.root(), options);
    let reparsed = trellis_html::parse(&rendered);
    assert_tree_equiv(doc, doc.root(), &reparsed, reparsed.root());
    // And rendering is stable from there.
    assert_eq!(reparsed.render_with(reparsed.root(), options), rendered);
}

fn build_sample() -> Document {
    let mut doc = Document::new();
    let article = doc.create_element("article").unwrap();
    doc.set_attribute(article, "id", Some("post-1")).unwrap();
    doc.add_class(article, "featured pinned");
    doc.set_styles(article, "margin: 0; color: red", true).unwrap();
    doc.append_child(doc.root(), article).unwrap();

    let h1 = doc.create_element("h1").unwrap();
    doc.set_inner_text(h1, "Ampersands & angles <here>").unwrap();
    doc.append_child(article, h1).unwrap();

    let link = doc.create_element("a").unwrap();
    doc.set_attribute(link, "href", Some("/read?id=1&x=2")).unwrap();
    doc.set_attribute(link, "title", Some(r#"say "hello""#)).unwrap();
    doc.append_child(article, link).unwrap();

    let note = doc.create_comment(" draft ");
    doc.append_child(article, note).unwrap();
    doc
}

#[test]
fn test_round_trip_default_options() {
    let doc = build_sample();
    assert_round_trips(&doc, RenderOptions::default());
}

#[test]
fn test_round_trip_minimal_quoting() {
    let doc = build_sample();
    let options = RenderOptions {
        quote_all_attributes: false,
        ..RenderOptions::default()
    };
    assert_round_trips(&doc, options);
}

#[test]
fn test_round_trip_boolean_attributes() {
    let mut doc = Document::new();
    let form = doc.create_element("form").unwrap();
    doc.append_child(doc.root(), form).unwrap();
    let input = doc.create_element("input").unwrap();
    doc.set_attribute_boolean(input, "checked").unwrap();
    doc.set_attribute(input, "value", Some("")).unwrap();
    doc.append_child(form, input).unwrap();

    assert_round_trips(&doc, RenderOptions::default());
    // The bare and the empty-valued attribute survive as distinct shapes.
    let rendered = doc.outer_html(form);
    assert_eq!(rendered, r#"<form><input checked value=""></form>"#);
}

#[test]
fn test_round_trip_void_elements_both_modes() {
    let mut doc = Document::new();
    let p = doc.create_element("p").unwrap();
    doc.append_child(doc.root(), p).unwrap();
    for (tag, attr) in [("img", Some(("src", "x.png"))), ("br", None), ("hr", None)] {
        let el = doc.create_element(tag).unwrap();
        if let Some((name, value)) = attr {
            doc.set_attribute(el, name, Some(value)).unwrap();
        }
        doc.append_child(p, el).unwrap();
    }
    assert_round_trips(&doc, RenderOptions::default());
    let xhtml = RenderOptions {
        self_close_void: true,
        ..RenderOptions::default()
    };
    assert_round_trips(&doc, xhtml);
}

#[test]
fn test_round_trip_raw_text_elements() {
    let mut doc = Document::new();
    for (tag, content) in [
        ("script", "if (a < b && c > d) run();"),
        ("style", ".x > .y { content: \"<div>\"; }"),
        ("textarea", "plain & <raw> text"),
    ] {
        let el = doc.create_element(tag).unwrap();
        doc.set_inner_text(el, content).unwrap();
        doc.append_child(doc.root(), el).unwrap();
    }
    assert_round_trips(&doc, RenderOptions::default());
}

#[test]
fn test_round_trip_from_markup() {
    let source = r#"<div id="a" class="x y" style="color: red" data-n="1"><span>one &amp; two</span><input type="checkbox" checked></div>"#;
    let doc = trellis_html::parse(source);
    assert_round_trips(&doc, RenderOptions::default());
}
