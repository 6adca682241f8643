use crate::*;

#[test]
fn script_text_is_kept_verbatim() {
    let html = r#"<html><body>
<script id="props" type="application/json">{"a":"&amp;","b":"<b>"}</script>
</body></html>"#;
    let doc = HtmlDocument::parse(html).unwrap();
    assert_eq!(
        doc.text_content("props").as_deref(),
        Some(r#"{"a":"&amp;","b":"<b>"}"#)
    );
}

#[test]
fn normal_element_text_is_entity_decoded_and_includes_descendants() {
    let html = r#"<div id="outer">Tom &amp; <span id="inner">&quot;Jerry&quot;</span>!</div>"#;
    let doc = HtmlDocument::parse(html).unwrap();
    assert_eq!(
        doc.text_content("outer").as_deref(),
        Some("Tom & \"Jerry\"!")
    );
    assert_eq!(doc.text_content("inner").as_deref(), Some("\"Jerry\""));
}

#[test]
fn first_element_wins_on_duplicate_ids() {
    let html = r#"<p id="dup">first</p><p id="dup">second</p>"#;
    let doc = HtmlDocument::parse(html).unwrap();
    assert_eq!(doc.text_content("dup").as_deref(), Some("first"));
    assert_eq!(doc.len(), 1);
}

#[test]
fn void_and_empty_elements_are_indexed_with_empty_text() {
    let html = r#"<input id="field" value="x"><canvas id="whatsapp-qr-code"></canvas>"#;
    let doc = HtmlDocument::parse(html).unwrap();
    assert!(doc.contains("field"));
    assert!(doc.contains("whatsapp-qr-code"));
    assert_eq!(doc.text_content("whatsapp-qr-code").as_deref(), Some(""));
    assert!(!doc.contains("missing"));
}

#[test]
fn ids_are_listed_in_document_order() {
    let html = r#"<main id="b"><section id="a"></section></main><footer id="c"></footer>"#;
    let doc = HtmlDocument::parse(html).unwrap();
    assert_eq!(doc.ids().collect::<Vec<_>>(), vec!["b", "a", "c"]);
}

#[test]
fn attribute_ids_are_entity_decoded() {
    let html = r#"<script id="a&amp;b" type="application/json">1</script>"#;
    let doc = HtmlDocument::parse(html).unwrap();
    assert_eq!(doc.text_content("a&b").as_deref(), Some("1"));
}

#[test]
fn static_document_answers_lookups() {
    let mut doc = StaticDocument::new().with_element("props", r#"{"x":1}"#);
    assert_eq!(doc.text_content("props").as_deref(), Some(r#"{"x":1}"#));
    assert_eq!(doc.remove("props").as_deref(), Some(r#"{"x":1}"#));
    assert!(!doc.contains("props"));
}

#[test]
fn implicitly_closed_elements_stop_collecting_text() {
    let html = r#"<ul><li id="item">one<li>two</ul><p>after</p>"#;
    let doc = HtmlDocument::parse(html).unwrap();
    assert_eq!(doc.text_content("item").as_deref(), Some("one"));

    let html = r#"<p id="para">first<div>block</div><p>second"#;
    let doc = HtmlDocument::parse(html).unwrap();
    assert_eq!(doc.text_content("para").as_deref(), Some("first"));

    let html = r#"<dl><dt id="term">tide<dd id="def">high <b>water</b><dt>next</dl>"#;
    let doc = HtmlDocument::parse(html).unwrap();
    assert_eq!(doc.text_content("term").as_deref(), Some("tide"));
    assert_eq!(doc.text_content("def").as_deref(), Some("high water"));
}

#[test]
fn ancestor_end_tag_closes_unclosed_descendants() {
    let html = r#"<div id="card"><p id="lead">hello</div>outside"#;
    let doc = HtmlDocument::parse(html).unwrap();
    assert_eq!(doc.text_content("lead").as_deref(), Some("hello"));
    assert_eq!(doc.text_content("card").as_deref(), Some("hello"));
}

#[test]
fn nested_lists_keep_their_own_items_open() {
    let html = r#"<ul><li id="outer">a<ul><li id="inner">b<li>c</ul>d</ul>"#;
    let doc = HtmlDocument::parse(html).unwrap();
    assert_eq!(doc.text_content("inner").as_deref(), Some("b"));
    assert_eq!(doc.text_content("outer").as_deref(), Some("abcd"));
}

#[test]
fn empty_ids_are_not_indexed() {
    let html = r#"<div id="">ignored</div><span id="kept">x</span>"#;
    let doc = HtmlDocument::parse(html).unwrap();
    assert!(!doc.contains(""));
    assert_eq!(doc.ids().collect::<Vec<_>>(), vec!["kept"]);
}
