//! Read-only page views addressed by element id.
//!
//! Server-rendered pages carry their props as text inside id-addressed elements. Library code only
//! ever needs one question answered about a page: "what is the text content of the element with
//! this id?". [`Document`] is that capability; [`HtmlDocument`] answers it for real HTML and
//! [`StaticDocument`] for hand-built fixtures.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use lol_html::html_content::{EndTag, TextType};
use lol_html::{EndTagHandler, RewriteStrSettings, doc_text, element, rewrite_str};
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub trait Document {
    /// Text content of the first element carrying `id`, or `None` when no such element exists.
    fn text_content(&self, id: &str) -> Option<Cow<'_, str>>;

    fn contains(&self, id: &str) -> bool {
        self.text_content(id).is_some()
    }
}

impl<D: Document + ?Sized> Document for &D {
    fn text_content(&self, id: &str) -> Option<Cow<'_, str>> {
        (**self).text_content(id)
    }

    fn contains(&self, id: &str) -> bool {
        (**self).contains(id)
    }
}

/// An id index over a parsed HTML page.
///
/// The index is built in a single streaming pass. Text content follows DOM `textContent`: all
/// descendant text is concatenated, entity references are decoded in normal elements and kept
/// verbatim in raw-text elements such as `<script>`. When several elements share an id, the first
/// one in document order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlDocument {
    elements: IndexMap<String, String>,
}

#[derive(Debug, Default)]
struct TextSegment {
    decode: bool,
    raw: String,
}

#[derive(Debug, Default)]
struct IndexedElement {
    id: String,
    segments: Vec<TextSegment>,
}

impl IndexedElement {
    fn push_text(&mut self, text: &str, decode: bool) {
        match self.segments.last_mut() {
            Some(last) if last.decode == decode => last.raw.push_str(text),
            _ => self.segments.push(TextSegment {
                decode,
                raw: text.to_string(),
            }),
        }
    }

    fn into_text(self) -> String {
        let mut out = String::new();
        for segment in self.segments {
            if segment.decode {
                out.push_str(&htmlize::unescape(segment.raw));
            } else {
                out.push_str(&segment.raw);
            }
        }
        out
    }
}

#[derive(Debug)]
struct OpenElement {
    serial: usize,
    tag: String,
    /// Slot in `IndexState::elements` when the element carries a non-empty id.
    index: Option<usize>,
}

#[derive(Debug, Default)]
struct IndexState {
    elements: Vec<IndexedElement>,
    open: Vec<OpenElement>,
    next_serial: usize,
}

/// Start tags that end an open `<p>`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "dd", "details", "dialog", "dir",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "li", "listing", "main", "menu", "nav", "ol",
    "p", "plaintext", "pre", "section", "summary", "table", "ul", "xmp",
];

/// Whether a `start` tag implicitly ends an open `open` element.
fn implies_end(open: &str, start: &str) -> bool {
    match open {
        "p" => CLOSES_P.contains(&start),
        "li" => start == "li",
        "dt" | "dd" => matches!(start, "dt" | "dd"),
        "option" => matches!(start, "option" | "optgroup"),
        "optgroup" => start == "optgroup",
        "tr" => start == "tr",
        "td" | "th" => matches!(start, "td" | "th" | "tr"),
        "thead" | "tbody" | "tfoot" => matches!(start, "tbody" | "tfoot"),
        _ => false,
    }
}

/// Elements whose content is a separate scope for implied end tags.
fn is_scope_boundary(tag: &str) -> bool {
    matches!(
        tag,
        "applet"
            | "body"
            | "button"
            | "caption"
            | "dl"
            | "html"
            | "marquee"
            | "object"
            | "ol"
            | "select"
            | "table"
            | "template"
            | "ul"
    )
}

impl IndexState {
    /// Pops the elements a `start` tag closes implicitly.
    fn open_element(&mut self, start: &str) {
        let mut pos = self.open.len();
        while pos > 0 {
            let tag = self.open[pos - 1].tag.as_str();
            if implies_end(tag, start) {
                self.open.truncate(pos - 1);
            } else if is_scope_boundary(tag) {
                break;
            }
            pos -= 1;
        }
    }

    /// Pops the element with `serial` and everything opened inside it.
    fn close_element(&mut self, serial: usize) {
        if let Some(pos) = self.open.iter().rposition(|open| open.serial == serial) {
            self.open.truncate(pos);
        }
    }
}

fn decodes_entities(text_type: TextType) -> bool {
    matches!(text_type, TextType::Data | TextType::RCData)
}

impl HtmlDocument {
    pub fn parse(html: &str) -> Result<Self> {
        let state = Rc::new(RefCell::new(IndexState::default()));

        let element_state = Rc::clone(&state);
        let text_state = Rc::clone(&state);

        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![element!("*", move |el| {
                    let tag = el.tag_name().to_ascii_lowercase();
                    // `getElementById("")` never matches.
                    let id = el
                        .get_attribute("id")
                        .map(|raw| htmlize::unescape_attribute(raw).into_owned())
                        .filter(|id| !id.is_empty());

                    let mut st = element_state.borrow_mut();
                    st.open_element(&tag);
                    let index = id.map(|id| {
                        st.elements.push(IndexedElement {
                            id,
                            segments: Vec::new(),
                        });
                        st.elements.len() - 1
                    });

                    // Void elements have no end tag and therefore no content to collect.
                    if let Some(handlers) = el.end_tag_handlers() {
                        let serial = st.next_serial;
                        st.next_serial += 1;
                        st.open.push(OpenElement { serial, tag, index });

                        let end_state = Rc::clone(&element_state);
                        let handler: EndTagHandler<'static> =
                            Box::new(move |_end: &mut EndTag<'_>| {
                                end_state.borrow_mut().close_element(serial);
                                Ok(())
                            });
                        handlers.push(handler);
                    }
                    Ok(())
                })],
                document_content_handlers: vec![doc_text!(move |chunk| {
                    let text = chunk.as_str();
                    if text.is_empty() {
                        return Ok(());
                    }
                    let decode = decodes_entities(chunk.text_type());
                    let mut st = text_state.borrow_mut();
                    let IndexState { elements, open, .. } = &mut *st;
                    for index in open.iter().filter_map(|open| open.index) {
                        if let Some(element) = elements.get_mut(index) {
                            element.push_text(text, decode);
                        }
                    }
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )
        .map_err(|err| Error::Markup {
            message: err.to_string(),
        })?;

        let indexed = std::mem::take(&mut state.borrow_mut().elements);
        let mut elements = IndexMap::with_capacity(indexed.len());
        for element in indexed {
            if elements.contains_key(&element.id) {
                continue;
            }
            let id = element.id.clone();
            elements.insert(id, element.into_text());
        }

        Ok(Self { elements })
    }

    /// Indexed ids in document order (first occurrence only).
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Document for HtmlDocument {
    fn text_content(&self, id: &str) -> Option<Cow<'_, str>> {
        self.elements.get(id).map(|text| Cow::Borrowed(text.as_str()))
    }
}

/// In-memory id -> text map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticDocument {
    elements: BTreeMap<String, String>,
}

impl StaticDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(id, text);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.elements.insert(id.into(), text.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.elements.remove(id)
    }
}

impl Document for StaticDocument {
    fn text_content(&self, id: &str) -> Option<Cow<'_, str>> {
        self.elements.get(id).map(|text| Cow::Borrowed(text.as_str()))
    }
}
