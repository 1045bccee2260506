//! Content container extraction
//!
//! Reading sites put the substantive content in different places depending on
//! the template. This module tries a prioritized list of container selectors
//! and falls back to the document body with chrome (headers, footers,
//! navigation, scripts, styles) removed.

use ego_tree::iter::Edge;
use ego_tree::NodeId;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Container selectors tried in order; first match wins
const CONTAINER_SELECTORS: &[&str] = &[
    "div.content",
    "div#content",
    "main",
    "article",
    "div.book-content",
    "div.book-text",
    "div.text-content",
];

/// Elements removed from the body in the fallback path
const NON_CONTENT_TAGS: &[&str] = &["header", "footer", "nav", "script", "style"];

/// Tags that never carry a closing tag
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// The content subtree of one page
#[derive(Debug, Clone)]
pub struct ContentRegion {
    /// The subtree serialized back to HTML (container tag included)
    pub html: String,

    /// Newline-joined trimmed text of the subtree
    pub text: String,
}

/// Isolates the main content subtree from a parsed page
///
/// Tries each container selector in order. If none matches, serializes the
/// document body with non-content elements removed. Returns `None` only when
/// the document has no body at all.
pub fn extract_content(document: &Html) -> Option<ContentRegion> {
    for selector_str in CONTAINER_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                return Some(ContentRegion {
                    html: element.html(),
                    text: element_text(element),
                });
            }
        }
    }

    // No dedicated container: take the body minus chrome
    let body_selector = Selector::parse("body").ok()?;
    let body = document.select(&body_selector).next()?;
    let html = serialize_without(body, NON_CONTENT_TAGS);
    let fragment = Html::parse_fragment(&html);
    let text = fragment
        .select(&body_selector)
        .next()
        .map(element_text)
        .unwrap_or_else(|| fragment.root_element().text().map(str::trim).filter(|t| !t.is_empty()).collect::<Vec<_>>().join("\n"));

    Some(ContentRegion { html, text })
}

/// Tags that end a line of visible text
const TEXT_BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "tr",
];

/// Collects the visible text of an element subtree
///
/// Inline markup flows into one line; block elements and `<br>` break lines.
/// Lines are trimmed, inner whitespace runs collapsed, empty lines dropped.
/// Script and style contents are excluded.
pub fn element_text(element: ElementRef) -> String {
    let mut raw = String::new();
    let mut skipping: Option<NodeId> = None;

    for edge in element.traverse() {
        match edge {
            Edge::Open(node) => {
                if skipping.is_some() {
                    continue;
                }
                match node.value() {
                    Node::Element(el) if matches!(el.name(), "script" | "style") => {
                        skipping = Some(node.id());
                    }
                    Node::Element(el) if el.name() == "br" => raw.push('\n'),
                    Node::Text(text) => raw.push_str(text),
                    _ => {}
                }
            }
            Edge::Close(node) => {
                if skipping == Some(node.id()) {
                    skipping = None;
                    continue;
                }
                if skipping.is_some() {
                    continue;
                }
                if let Some(el) = node.value().as_element() {
                    if TEXT_BLOCK_TAGS.contains(&el.name()) {
                        raw.push('\n');
                    }
                }
            }
        }
    }

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serializes an element subtree back to HTML, skipping the given tags
///
/// The walk is iterative over tree edges, so arbitrarily deep markup cannot
/// overflow the stack.
fn serialize_without(element: ElementRef, skip_tags: &[&str]) -> String {
    let mut out = String::new();
    let mut skipping: Option<NodeId> = None;

    for edge in element.traverse() {
        match edge {
            Edge::Open(node) => {
                if skipping.is_some() {
                    continue;
                }
                match node.value() {
                    Node::Element(el) => {
                        if skip_tags.contains(&el.name()) {
                            skipping = Some(node.id());
                            continue;
                        }
                        out.push('<');
                        out.push_str(el.name());
                        for (name, value) in el.attrs() {
                            out.push(' ');
                            out.push_str(name);
                            out.push_str("=\"");
                            out.push_str(&escape_attribute(value));
                            out.push('"');
                        }
                        out.push('>');
                    }
                    Node::Text(text) => out.push_str(&escape_text(text)),
                    _ => {}
                }
            }
            Edge::Close(node) => {
                if skipping == Some(node.id()) {
                    skipping = None;
                    continue;
                }
                if skipping.is_some() {
                    continue;
                }
                if let Some(el) = node.value().as_element() {
                    if !VOID_TAGS.contains(&el.name()) {
                        out.push_str("</");
                        out.push_str(el.name());
                        out.push('>');
                    }
                }
            }
        }
    }

    out
}

/// Escapes text node content for HTML re-emission
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
