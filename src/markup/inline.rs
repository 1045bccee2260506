//! Inline whitelist reduction
//!
//! Reduces a subtree to the whitelisted inline tags: `b`, `i`, `u`, `s`,
//! `code`, `pre`, and `a` with an http(s) href. Everything else is
//! unwrapped (tag removed, children kept). The walk is a single iterative
//! pass over tree edges that emits only whitelisted tags, which is the
//! fixed point of repeatedly unwrapping disallowed tags: a disallowed
//! ancestor exposed by an unwrap is simply never emitted.

use crate::extract::escape_text;
use ego_tree::iter::Edge;
use ego_tree::{NodeId, NodeRef};
use scraper::node::{Element, Node};

/// Elements removed entirely, contents included
const STRIP_TAGS: &[&str] = &["script", "style", "noscript"];

/// Class name fragments marking non-content decoration
const STRIP_CLASS_PATTERNS: &[&str] = &["page-break", "refcode", "pager", "breadcrumb"];

/// True when an element and its whole subtree should be discarded
pub(crate) fn should_strip(element: &Element) -> bool {
    if STRIP_TAGS.contains(&element.name()) {
        return true;
    }
    element.classes().any(|class| {
        let class = class.to_lowercase();
        STRIP_CLASS_PATTERNS
            .iter()
            .any(|pattern| class.contains(pattern))
    })
}

/// The whitelisted tag an element is emitted as, if any
///
/// `strong` and `em` normalize to `b` and `i`. Anchors qualify only with a
/// genuine web link target; otherwise they are unwrapped and only their text
/// survives.
pub(crate) fn inline_tag(element: &Element) -> Option<&'static str> {
    match element.name() {
        "b" | "strong" => Some("b"),
        "i" | "em" => Some("i"),
        "u" => Some("u"),
        "s" => Some("s"),
        "code" => Some("code"),
        "pre" => Some("pre"),
        "a" => http_href(element).map(|_| "a"),
        _ => None,
    }
}

/// The element's href when it is a real http(s) link
pub(crate) fn http_href(element: &Element) -> Option<&str> {
    let href = element.attr("href")?;
    if href.starts_with("http://") || href.starts_with("https://") {
        Some(href)
    } else {
        None
    }
}

/// Emits the opening form of a whitelisted tag
///
/// All attributes are dropped except the hyperlink's href.
pub(crate) fn push_open_tag(out: &mut String, element: &Element, tag: &str) {
    if tag == "a" {
        if let Some(href) = http_href(element) {
            out.push_str("<a href=\"");
            out.push_str(&href.replace('"', "&quot;"));
            out.push_str("\">");
        }
    } else {
        out.push('<');
        out.push_str(tag);
        out.push('>');
    }
}

/// Reduces the contents of a node to the inline whitelist
///
/// The node's own tag is not emitted; its subtree is. Text is escaped so no
/// literal `<` from the source can masquerade as markup downstream.
pub fn reduce_inline(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    let mut skipping: Option<NodeId> = None;
    let root_id = node.id();

    for edge in node.traverse() {
        match edge {
            Edge::Open(node) => {
                if skipping.is_some() || node.id() == root_id {
                    continue;
                }
                match node.value() {
                    Node::Element(el) => {
                        if should_strip(el) {
                            skipping = Some(node.id());
                            continue;
                        }
                        if let Some(tag) = inline_tag(el) {
                            push_open_tag(&mut out, el, tag);
                        }
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
                if skipping.is_some() || node.id() == root_id {
                    continue;
                }
                if let Some(el) = node.value().as_element() {
                    if let Some(tag) = inline_tag(el) {
                        out.push_str("</");
                        out.push_str(tag);
                        out.push('>');
                    }
                }
            }
        }
    }

    out
}
