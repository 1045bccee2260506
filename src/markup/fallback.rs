//! Whole-body reduction path
//!
//! Used when a page carries no section markers. The walk covers the best
//! available container (a known content div, else the body) and turns block
//! structure into text layout: paragraphs, divs and headings become blank
//! lines, list items become bullet lines, `<br>` becomes a newline. Inline
//! markup is reduced to the same whitelist as the section path.

use crate::extract::escape_text;
use crate::markup::inline::{inline_tag, push_open_tag, should_strip};
use ego_tree::iter::Edge;
use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::{Html, Selector};

const BLOCK_TAGS: &[&str] = &["p", "div", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Containers tried before falling back to the whole body
const FALLBACK_CONTAINERS: &[&str] = &["div.book-content", "div.egw_content_container", "body"];

/// Reduces a document without section markers
pub(crate) fn reduce_whole_body(document: &Html) -> String {
    for selector_str in FALLBACK_CONTAINERS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                return walk_blocks(*element);
            }
        }
    }
    walk_blocks(*document.root_element())
}

/// Flattens block structure into newline layout, inline tags into the whitelist
fn walk_blocks(root: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    let mut skipping: Option<NodeId> = None;
    let root_id = root.id();

    for edge in root.traverse() {
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
                        } else if BLOCK_TAGS.contains(&el.name()) {
                            out.push('\n');
                        } else if el.name() == "li" {
                            out.push_str("• ");
                        } else if el.name() == "br" {
                            out.push('\n');
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
                    } else if BLOCK_TAGS.contains(&el.name()) {
                        out.push_str("\n\n");
                    } else if matches!(el.name(), "li" | "ul" | "ol") {
                        out.push('\n');
                    }
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::normalize::normalize;

    fn reduce(html: &str) -> String {
        normalize(&reduce_whole_body(&Html::parse_document(html)))
    }

    #[test]
    fn test_paragraphs_become_blank_lines() {
        let out = reduce("<body><p>First</p><p>Second</p></body>");
        assert_eq!(out, "First\n\nSecond");
    }

    #[test]
    fn test_heading_then_paragraph() {
        let out = reduce("<body><h2>Title</h2><p>Body with <em>style</em></p></body>");
        assert_eq!(out, "Title\n\nBody with <i>style</i>");
    }

    #[test]
    fn test_list_items_become_bullets() {
        let out = reduce("<body><ul><li>one</li><li>two</li></ul></body>");
        assert_eq!(out, "• one\n• two");
    }

    #[test]
    fn test_br_breaks_line() {
        let out = reduce("<body><p>line one<br>line two</p></body>");
        assert_eq!(out, "line one\nline two");
    }

    #[test]
    fn test_book_content_container_preferred() {
        let out = reduce(
            r#"<body><div class="sidebar"><p>ignore me</p></div>
               <div class="book-content"><p>keep me</p></div></body>"#,
        );
        assert_eq!(out, "keep me");
    }

    #[test]
    fn test_nested_divs_do_not_multiply_breaks() {
        let out = reduce("<body><div><div><p>deep</p></div></div></body>");
        assert_eq!(out, "deep");
    }
}
