//! Section-marker reduction path
//!
//! Pages from the primary reading site wrap their substantive text in
//! `span.egw_content` elements, with section titles in `h1`/`h3` headings
//! carrying the same class. When those markers are present the reducer
//! works from them directly instead of walking the whole body: headings
//! become bold lines, body spans become paragraphs. Spans that share an
//! enclosing `<p>` are joined with a space; everything else is separated
//! by a blank line.

use crate::extract::escape_text;
use crate::markup::inline::{reduce_inline, should_strip};
use ego_tree::iter::Edge;
use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Reduces a document via its section markers
///
/// Returns `None` when the page carries no markers at all, which sends the
/// caller to the whole-body fallback.
pub(crate) fn extract_sections(document: &Html) -> Option<String> {
    let span_selector = Selector::parse("span.egw_content").ok()?;
    let heading_selector = Selector::parse("h1.egw_content, h3.egw_content").ok()?;

    let headings: Vec<ElementRef> = document.select(&heading_selector).collect();
    let spans: Vec<ElementRef> = document
        .select(&span_selector)
        .filter(|span| !should_strip(span.value()))
        .collect();

    if headings.is_empty() && spans.is_empty() {
        return None;
    }

    // Spans nested inside a heading are part of its title, not body text
    let heading_span_ids: HashSet<NodeId> = headings
        .iter()
        .flat_map(|heading| heading.select(&span_selector))
        .map(|span| span.id())
        .collect();

    let mut out = String::new();

    for heading in &headings {
        // The title lives in the heading's own content span; the rest of the
        // heading is decoration (reference codes, pagers). Fall back to the
        // full heading text only when no such span exists.
        let title = match heading
            .select(&span_selector)
            .find(|span| !should_strip(span.value()))
        {
            Some(span) => text_without_stripped(*span),
            None => text_without_stripped(**heading),
        };
        if !title.is_empty() {
            out.push_str("<b>");
            out.push_str(&escape_text(&title));
            out.push_str("</b>\n\n");
        }
    }

    let body_spans: Vec<ElementRef> = spans
        .into_iter()
        .filter(|span| !heading_span_ids.contains(&span.id()))
        .collect();

    for (index, span) in body_spans.iter().enumerate() {
        let reduced = reduce_inline(**span);
        let reduced = reduced.trim();
        if reduced.is_empty() {
            continue;
        }
        out.push_str(reduced);

        match body_spans.get(index + 1) {
            // Sibling spans sharing an enclosing paragraph read as one
            // sentence flow; spans with no paragraph at all count as sharing
            Some(next) if enclosing_paragraph(span) == enclosing_paragraph(next) => {
                out.push(' ');
            }
            _ => out.push_str("\n\n"),
        }
    }

    Some(out)
}

/// The nearest `<p>` ancestor, used to group spans into paragraphs
fn enclosing_paragraph(span: &ElementRef) -> Option<NodeId> {
    span.ancestors()
        .find(|node| {
            node.value()
                .as_element()
                .map(|el| el.name() == "p")
                .unwrap_or(false)
        })
        .map(|node| node.id())
}

/// Collects a subtree's text with stripped subtrees excluded
fn text_without_stripped(node: NodeRef<'_, Node>) -> String {
    let mut raw = String::new();
    let mut skipping: Option<NodeId> = None;

    for edge in node.traverse() {
        match edge {
            Edge::Open(node) => {
                if skipping.is_some() {
                    continue;
                }
                match node.value() {
                    Node::Element(el) if should_strip(el) => skipping = Some(node.id()),
                    Node::Text(text) => raw.push_str(text),
                    _ => {}
                }
            }
            Edge::Close(node) => {
                if skipping == Some(node.id()) {
                    skipping = None;
                }
            }
        }
    }

    collapse_whitespace(&raw)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
