//! "Next page" link resolution
//!
//! Reading sites paginate in wildly different ways, so the next link is
//! located by a heuristic cascade over the full page document: exact link
//! text, partial link text, title/aria-label attributes, pagination class
//! names, navigation containers, and finally numbered URL fragments. The
//! first rule that produces a usable candidate wins.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Multilingual "next" vocabulary, matched case-insensitively
const NEXT_TERMS: &[&str] = &[
    "next",
    "наступна",
    "наступний",
    "следующая",
    "следующий",
    "далі",
    "далее",
    "→",
    ">",
];

/// Class name fragments indicating a next/pagination link
const NEXT_CLASS_PATTERNS: &[&str] = &["next-page", "next-link", "pagination-next", "btn-next", "next"];

static TRAILING_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)$").expect("valid fragment regex"));

/// Heuristically locates the next-page link in a document
///
/// Each candidate href is resolved to an absolute URL against `current_url`
/// and rejected if it points back at the current page. Returns `None` when
/// no rule fires, which ends the crawl gracefully.
pub fn resolve_next(document: &Html, current_url: &Url) -> Option<Url> {
    let anchor_selector = Selector::parse("a[href]").ok()?;
    let anchors: Vec<ElementRef> = document.select(&anchor_selector).collect();

    // Rule 1: exact link text match
    for anchor in &anchors {
        let text = anchor_text(anchor);
        if NEXT_TERMS.iter().any(|term| text == *term) {
            if let Some(url) = candidate(anchor, current_url) {
                return Some(url);
            }
        }
    }

    // Rule 2: link text contains a next term
    for anchor in &anchors {
        let text = anchor_text(anchor);
        if !text.is_empty() && NEXT_TERMS.iter().any(|term| text.contains(term)) {
            if let Some(url) = candidate(anchor, current_url) {
                return Some(url);
            }
        }
    }

    // Rule 3: title or aria-label names the next page
    for anchor in &anchors {
        for attribute in ["title", "aria-label"] {
            if let Some(value) = anchor.value().attr(attribute) {
                let value = value.to_lowercase();
                if NEXT_TERMS.iter().any(|term| value.contains(term)) {
                    if let Some(url) = candidate(anchor, current_url) {
                        return Some(url);
                    }
                }
            }
        }
    }

    // Rule 4: pagination-style class names
    for anchor in &anchors {
        let has_next_class = anchor.value().classes().any(|class| {
            let class = class.to_lowercase();
            NEXT_CLASS_PATTERNS
                .iter()
                .any(|pattern| class.contains(pattern))
        });
        if has_next_class {
            if let Some(url) = candidate(anchor, current_url) {
                return Some(url);
            }
        }
    }

    // Rule 5: anchors inside navigation/pagination containers
    if let Ok(selector) = Selector::parse("nav a[href], div.pagination a[href], div.navigation a[href]")
    {
        for anchor in document.select(&selector) {
            let text = anchor_text(&anchor);
            if NEXT_TERMS.iter().any(|term| text.contains(term)) {
                if let Some(url) = candidate(&anchor, current_url) {
                    return Some(url);
                }
            }
        }
    }

    // Rule 6: numbered URL fragments (#22 -> #23)
    if let Some(captures) = TRAILING_FRAGMENT.captures(current_url.as_str()) {
        if let Ok(number) = captures[1].parse::<u64>() {
            let wanted = format!("#{}", number + 1);
            for anchor in &anchors {
                if let Some(href) = anchor.value().attr("href") {
                    if href.ends_with(&wanted) {
                        if let Some(url) = candidate(anchor, current_url) {
                            return Some(url);
                        }
                    }
                }
            }
        }
    }

    None
}

/// Lowercased, trimmed visible text of an anchor
fn anchor_text(anchor: &ElementRef) -> String {
    anchor.text().collect::<String>().trim().to_lowercase()
}

/// Resolves an anchor's href to an absolute URL, rejecting self-links
fn candidate(anchor: &ElementRef, current_url: &Url) -> Option<Url> {
    let href = anchor.value().attr("href")?;
    let resolved = current_url.join(href).ok()?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    if resolved == *current_url {
        return None;
    }

    Some(resolved)
}
