//! Output canonicalization
//!
//! Last pass of the reducer. Collapses whitespace runs, trims paragraph
//! edges, rewrites any tag still present to its canonical whitelist form
//! (dropping the rest), and removes empty tag pairs. The tag rewrite runs
//! to a fixed point so the result is stable no matter what the tree walks
//! produced.

use regex::Regex;
use std::sync::LazyLock;

static HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid whitespace regex"));

static NEWLINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)([^>]*)>").expect("valid tag regex"));

static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']([^"']*)["']"#).expect("valid href regex")
});

static EMPTY_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a href="[^"]*"></a>"#).expect("valid anchor regex"));

/// Canonicalizes reduced markup
///
/// Deterministic on its input; running it twice yields the same string.
pub(crate) fn normalize(input: &str) -> String {
    let mut content = tidy_layout(input);

    loop {
        let rewritten = rewrite_tags(&content);
        if rewritten == content {
            break;
        }
        content = rewritten;
    }

    content = remove_empty_pairs(content);
    tidy_layout(&content)
}

/// Collapses whitespace and trims paragraph and line edges
fn tidy_layout(content: &str) -> String {
    let content = HORIZONTAL_WS.replace_all(content, " ");
    let content = NEWLINE_RUN.replace_all(&content, "\n\n");

    content
        .split("\n\n")
        .map(|paragraph| {
            paragraph
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Rewrites every tag to canonical whitelist form, dropping the rest
///
/// Closing anchor tags are paired with their opening tags through a stack,
/// so an anchor dropped for a bad href also drops its matching `</a>` while
/// nested kept anchors close normally.
fn rewrite_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;
    let mut anchor_kept: Vec<bool> = Vec::new();

    for found in TAG.find_iter(input) {
        out.push_str(&input[cursor..found.start()]);
        cursor = found.end();

        let raw = found.as_str();
        let name = match TAG.captures(raw) {
            Some(captures) => captures[1].to_lowercase(),
            None => continue,
        };
        let closing = raw.starts_with("</");

        match name.as_str() {
            "strong" | "b" => push_tag(&mut out, "b", closing),
            "em" | "i" => push_tag(&mut out, "i", closing),
            "u" | "s" | "code" | "pre" => push_tag(&mut out, &name, closing),
            "a" => {
                if closing {
                    if anchor_kept.pop().unwrap_or(false) {
                        out.push_str("</a>");
                    }
                } else {
                    let href = HREF
                        .captures(raw)
                        .map(|captures| captures[1].to_string())
                        .filter(|href| {
                            href.starts_with("http://") || href.starts_with("https://")
                        });
                    match href {
                        Some(href) => {
                            out.push_str("<a href=\"");
                            out.push_str(&href);
                            out.push_str("\">");
                            anchor_kept.push(true);
                        }
                        None => anchor_kept.push(false),
                    }
                }
            }
            "br" => out.push('\n'),
            _ => {}
        }
    }

    out.push_str(&input[cursor..]);
    out
}

fn push_tag(out: &mut String, tag: &str, closing: bool) {
    if closing {
        out.push_str("</");
    } else {
        out.push('<');
    }
    out.push_str(tag);
    out.push('>');
}

/// Removes empty tag pairs, repeating until nothing changes
///
/// Repetition handles nesting: `<b><i></i></b>` needs two rounds.
fn remove_empty_pairs(mut content: String) -> String {
    loop {
        let before = content.len();
        for tag in ["b", "i", "u", "s", "code", "pre"] {
            let empty = format!("<{tag}></{tag}>");
            content = content.replace(&empty, "");
        }
        content = EMPTY_ANCHOR.replace_all(&content, "").into_owned();
        if content.len() == before {
            break;
        }
    }
    content
}
