//! HTML-to-restricted-markup reduction
//!
//! Messaging surfaces accept only a tiny tag vocabulary: `b`, `i`, `u`,
//! `s`, `code`, `pre`, and `a` with an http(s) href. [`reduce`] turns an
//! arbitrary stored page into that form, with paragraphs separated by a
//! blank line and nothing else carrying structure.
//!
//! Reduction is pure and deterministic, so it runs on the stored raw HTML
//! at every render instead of persisting its output; a rule change takes
//! effect for old records without a re-crawl. The pipeline:
//! 1. Strip script/style/noscript and known decoration classes
//! 2. Prefer section markers (`span.egw_content`); headings go bold
//! 3. Otherwise flatten the whole body's block structure
//! 4. Reduce inline markup to the whitelist
//! 5. Canonicalize: collapse whitespace, drop empties, rewrite stragglers

mod fallback;
mod inline;
mod normalize;
mod sections;

use scraper::Html;

use fallback::reduce_whole_body;
use normalize::normalize;
use sections::extract_sections;

/// Reduces arbitrary HTML to the restricted markup form
///
/// An empty result means the page had no usable text; callers treat that as
/// a "send plain text instead" signal rather than an error.
pub fn reduce(raw_html: &str) -> String {
    let document = Html::parse_document(raw_html);
    let body = match extract_sections(&document) {
        Some(sections) => sections,
        None => reduce_whole_body(&document),
    };
    normalize(&body)
}

/// Removes every tag, leaving plain text
///
/// Fallback for renderers that reject even the reduced markup. Entities the
/// reducer introduced are unescaped since the result is no longer HTML.
pub fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;

    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    const WHITELIST: &[&str] = &["b", "i", "u", "s", "code", "pre", "a"];

    #[test]
    fn test_section_page_reduces_to_clean_markup() {
        let html = r#"<html><body>
            <div class="content">
                <p><span class="egw_content">Hello <strong>World</strong></span></p>
            </div>
        </body></html>"#;
        assert_eq!(reduce(html), "Hello <b>World</b>");
    }

    #[test]
    fn test_reference_code_stays_out_of_bold_heading() {
        let html = r#"<html><body>
            <h3 class="egw_content"><span class="egw_content">1 січня</span><span class="refcode">MB 12</span></h3>
            <p><span class="egw_content">Body</span></p>
        </body></html>"#;
        assert_eq!(reduce(html), "<b>1 січня</b>\n\nBody");
    }

    #[test]
    fn test_plain_page_uses_body_fallback() {
        let html = "<html><body><h2>Title</h2><p>One</p><p>Two</p></body></html>";
        assert_eq!(reduce(html), "Title\n\nOne\n\nTwo");
    }

    #[test]
    fn test_output_contains_only_whitelisted_tags() {
        let html = r#"<html><body>
            <table><tr><td><font color="red">styled</font> text</td></tr></table>
            <p><u>kept</u> and <blink>gone</blink></p>
            <img src="x.png"><iframe src="y"></iframe>
        </body></html>"#;
        let out = reduce(html);
        let tag = Regex::new(r"</?([a-zA-Z]+)").unwrap();
        for captures in tag.captures_iter(&out) {
            assert!(
                WHITELIST.contains(&&captures[1]),
                "disallowed tag <{}> in output: {out}",
                &captures[1]
            );
        }
        assert!(out.contains("<u>kept</u>"));
        assert!(out.contains("gone"));
    }

    #[test]
    fn test_no_triple_newlines_or_double_spaces() {
        let html = r#"<html><body>
            <div><div><p>  spaced   out  </p></div></div>
            <p></p><p></p>
            <p>end</p>
        </body></html>"#;
        let out = reduce(html);
        assert!(!out.contains("\n\n\n"));
        assert!(!out.contains("  "));
        assert_eq!(out, "spaced out\n\nend");
    }

    #[test]
    fn test_deterministic() {
        let html = r#"<div class="content"><p><span class="egw_content">Same <em>every</em> time</span></p></div>"#;
        assert_eq!(reduce(html), reduce(html));
    }

    #[test]
    fn test_empty_input_reduces_to_empty() {
        assert_eq!(reduce(""), "");
        assert_eq!(reduce("<html><body><script>x()</script></body></html>"), "");
    }

    #[test]
    fn test_link_with_web_target_survives() {
        let html = r#"<body><p>See <a href="https://egwwritings.org/p1">the source</a>.</p></body>"#;
        assert_eq!(
            reduce(html),
            r#"See <a href="https://egwwritings.org/p1">the source</a>."#
        );
    }

    #[test]
    fn test_strip_tags_leaves_plain_text() {
        assert_eq!(
            strip_tags("Hello <b>World</b> &amp; <a href=\"https://e.com\">you</a>"),
            "Hello World & you"
        );
    }

    #[test]
    fn test_strip_tags_unescapes_entities() {
        assert_eq!(strip_tags("1 &lt; 2"), "1 < 2");
    }
}
