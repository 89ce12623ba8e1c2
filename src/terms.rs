//! Search-term extraction from HTML rule descriptions.
//!
//! Only the document body is read. Its text is decomposed (NFKD) with
//! combining marks dropped, case-folded, reduced to `[a-z0-9]` words, then
//! filtered by length, deduplicated and sorted. The output never depends on
//! the host locale.

use crate::error::{ExportError, Result};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const DEFAULT_MIN_TERM_LENGTH: usize = 4;

/// Elements whose content never reaches the rendered text.
const HIDDEN: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that break words apart when rendered.
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

/// Read `html_path` and return its body terms joined by single spaces.
pub fn extract_terms(html_path: &Path, min_term_length: usize) -> Result<String> {
    let bytes = fs::read(html_path).map_err(|source| ExportError::TermExtraction {
        path: html_path.to_path_buf(),
        source,
    })?;
    let html = String::from_utf8_lossy(&bytes);
    Ok(terms_from_html(&html, min_term_length))
}

/// Terms of an HTML document held in memory.
pub fn terms_from_html(html: &str, min_term_length: usize) -> String {
    terms_from_text(&body_text(html), min_term_length)
}

/// Rendered text of the `<body>` element.
pub fn body_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    let body = Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next());
    if let Some(body) = body {
        collect_text(body, &mut out);
    }
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if HIDDEN.contains(&name) {
                    continue;
                }
                let block = BLOCKS.contains(&name);
                if block {
                    out.push(' ');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Fold `text` to lower-case ASCII words separated by single spaces.
pub fn normalize(text: &str) -> String {
    // lower-casing may emit marks again (`İ` -> `i` + U+0307)
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deduplicated, sorted words of at least `min_term_length` characters.
pub fn terms_from_text(text: &str, min_term_length: usize) -> String {
    let normalized = normalize(text);
    normalized
        .split(' ')
        .filter(|w| !w.is_empty() && w.len() >= min_term_length)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(" ")
}
