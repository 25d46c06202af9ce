//! Markdown `[display](href)` links.

use crate::parser::scan::{is_blank_break, is_escaped, unescaped, Scan};

/// The two halves of a Markdown link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalLink {
    pub display: String,
    pub href: String,
}

/// A `[display](href)` link. Both halves end at their first unescaped
/// closer and may not cross a blank line; the href may not contain
/// whitespace.
pub fn external_link(doc: &[char], pos: usize) -> Scan<ExternalLink> {
    if !unescaped(doc, pos, "[") {
        return Scan::miss();
    }
    let Some(close) = find_closer(doc, pos + 1, ']') else {
        return Scan::miss();
    };
    if doc.get(close + 1) != Some(&'(') {
        return Scan::miss();
    }
    let href_start = close + 2;
    let Some(end) = find_closer(doc, href_start, ')') else {
        return Scan::miss();
    };

    let href = &doc[href_start..end];
    if href.is_empty() || href.iter().any(|c| c.is_whitespace()) {
        return Scan::miss();
    }

    Scan::new(
        end + 1 - pos,
        ExternalLink {
            display: doc[pos + 1..close].iter().collect(),
            href: href.iter().collect(),
        },
    )
}

fn find_closer(doc: &[char], from: usize, closer: char) -> Option<usize> {
    let mut i = from;
    while i < doc.len() {
        if is_blank_break(doc, i) {
            return None;
        }
        if doc[i] == closer && !is_escaped(doc, i) {
            return Some(i);
        }
        i += 1;
    }
    None
}
