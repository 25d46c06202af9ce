//! Tag scanning (#tag and #tag/subtag).

use crate::parser::scan::{unescaped, Scan};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// An unescaped `#` directly followed by a letter, digit or underscore.
/// The tag continues through letters, digits, combining marks, `-`, `_`
/// and `/`.
///
/// The extracted data is the tag name without its `#`, in NFC.
pub fn tag(doc: &[char], pos: usize) -> Scan<String> {
    if !unescaped(doc, pos, "#") {
        return Scan::miss();
    }
    match doc.get(pos + 1) {
        Some(&c) if is_tag_start(c) => {}
        _ => return Scan::miss(),
    }

    let end = pos + 1 + doc[pos + 1..].iter().take_while(|&&c| is_tag_char(c)).count();
    Scan::new(end - pos, doc[pos + 1..end].iter().copied().nfc().collect())
}

fn is_tag_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || is_combining_mark(c) || matches!(c, '-' | '_' | '/')
}
