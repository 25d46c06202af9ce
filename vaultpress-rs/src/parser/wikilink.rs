//! Wikilink and embed scanning, and parsing of the text between the brackets.

use crate::error::ContentErrorKind;
use crate::parser::scan::{is_escaped, unescaped, Scan};

/// A `[[...]]` link. The extracted data is the trimmed body.
///
/// A body holding a raw line break is not a link, and neither is a pair of
/// brackets with nothing at all between them: `[[]]` stays plain text while
/// `[[ ]]` matches with an empty body.
pub fn internal_link(doc: &[char], pos: usize) -> Scan<String> {
    if !unescaped(doc, pos, "[[") {
        return Scan::miss();
    }
    let start = pos + 2;
    let mut i = start;
    while i < doc.len() {
        match doc[i] {
            '\n' => return Scan::miss(),
            ']' if unescaped(doc, i, "]]") => {
                if i == start {
                    return Scan::miss();
                }
                let body: String = doc[start..i].iter().collect();
                return Scan::new(i + 2 - pos, body.trim().to_string());
            }
            _ => i += 1,
        }
    }
    Scan::miss()
}

/// A `![[...]]` embed: an unescaped `!` in front of an internal link.
pub fn embed(doc: &[char], pos: usize) -> Scan<String> {
    if !unescaped(doc, pos, "!") {
        return Scan::miss();
    }
    let link = internal_link(doc, pos + 1);
    if link.is_match() {
        Scan::new(link.advance + 1, link.data)
    } else {
        Scan::miss()
    }
}

/// The parsed body of a wikilink or embed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkContent {
    /// Bare file identifier, possibly empty for `[[#section]]`.
    pub file_id: String,
    /// `#`-separated sub-section references, in order.
    pub fragments: Vec<String>,
    /// Explicit display name after the first unescaped `|`.
    pub display: Option<String>,
}

impl LinkContent {
    /// The text a reader sees for this link.
    ///
    /// An explicit display name wins. Otherwise the file id and fragments
    /// are joined as a breadcrumb, or just the fragments when there is no
    /// file id.
    pub fn text(&self) -> String {
        if let Some(display) = &self.display {
            return display.clone();
        }
        let mut parts: Vec<&str> = Vec::with_capacity(self.fragments.len() + 1);
        if !self.file_id.is_empty() {
            parts.push(&self.file_id);
        }
        parts.extend(self.fragments.iter().map(String::as_str));
        parts.join(" > ")
    }
}

/// Parse a link body into file id, fragments and display name.
pub fn parse_link_content(body: &str) -> Result<LinkContent, ContentErrorKind> {
    let chars: Vec<char> = body.chars().collect();
    let split = (0..chars.len()).find(|&i| chars[i] == '|' && !is_escaped(&chars, i));

    let (identifier, display) = match split {
        Some(i) => {
            let identifier: String = chars[..i].iter().collect();
            let display: String = chars[i + 1..].iter().collect();
            (identifier, Some(display.trim().to_string()))
        }
        None => (body.to_string(), None),
    };

    let mut parts = identifier.split('#');
    let file_id = parts.next().unwrap_or_default();
    let fragments: Vec<String> = parts
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect();

    if identifier.contains('#') && file_id.ends_with(char::is_whitespace) {
        return Err(ContentErrorKind::SpaceBeforeFragment(body.to_string()));
    }
    let file_id = file_id.trim();
    if file_id.is_empty() && fragments.is_empty() {
        return Err(ContentErrorKind::InvalidLink(body.to_string()));
    }

    Ok(LinkContent {
        file_id: file_id.to_string(),
        fragments,
        display,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(content: &str, pos: usize) -> Scan<String> {
        let doc: Vec<char> = content.chars().collect();
        internal_link(&doc, pos)
    }

    #[test]
    fn test_simple_link() {
        let found = scan("[[My Note]] for details", 0);
        assert_eq!(found.advance, 11);
        assert_eq!(found.data, "My Note");
    }

    #[test]
    fn test_link_body_is_trimmed() {
        let found = scan("[[ spaced |alias ]]", 0);
        assert_eq!(found.data, "spaced |alias");
    }

    #[test]
    fn test_empty_and_blank_bodies() {
        assert!(!scan("[[]]", 0).is_match());
        let blank = scan("[[ ]]", 0);
        assert_eq!(blank.advance, 5);
        assert_eq!(blank.data, "");
    }

    #[test]
    fn test_newline_or_missing_close_is_not_a_link() {
        assert!(!scan("[[a\nb]]", 0).is_match());
        assert!(!scan("[[open", 0).is_match());
        assert!(!scan(r"\[[a]]", 1).is_match());
    }

    #[test]
    fn test_escaped_close_is_skipped() {
        let found = scan(r"[[a\]]b]]", 0);
        assert_eq!(found.data, r"a\]]b");
    }

    #[test]
    fn test_embed() {
        let doc: Vec<char> = "![[image.png]]".chars().collect();
        let found = embed(&doc, 0);
        assert_eq!(found.advance, 14);
        assert_eq!(found.data, "image.png");
        assert!(!embed(&doc, 1).is_match());
    }

    #[test]
    fn test_parse_alias_and_fragments() {
        let content = parse_link_content("Note#Section#Sub|the note").unwrap();
        assert_eq!(content.file_id, "Note");
        assert_eq!(content.fragments, vec!["Section", "Sub"]);
        assert_eq!(content.display.as_deref(), Some("the note"));
        assert_eq!(content.text(), "the note");
    }

    #[test]
    fn test_breadcrumb_text() {
        let content = parse_link_content("test#section#subsection").unwrap();
        assert_eq!(content.text(), "test > section > subsection");

        let local = parse_link_content("#section").unwrap();
        assert_eq!(local.file_id, "");
        assert_eq!(local.text(), "section");
    }

    #[test]
    fn test_escaped_pipe_is_not_a_split() {
        let content = parse_link_content(r"a\|b|c").unwrap();
        assert_eq!(content.file_id, r"a\|b");
        assert_eq!(content.display.as_deref(), Some("c"));
    }

    #[test]
    fn test_space_before_fragment_is_rejected() {
        assert_eq!(
            parse_link_content("Note #Section"),
            Err(ContentErrorKind::SpaceBeforeFragment("Note #Section".to_string()))
        );
    }

    #[test]
    fn test_link_without_target_is_invalid() {
        assert!(matches!(
            parse_link_content("|alias"),
            Err(ContentErrorKind::InvalidLink(_))
        ));
    }
}
