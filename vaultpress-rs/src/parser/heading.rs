//! ATX heading scanning.

use crate::parser::scan::{at_line_start, repeat_run, unescaped, Scan};

/// A heading found at a position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heading {
    /// Number of leading `#`.
    pub level: usize,
    /// Heading text, trimmed.
    pub text: String,
}

/// A run of `#` preceded only by indentation on its line and followed by a
/// space, tab or line break. The claimed span ends before the line break.
pub fn heading(doc: &[char], pos: usize) -> Scan<Heading> {
    if !unescaped(doc, pos, "#") || !at_line_start(doc, pos) {
        return Scan::miss();
    }
    let level = repeat_run(doc, pos, "#");
    let after = pos + level;
    match doc.get(after) {
        None | Some(' ') | Some('\t') | Some('\n') | Some('\r') => {}
        _ => return Scan::miss(),
    }

    let eol = after + doc[after..].iter().take_while(|&&c| c != '\n').count();
    let text: String = doc[after..eol].iter().collect();
    Scan::new(
        eol - pos,
        Heading {
            level,
            text: text.trim().to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(content: &str, pos: usize) -> Scan<Heading> {
        let doc: Vec<char> = content.chars().collect();
        heading(&doc, pos)
    }

    #[test]
    fn test_level_one_heading() {
        let found = scan("# Title  \nbody", 0);
        assert_eq!(found.advance, 9);
        assert_eq!(found.data.level, 1);
        assert_eq!(found.data.text, "Title");
    }

    #[test]
    fn test_nested_level_and_indent() {
        let found = scan("text\n  ### Deep\n", 7);
        assert_eq!(found.data.level, 3);
        assert_eq!(found.data.text, "Deep");
    }

    #[test]
    fn test_empty_heading_at_end() {
        let found = scan("##", 0);
        assert_eq!(found.advance, 2);
        assert_eq!(found.data.text, "");
    }

    #[test]
    fn test_not_a_heading() {
        assert!(!scan("#tag", 0).is_match());
        assert!(!scan("a # b", 2).is_match());
        assert!(!scan(r"\# b", 1).is_match());
    }
}
