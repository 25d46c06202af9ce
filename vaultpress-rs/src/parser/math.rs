//! `$$` math blocks and `$` inline math.

use crate::parser::scan::{
    followed_by, is_blank_break, is_escaped, preceded_by, rest_of_line_blank, unescaped,
};

/// A `$$ ... $$` block.
///
/// A closing `$$` counts when the block sits on one line, or when nothing
/// but whitespace follows it up to the next line break. Without a valid
/// closing the block runs to the end of the document, but only if the
/// document ends in a line break.
pub fn math_block(doc: &[char], pos: usize) -> usize {
    if !unescaped(doc, pos, "$$") {
        return 0;
    }

    let mut i = pos + 2;
    let mut multiline = false;
    while i < doc.len() {
        if doc[i] == '\n' {
            multiline = true;
        } else if unescaped(doc, i, "$$") {
            let end = i + 2;
            if !multiline || rest_of_line_blank(doc, end) {
                return end - pos;
            }
        }
        i += 1;
    }

    if doc.last() == Some(&'\n') {
        doc.len() - pos
    } else {
        0
    }
}

/// A `$ ... $` span. The content may not start or end with a space or tab,
/// may not be empty and may not cross a blank line.
pub fn inline_math(doc: &[char], pos: usize) -> usize {
    if !unescaped(doc, pos, "$") || followed_by(doc, pos + 1, &[" ", "\t"]) {
        return 0;
    }

    let mut i = pos + 1;
    while i < doc.len() {
        if is_blank_break(doc, i) {
            return 0;
        }
        if doc[i] == '$' && !is_escaped(doc, i) {
            if i == pos + 1 {
                return 0;
            }
            if !preceded_by(doc, i, &[" ", "\t"]) {
                return i + 1 - pos;
            }
        }
        i += 1;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_single_line_block() {
        let doc = chars("$$x^2$$ and more");
        assert_eq!(math_block(&doc, 0), 7);
    }

    #[test]
    fn test_multiline_block_needs_blank_rest_of_line() {
        let doc = chars("$$\na$$b\nc$$  \nafter");
        assert_eq!(math_block(&doc, 0), 11);
    }

    #[test]
    fn test_unclosed_block_depends_on_trailing_newline() {
        assert_eq!(math_block(&chars("$$\na\n"), 0), 5);
        assert_eq!(math_block(&chars("$$\na"), 0), 0);
        assert_eq!(math_block(&chars("$$\na$$b"), 0), 0);
    }

    #[test]
    fn test_inline_math() {
        let doc = chars("$a+b$ rest");
        assert_eq!(inline_math(&doc, 0), 5);
    }

    #[test]
    fn test_inline_math_rejects_padding_and_empty() {
        assert_eq!(inline_math(&chars("$ a$"), 0), 0);
        assert_eq!(inline_math(&chars("$$"), 0), 0);
        assert_eq!(inline_math(&chars("$a $ b$"), 0), 7);
        assert_eq!(inline_math(&chars("$5 and $"), 0), 0);
    }

    #[test]
    fn test_inline_math_stops_at_paragraph_break() {
        assert_eq!(inline_math(&chars("$a\n\nb$"), 0), 0);
        assert_eq!(inline_math(&chars("$a\nb$"), 0), 5);
    }

    #[test]
    fn test_escaped_dollar_does_not_close() {
        assert_eq!(inline_math(&chars(r"$a\$b$"), 0), 6);
    }
}
