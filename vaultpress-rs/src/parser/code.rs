//! Inline code spans.

use crate::parser::scan::{is_blank_break, repeat_run, unescaped};

/// A backtick-delimited code span. The closing run must match the opening
/// run's length, and the span may not cross a blank line.
pub fn inline_code(doc: &[char], pos: usize) -> usize {
    if !unescaped(doc, pos, "`") {
        return 0;
    }
    let open = repeat_run(doc, pos, "`");

    let mut i = pos + open;
    while i < doc.len() {
        if is_blank_break(doc, i) {
            return 0;
        }
        if doc[i] == '`' {
            let run = repeat_run(doc, i, "`");
            if run == open {
                return i + run - pos;
            }
            i += run;
        } else {
            i += 1;
        }
    }
    0
}
