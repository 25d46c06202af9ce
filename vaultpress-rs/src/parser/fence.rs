//! Code fences and `%%` comments.

use crate::parser::scan::{is_escaped, repeat_run, unescaped};

/// A run of three or more backticks and everything up to its closing run.
///
/// If no line break occurs before the first closing run the fence is inline
/// and the closing run must be exactly as long as the opening one. Otherwise
/// it is a block fence and any closing run at least as long will do. An
/// unterminated fence swallows the rest of the document.
pub fn code_fence(doc: &[char], pos: usize) -> usize {
    if !unescaped(doc, pos, "`") {
        return 0;
    }
    let open = repeat_run(doc, pos, "`");
    if open < 3 {
        return 0;
    }

    let mut i = pos + open;
    let mut multiline = false;
    while i < doc.len() {
        match doc[i] {
            '\n' => {
                multiline = true;
                i += 1;
            }
            '`' if !is_escaped(doc, i) => {
                let run = repeat_run(doc, i, "`");
                if run == open || (multiline && run > open) {
                    return i + run - pos;
                }
                i += run;
            }
            _ => i += 1,
        }
    }
    doc.len() - pos
}

/// A `%%` comment. The opening run length sets the minimum closing run;
/// only that many `%` are consumed from the closing run, so surplus `%`
/// stay in the text. An unterminated comment swallows the rest of the
/// document.
pub fn comment(doc: &[char], pos: usize) -> usize {
    if !unescaped(doc, pos, "%%") {
        return 0;
    }
    let open = repeat_run(doc, pos, "%");

    let mut i = pos + open;
    while i < doc.len() {
        if doc[i] == '%' && !is_escaped(doc, i) {
            let run = repeat_run(doc, i, "%");
            if run >= open {
                return i + open - pos;
            }
            i += run;
        } else {
            i += 1;
        }
    }
    doc.len() - pos
}
