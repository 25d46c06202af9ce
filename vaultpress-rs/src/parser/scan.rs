//! Position probes shared by every rule.
//!
//! A document is a slice of `char`s so that a cursor never lands inside a
//! multi-byte sequence. Every probe takes `(doc, pos)` and reports how many
//! chars it claims starting at `pos`; zero means "no match here".

/// Outcome of probing a rule at one position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scan<T = ()> {
    /// Number of chars claimed, starting at the probed position.
    pub advance: usize,
    /// Whatever the probe extracted from the claimed span.
    pub data: T,
}

impl<T: Default> Scan<T> {
    pub fn miss() -> Self {
        Self {
            advance: 0,
            data: T::default(),
        }
    }
}

impl<T> Scan<T> {
    pub fn new(advance: usize, data: T) -> Self {
        Self { advance, data }
    }

    pub fn is_match(&self) -> bool {
        self.advance > 0
    }
}

/// True if `lit` occurs at `pos`.
pub fn starts_with(doc: &[char], pos: usize, lit: &str) -> bool {
    let mut i = pos;
    for c in lit.chars() {
        if doc.get(i) != Some(&c) {
            return false;
        }
        i += 1;
    }
    true
}

/// True if the char at `pos` is preceded by an odd run of backslashes.
pub fn is_escaped(doc: &[char], pos: usize) -> bool {
    let end = pos.min(doc.len());
    doc[..end].iter().rev().take_while(|&&c| c == '\\').count() % 2 == 1
}

/// True if `lit` occurs at `pos` and is not itself escaped.
pub fn unescaped(doc: &[char], pos: usize, lit: &str) -> bool {
    starts_with(doc, pos, lit) && !is_escaped(doc, pos)
}

/// True if any candidate ends right before `pos`.
pub fn preceded_by(doc: &[char], pos: usize, candidates: &[&str]) -> bool {
    candidates.iter().any(|candidate| {
        let len = candidate.chars().count();
        len <= pos && starts_with(doc, pos - len, candidate)
    })
}

/// True if any candidate starts at `pos`.
pub fn followed_by(doc: &[char], pos: usize, candidates: &[&str]) -> bool {
    candidates.iter().any(|candidate| starts_with(doc, pos, candidate))
}

/// A backslash and the char after it, taken together as literal text.
pub fn escape(doc: &[char], pos: usize) -> usize {
    if doc.get(pos) == Some(&'\\') && pos + 1 < doc.len() {
        2
    } else {
        0
    }
}

/// Number of back-to-back repetitions of `unit` starting at `pos`.
pub fn repeat_run(doc: &[char], pos: usize, unit: &str) -> usize {
    let width = unit.chars().count();
    if width == 0 {
        return 0;
    }
    let mut count = 0;
    while starts_with(doc, pos + count * width, unit) {
        count += 1;
    }
    count
}

/// True if a blank line (paragraph break) starts at `pos`.
pub fn is_blank_break(doc: &[char], pos: usize) -> bool {
    followed_by(doc, pos, &["\n\n", "\r\n\r\n"])
}

/// True if only whitespace sits between `pos` and the preceding line break.
pub fn at_line_start(doc: &[char], pos: usize) -> bool {
    doc[..pos.min(doc.len())]
        .iter()
        .rev()
        .take_while(|&&c| c != '\n')
        .all(|c| c.is_whitespace())
}

/// True if only whitespace sits between `pos` and the next line break.
pub fn rest_of_line_blank(doc: &[char], pos: usize) -> bool {
    doc.get(pos..)
        .unwrap_or_default()
        .iter()
        .take_while(|&&c| c != '\n')
        .all(|c| c.is_whitespace())
}

/// 1-indexed line number of `pos`.
pub fn line_at(doc: &[char], pos: usize) -> usize {
    doc[..pos.min(doc.len())].iter().filter(|&&c| c == '\n').count() + 1
}
