//! The rewrite rules, in their fixed priority order.

use crate::convert::{CommentMode, Converter, LinkMode, Pass, TagMode};
use crate::error::ContentErrorKind;
use crate::parser::scan::{escape, repeat_run};
use crate::parser::{
    code_fence, comment, embed, external_link, heading, inline_code, inline_math, internal_link,
    math_block, tag,
};
use crate::resolve::{render_external, render_internal, render_plain};

/// What a matched rule puts in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Emit {
    /// The consumed span, unchanged.
    Verbatim,
    /// Replacement text, possibly empty.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Step {
    pub advance: usize,
    pub emit: Emit,
}

impl Step {
    fn verbatim(advance: usize) -> Option<Self> {
        (advance > 0).then_some(Step {
            advance,
            emit: Emit::Verbatim,
        })
    }

    fn text(advance: usize, text: String) -> Option<Self> {
        Some(Step {
            advance,
            emit: Emit::Text(text),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rule {
    Escape,
    CodeFence,
    Comment,
    MathBlock,
    ExternalLink,
    InternalLink,
    Embed,
    InlineMath,
    InlineCode,
    Heading,
    HashRun,
    Tag,
}

/// Highest priority first. Code, math and comments come early so their
/// interiors are never rewritten; links come before inline code and math
/// because link text may hold `` ` `` or `$`.
pub(crate) const RULES: [Rule; 12] = [
    Rule::Escape,
    Rule::CodeFence,
    Rule::Comment,
    Rule::MathBlock,
    Rule::ExternalLink,
    Rule::InternalLink,
    Rule::Embed,
    Rule::InlineMath,
    Rule::InlineCode,
    Rule::Heading,
    Rule::HashRun,
    Rule::Tag,
];

impl Rule {
    /// Probe this rule at `pos`. `Ok(None)` means it does not apply here.
    pub(crate) fn apply(
        self,
        converter: &Converter<'_>,
        pass: &mut Pass,
        doc: &[char],
        pos: usize,
    ) -> Result<Option<Step>, ContentErrorKind> {
        let step = match self {
            Rule::Escape => Step::verbatim(escape(doc, pos)),
            Rule::CodeFence => Step::verbatim(code_fence(doc, pos)),
            Rule::MathBlock => Step::verbatim(math_block(doc, pos)),
            Rule::InlineMath => Step::verbatim(inline_math(doc, pos)),
            Rule::InlineCode => Step::verbatim(inline_code(doc, pos)),
            Rule::Comment => {
                let advance = comment(doc, pos);
                match converter.comments {
                    _ if advance == 0 => None,
                    CommentMode::Keep => Step::verbatim(advance),
                    CommentMode::Erase => Step::text(advance, String::new()),
                }
            }
            Rule::ExternalLink => {
                let found = external_link(doc, pos);
                if !found.is_match() {
                    return Ok(None);
                }
                match converter.links {
                    LinkMode::Keep => Step::verbatim(found.advance),
                    LinkMode::Plain => Step::text(found.advance, found.data.display),
                    LinkMode::Convert(resolver) => match render_external(&found.data, resolver)? {
                        Some(text) => Step::text(found.advance, text),
                        None => Step::verbatim(found.advance),
                    },
                }
            }
            Rule::InternalLink | Rule::Embed => {
                let is_embed = self == Rule::Embed;
                let found = if is_embed {
                    embed(doc, pos)
                } else {
                    internal_link(doc, pos)
                };
                if !found.is_match() {
                    return Ok(None);
                }
                match converter.links {
                    LinkMode::Keep => Step::verbatim(found.advance),
                    LinkMode::Plain => match render_plain(&found.data) {
                        Some(text) => Step::text(found.advance, text),
                        None => Step::verbatim(found.advance),
                    },
                    LinkMode::Convert(resolver) => {
                        Step::text(found.advance, render_internal(&found.data, is_embed, resolver)?)
                    }
                }
            }
            Rule::Heading => heading_step(converter, pass, doc, pos),
            Rule::HashRun => {
                let run = repeat_run(doc, pos, "#");
                Step::verbatim(if run > 1 { run } else { 0 })
            }
            Rule::Tag => {
                let found = tag(doc, pos);
                if !found.is_match() {
                    return Ok(None);
                }
                let advance = found.advance;
                match converter.tags {
                    TagMode::Keep => Step::verbatim(advance),
                    TagMode::Remove => Step::text(advance, String::new()),
                    TagMode::Find => {
                        pass.record_tag(found.data);
                        Step::verbatim(advance)
                    }
                    TagMode::FindAndRemove => {
                        pass.record_tag(found.data);
                        Step::text(advance, String::new())
                    }
                }
            }
        };
        Ok(step)
    }
}

/// Level-1 headings: record the first one's text and delete the first one's
/// line. Any other heading is left to the later rules so its text is still
/// rewritten.
fn heading_step(converter: &Converter<'_>, pass: &mut Pass, doc: &[char], pos: usize) -> Option<Step> {
    let wants_title = converter.find_title && pass.title.is_none();
    let wants_removal = converter.remove_first_heading && !pass.heading_removed;
    if !wants_title && !wants_removal {
        return None;
    }
    let found = heading(doc, pos);
    if !found.is_match() || found.data.level != 1 {
        return None;
    }

    if wants_title {
        pass.title = Some(found.data.text);
    }
    if wants_removal {
        pass.heading_removed = true;
        let line_break = usize::from(doc.get(pos + found.advance) == Some(&'\n'));
        return Step::text(found.advance + line_break, String::new());
    }
    // Only the marker is claimed so the heading text still goes through the
    // other rules.
    Step::verbatim(1)
}
