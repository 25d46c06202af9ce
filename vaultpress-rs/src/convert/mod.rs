//! The rewrite pipeline.
//!
//! A [`Converter`] makes a single left-to-right pass over a document. At
//! each position the rules are tried in a fixed priority order and the
//! first one that matches decides what is emitted; when none matches one
//! char is copied through. Variants such as the tag remover or the link
//! converter differ only in how some rules rewrite what they match, so one
//! converter can do several jobs in the same pass.

mod rules;

use crate::error::{ContentErrorKind, Result, VaultError};
use crate::parser::scan::line_at;
use crate::resolve::Resolve;
use rules::{Emit, Step, RULES};

/// What happens to `#tags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagMode {
    #[default]
    Keep,
    Remove,
    /// Record tags, leave the text alone.
    Find,
    FindAndRemove,
}

/// What happens to `%%comments%%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentMode {
    #[default]
    Keep,
    Erase,
}

/// What happens to wikilinks, embeds and Markdown links.
#[derive(Clone, Copy, Default)]
pub enum LinkMode<'r> {
    #[default]
    Keep,
    /// Resolve against the vault and emit Markdown links.
    Convert(&'r dyn Resolve),
    /// Replace each link with the text a reader would see.
    Plain,
}

/// The result of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    pub output: String,
    /// Tags in order of first appearance, without `#`.
    pub tags: Vec<String>,
    /// Text of the first level-1 heading, when asked for.
    pub title: Option<String>,
}

/// Mutable state of a single run.
#[derive(Debug, Default)]
pub(crate) struct Pass {
    tags: Vec<String>,
    title: Option<String>,
    heading_removed: bool,
}

impl Pass {
    fn record_tag(&mut self, tag: String) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct Converter<'r> {
    tags: TagMode,
    comments: CommentMode,
    links: LinkMode<'r>,
    remove_first_heading: bool,
    find_title: bool,
    line_offset: usize,
}

impl<'r> Converter<'r> {
    /// A converter that changes nothing.
    pub fn new() -> Self {
        Self {
            line_offset: 1,
            ..Self::default()
        }
    }

    pub fn tag_remover() -> Self {
        Self::new().tags(TagMode::Remove)
    }

    pub fn tag_finder() -> Self {
        Self::new().tags(TagMode::Find)
    }

    pub fn comment_eraser() -> Self {
        Self::new().comments(CommentMode::Erase)
    }

    pub fn link_converter(resolver: &'r dyn Resolve) -> Self {
        Self::new().links(LinkMode::Convert(resolver))
    }

    /// Links become their text, tags and comments disappear.
    pub fn link_plain() -> Self {
        Self::new()
            .tags(TagMode::Remove)
            .comments(CommentMode::Erase)
            .links(LinkMode::Plain)
    }

    pub fn title_finder() -> Self {
        Self::new().find_title(true)
    }

    pub fn tags(mut self, mode: TagMode) -> Self {
        self.tags = mode;
        self
    }

    pub fn comments(mut self, mode: CommentMode) -> Self {
        self.comments = mode;
        self
    }

    pub fn links(mut self, mode: LinkMode<'r>) -> Self {
        self.links = mode;
        self
    }

    pub fn remove_first_heading(mut self, remove: bool) -> Self {
        self.remove_first_heading = remove;
        self
    }

    pub fn find_title(mut self, find: bool) -> Self {
        self.find_title = find;
        self
    }

    /// Line number of the document's first line, for error reports.
    pub fn line_offset(mut self, line: usize) -> Self {
        self.line_offset = line;
        self
    }

    /// Run the pipeline over `text`.
    pub fn run(&self, text: &str) -> Result<Conversion> {
        let doc: Vec<char> = text.chars().collect();
        let mut pass = Pass::default();
        let mut output = String::with_capacity(text.len());
        let mut pos = 0;

        while pos < doc.len() {
            match self.step(&mut pass, &doc, pos) {
                Ok(Some(step)) => {
                    let next = checked_advance(pos, step.advance)?;
                    match step.emit {
                        Emit::Verbatim => output.extend(&doc[pos..next]),
                        Emit::Text(replacement) => output.push_str(&replacement),
                    }
                    pos = next;
                }
                Ok(None) => {
                    output.push(doc[pos]);
                    pos += 1;
                }
                Err(kind) => {
                    let line = self.line_offset + line_at(&doc, pos) - 1;
                    return Err(VaultError::content(kind, line));
                }
            }
        }

        Ok(Conversion {
            output,
            tags: pass.tags,
            title: pass.title,
        })
    }

    fn step(
        &self,
        pass: &mut Pass,
        doc: &[char],
        pos: usize,
    ) -> std::result::Result<Option<Step>, ContentErrorKind> {
        for rule in RULES {
            if let Some(step) = rule.apply(self, pass, doc, pos)? {
                return Ok(Some(step));
            }
        }
        Ok(None)
    }
}

/// The cursor after a matched rule. A rule that claims nothing would loop
/// forever.
fn checked_advance(pos: usize, advance: usize) -> Result<usize> {
    if advance == 0 {
        return Err(VaultError::PipelineStalled { offset: pos });
    }
    Ok(pos + advance)
}

/// Text of the first level-1 heading as a reader sees it: links reduced to
/// their text, tags and comments gone, whitespace collapsed.
pub fn find_title(body: &str) -> Result<Option<String>> {
    let plain = Converter::link_plain().run(body)?;
    let title = Converter::title_finder().run(&plain.output)?.title;
    Ok(title
        .map(|title| title.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|title| !title.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{build_resolver, IndexResolver, PathIndex, ResolvePolicy};
    use crate::skiplist::SkipList;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const SAMPLE: &str = "# H1 #todo #obsidian\n## H2\n";

    fn vault() -> IndexResolver {
        IndexResolver::new(Arc::new(PathIndex::from_paths(["test.md", "img/cat.png"])))
    }

    #[test]
    fn test_tag_remover() {
        let out = Converter::tag_remover().run(SAMPLE).unwrap();
        assert_eq!(out.output, "# H1  \n## H2\n");
        assert!(out.tags.is_empty());
    }

    #[test]
    fn test_tag_finder_leaves_text_alone() {
        let out = Converter::tag_finder().run(SAMPLE).unwrap();
        assert_eq!(out.output, SAMPLE);
        assert_eq!(out.tags, vec!["todo", "obsidian"]);
    }

    #[test]
    fn test_finder_reports_what_remover_deletes() {
        let doc = "a #one \\#two `#three` #one/sub\n```\n#four\n```\n%%#five%% $#six$ [[x#seven]] #8";
        let found = Converter::tag_finder().run(doc).unwrap();
        assert_eq!(found.output, doc);
        assert_eq!(found.tags, vec!["one", "one/sub", "8"]);

        let removed = Converter::tag_remover().run(doc).unwrap();
        let mut expected = doc.to_string();
        for tag in ["#one/sub", "#one ", "#8"] {
            expected = expected.replacen(tag, if tag.ends_with(' ') { " " } else { "" }, 1);
        }
        assert_eq!(removed.output, expected);
    }

    #[test]
    fn test_combined_find_and_remove() {
        let out = Converter::new()
            .tags(TagMode::FindAndRemove)
            .run("x #a #b #a")
            .unwrap();
        assert_eq!(out.output, "x   ");
        assert_eq!(out.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_decomposed_tags_are_taken_whole() {
        let doc = "x #cafe\u{301}x y";
        let out = Converter::new()
            .tags(TagMode::FindAndRemove)
            .run(doc)
            .unwrap();
        assert_eq!(out.output, "x  y");
        assert_eq!(out.tags, vec!["caf\u{e9}x"]);
    }

    #[test]
    fn test_escapes_are_literal() {
        for doc in [r"\#tag", r"\%%not a comment\%%", r"\[[link]]", r"\`code\`"] {
            assert_eq!(Converter::tag_remover().run(doc).unwrap().output, doc);
            assert_eq!(Converter::comment_eraser().run(doc).unwrap().output, doc);
        }
    }

    #[test]
    fn test_comment_eraser() {
        assert_eq!(Converter::comment_eraser().run("%%x%%%").unwrap().output, "%");
        assert_eq!(
            Converter::comment_eraser()
                .run("keep %%drop #tag%% this\n%%%%\nopen")
                .unwrap()
                .output,
            "keep  this\n"
        );
    }

    #[test]
    fn test_link_converter() {
        let resolver = vault();
        let converter = Converter::link_converter(&resolver);
        assert_eq!(
            converter.run("[[test#section#subsection]]").unwrap().output,
            "[test > section > subsection](test.md#subsection)"
        );
        assert_eq!(converter.run("[[ ]]").unwrap().output, "");
        assert_eq!(converter.run("[[]]").unwrap().output, "[[]]");
        assert_eq!(
            converter.run("see ![[cat.png]] and [t](test)").unwrap().output,
            "see ![cat.png](img/cat.png) and [t](test.md)"
        );
    }

    #[test]
    fn test_links_shield_their_interior() {
        let resolver = vault();
        let out = Converter::link_converter(&resolver)
            .tags(TagMode::Remove)
            .run("[[test|a $x$ #b]] `[[test]]`")
            .unwrap();
        assert_eq!(out.output, "[a $x$ #b](test.md) `[[test]]`");
    }

    #[test]
    fn test_percent_encoded_links_stay_links() {
        let policy = ResolvePolicy {
            percent_encode: true,
            ..ResolvePolicy::default()
        };
        let resolver = build_resolver(
            &policy,
            Arc::new(PathIndex::from_paths(["my note.md"])),
            Arc::new(SkipList::empty()),
            "my note.md",
        );
        let out = Converter::link_converter(resolver.as_ref())
            .run("[[my note#My Section]]")
            .unwrap()
            .output;
        assert_eq!(out, "[my note > My Section](my%20note.md#My%20Section)");

        let doc: Vec<char> = out.chars().collect();
        let rescanned = crate::parser::external_link(&doc, 0);
        assert_eq!(rescanned.advance, doc.len());
        assert_eq!(rescanned.data.href, "my%20note.md#My%20Section");
    }

    #[test]
    fn test_link_plain() {
        let out = Converter::link_plain()
            .run("# My [[Note|title]] #tag [ext](https://x.org) ![[a#b]]")
            .unwrap();
        assert_eq!(out.output, "# My title  ext a > b");
    }

    #[test]
    fn test_content_error_carries_line() {
        let resolver = vault();
        let err = Converter::link_converter(&resolver)
            .line_offset(5)
            .run("ok\n\nbad [[Note #x]]")
            .unwrap_err();
        assert!(err.is_expected());
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn test_remove_first_heading() {
        let out = Converter::new()
            .remove_first_heading(true)
            .run("intro\n## Sub\n# First\n# Second #t\n")
            .unwrap();
        assert_eq!(out.output, "intro\n## Sub\n# Second #t\n");
    }

    #[test]
    fn test_title_finder_records_first_only() {
        let out = Converter::title_finder()
            .run("```\n# Not this\n```\n## Nor this\n# Title #x\n# Later\n")
            .unwrap();
        assert_eq!(out.title.as_deref(), Some("Title #x"));
    }

    #[test]
    fn test_find_title() {
        assert_eq!(
            find_title("%%hidden%%\n# My [[Note|title]] #tag\n").unwrap().as_deref(),
            Some("My title")
        );
        assert_eq!(find_title("no heading\n").unwrap(), None);
        assert_eq!(find_title("# #only-tags\n").unwrap(), None);
    }

    #[test]
    fn test_every_char_is_consumed() {
        let docs = [
            "",
            "\\",
            "#",
            "##",
            "%%",
            "$$",
            "```",
            "[[",
            "![[",
            "[](",
            "$ $",
            "é日本 #タグ",
            "\r\n\r\n",
        ];
        for doc in docs {
            let out = Converter::tag_finder().run(doc).unwrap();
            assert_eq!(out.output, doc);
        }
    }

    #[test]
    fn test_zero_advance_is_a_stall() {
        assert!(matches!(
            checked_advance(3, 0),
            Err(VaultError::PipelineStalled { offset: 3 })
        ));
        assert_eq!(checked_advance(3, 2).unwrap(), 5);
    }
}
