//! Per-file conversion.
//!
//! Each Markdown file goes through the same stages in order:
//! read, split front matter, examine publishability, convert the body,
//! pass harvested metadata on, convert the front matter, write. Any stage
//! failing stops the rest, and nothing is written until every stage has
//! succeeded.

use crate::config::Config;
use crate::convert::{find_title, CommentMode, Converter, LinkMode, TagMode};
use crate::error::{Result, Stage, VaultError};
use crate::metadata::{self, FrontMatterUpdate};
use crate::parser::{parse_frontmatter, render_document, split_frontmatter};
use crate::resolve::{build_resolver, PathIndex, ResolvePolicy};
use crate::skiplist::SkipList;
use serde_yaml::Mapping;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a document sits, for resolution and error reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContext {
    /// `/`-separated path relative to the vault root.
    pub vault_path: String,
    /// Line number at which the body starts in the source file.
    pub line_offset: usize,
}

impl FileContext {
    /// File name without extension, used as the note's alias and fallback
    /// title.
    pub fn stem(&self) -> String {
        Path::new(&self.vault_path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// What the body conversion produced and found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    pub body: String,
    pub tags: Vec<String>,
    pub title: Option<String>,
}

/// Decides from front matter whether a note is converted at all.
pub trait Examinator: Send + Sync {
    fn publishable(&self, front_matter: &Mapping) -> Result<bool>;
}

/// Rewrites a note body and harvests metadata from it.
pub trait BodyConverter: Send + Sync {
    fn convert_body(&self, body: &str, ctx: &FileContext) -> Result<Harvest>;
}

/// Turns harvested values into a front matter update.
pub trait ArgPasser: Send + Sync {
    fn pass(&self, harvest: &Harvest, ctx: &FileContext) -> Result<FrontMatterUpdate>;
}

/// Applies a front matter update.
pub trait YamlConverter: Send + Sync {
    fn convert_yaml(&self, front_matter: &mut Mapping, update: &FrontMatterUpdate) -> Result<()>;
}

/// Accepts everything, or only `publish: true` notes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishFilter {
    pub publishable_only: bool,
}

impl Examinator for PublishFilter {
    fn publishable(&self, front_matter: &Mapping) -> Result<bool> {
        if !self.publishable_only {
            return Ok(true);
        }
        metadata::is_publishable(front_matter)
    }
}

/// Body conversion against a vault index.
pub struct VaultBodyConverter {
    index: Arc<PathIndex>,
    skip: Arc<SkipList>,
    policy: ResolvePolicy,
    tags: TagMode,
    comments: CommentMode,
    convert_links: bool,
    remove_first_heading: bool,
    find_title: bool,
}

impl VaultBodyConverter {
    pub fn from_config(config: &Config, index: Arc<PathIndex>, skip: Arc<SkipList>) -> Result<Self> {
        let tags = match (config.remove_tags, config.needs_tags()) {
            (true, true) => TagMode::FindAndRemove,
            (true, false) => TagMode::Remove,
            (false, true) => TagMode::Find,
            (false, false) => TagMode::Keep,
        };
        let comments = if config.remove_comments {
            CommentMode::Erase
        } else {
            CommentMode::Keep
        };
        Ok(Self {
            index,
            skip,
            policy: ResolvePolicy::from_config(config)?,
            tags,
            comments,
            convert_links: config.convert_links,
            remove_first_heading: config.remove_first_heading,
            find_title: config.needs_title(),
        })
    }
}

impl BodyConverter for VaultBodyConverter {
    fn convert_body(&self, body: &str, ctx: &FileContext) -> Result<Harvest> {
        let resolver = build_resolver(
            &self.policy,
            Arc::clone(&self.index),
            Arc::clone(&self.skip),
            &ctx.vault_path,
        );
        let links = if self.convert_links {
            LinkMode::Convert(&*resolver)
        } else {
            LinkMode::Keep
        };

        let title = if self.find_title {
            find_title(body)?
        } else {
            None
        };
        let conversion = Converter::new()
            .tags(self.tags)
            .comments(self.comments)
            .links(links)
            .remove_first_heading(self.remove_first_heading)
            .line_offset(ctx.line_offset)
            .run(body)?;

        Ok(Harvest {
            body: conversion.output,
            tags: conversion.tags,
            title,
        })
    }
}

/// Picks which harvested values reach the front matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigArgPasser {
    pub copy_tags: bool,
    pub sync_tags: bool,
    pub copy_title: bool,
    pub copy_aliases: bool,
    pub sync_title: bool,
}

impl ConfigArgPasser {
    pub fn from_config(config: &Config) -> Self {
        Self {
            copy_tags: config.copy_tags,
            sync_tags: config.sync_tags,
            copy_title: config.copy_title,
            copy_aliases: config.copy_aliases,
            sync_title: config.sync_title,
        }
    }
}

impl ArgPasser for ConfigArgPasser {
    fn pass(&self, harvest: &Harvest, ctx: &FileContext) -> Result<FrontMatterUpdate> {
        let title = (self.copy_title || self.sync_title)
            .then(|| harvest.title.clone().unwrap_or_else(|| ctx.stem()));
        let aliases = if self.copy_aliases || self.sync_title {
            vec![ctx.stem()]
        } else {
            Vec::new()
        };
        let tags = (self.copy_tags || self.sync_tags).then(|| harvest.tags.clone());

        Ok(FrontMatterUpdate {
            title,
            sync_title: self.sync_title,
            aliases,
            tags,
            sync_tags: self.sync_tags,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrontMatterMerger;

impl YamlConverter for FrontMatterMerger {
    fn convert_yaml(&self, front_matter: &mut Mapping, update: &FrontMatterUpdate) -> Result<()> {
        metadata::merge(front_matter, update);
        Ok(())
    }
}

/// One Markdown file to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub source: PathBuf,
    pub dest: PathBuf,
    /// `/`-separated source path relative to the vault root.
    pub vault_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Converted,
    /// Rejected by the publishability check; nothing was written.
    Skipped,
}

/// Converts a single file. Implemented by [`Processor`]; the walker only
/// depends on this.
pub trait ConvertFile: Send + Sync {
    fn convert_file(&self, job: &FileJob) -> Result<Outcome>;
}

/// The staged per-file pipeline.
pub struct Processor<
    E = PublishFilter,
    B = VaultBodyConverter,
    A = ConfigArgPasser,
    Y = FrontMatterMerger,
> {
    examinator: E,
    body: B,
    args: A,
    yaml: Y,
}

impl Processor {
    pub fn from_config(config: &Config, index: Arc<PathIndex>, skip: Arc<SkipList>) -> Result<Self> {
        Ok(Processor::new(
            PublishFilter {
                publishable_only: config.publishable_only,
            },
            VaultBodyConverter::from_config(config, index, skip)?,
            ConfigArgPasser::from_config(config),
            FrontMatterMerger,
        ))
    }
}

impl<E, B, A, Y> Processor<E, B, A, Y>
where
    E: Examinator,
    B: BodyConverter,
    A: ArgPasser,
    Y: YamlConverter,
{
    pub fn new(examinator: E, body: B, args: A, yaml: Y) -> Self {
        Self {
            examinator,
            body,
            args,
            yaml,
        }
    }

    /// Convert a whole document. `Ok(None)` when it is not publishable.
    pub fn convert_document(&self, text: &str, vault_path: &str) -> Result<Option<String>> {
        let split = split_frontmatter(text);
        let mut front_matter = match split.yaml {
            Some(yaml) => {
                parse_frontmatter(yaml).map_err(|e| e.in_stage(Stage::SplitFrontMatter))?
            }
            None => Mapping::new(),
        };

        let publishable = self
            .examinator
            .publishable(&front_matter)
            .map_err(|e| e.in_stage(Stage::ExaminePublishability))?;
        if !publishable {
            return Ok(None);
        }

        let ctx = FileContext {
            vault_path: vault_path.to_string(),
            line_offset: split.content_start_line,
        };
        let harvest = self
            .body
            .convert_body(split.content, &ctx)
            .map_err(|e| e.in_stage(Stage::ConvertBody))?;

        let update = self
            .args
            .pass(&harvest, &ctx)
            .map_err(|e| e.in_stage(Stage::PassMetadata))?;
        self.yaml
            .convert_yaml(&mut front_matter, &update)
            .map_err(|e| e.in_stage(Stage::ConvertYaml))?;

        render_document(&front_matter, &harvest.body)
            .map(Some)
            .map_err(|e| e.in_stage(Stage::ConvertYaml))
    }
}

impl<E, B, A, Y> ConvertFile for Processor<E, B, A, Y>
where
    E: Examinator,
    B: BodyConverter,
    A: ArgPasser,
    Y: YamlConverter,
{
    fn convert_file(&self, job: &FileJob) -> Result<Outcome> {
        let text = fs::read_to_string(&job.source).map_err(|e| VaultError::from(e).in_stage(Stage::Read))?;

        match self.convert_document(&text, &job.vault_path)? {
            Some(output) => {
                write_atomic(&job.dest, &output).map_err(|e| e.in_stage(Stage::Write))?;
                Ok(Outcome::Converted)
            }
            None => {
                log::info!("skipping unpublishable note {}", job.vault_path);
                Ok(Outcome::Skipped)
            }
        }
    }
}

/// Write through a temporary sibling so `path` is never left half written.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", name));

    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn processor(config: &Config, paths: &[&str]) -> Processor {
        Processor::from_config(
            config,
            Arc::new(PathIndex::from_paths(paths.iter().copied())),
            Arc::new(SkipList::empty()),
        )
        .unwrap()
    }

    #[test]
    fn test_full_conversion() {
        let config = Config {
            remove_tags: true,
            copy_tags: true,
            copy_title: true,
            copy_aliases: true,
            convert_links: true,
            remove_comments: true,
            ..Config::default()
        };
        let p = processor(&config, &["notes/my-note.md", "other.md"]);
        let input = "---\ntags: [old]\n---\n# Hello [[other|World]] #greet\nText %%secret%%#end\n";

        let output = p.convert_document(input, "notes/my-note.md").unwrap().unwrap();
        assert_eq!(
            output,
            "---\ntags:\n- old\n- greet\n- end\ntitle: Hello World\naliases:\n- my-note\n---\n# Hello [World](other.md) \nText \n"
        );
    }

    #[test]
    fn test_front_matter_is_always_written() {
        let p = processor(&Config::default(), &[]);
        assert_eq!(
            p.convert_document("plain body\n", "a.md").unwrap().as_deref(),
            Some("---\n---\nplain body\n")
        );
    }

    #[test]
    fn test_title_falls_back_to_stem() {
        let config = Config {
            copy_title: true,
            ..Config::default()
        };
        let p = processor(&config, &[]);
        let output = p.convert_document("no heading\n", "dir/Some Note.md").unwrap().unwrap();
        assert_eq!(output, "---\ntitle: Some Note\n---\nno heading\n");
    }

    #[test]
    fn test_unpublishable_is_skipped() {
        let config = Config {
            publishable_only: true,
            ..Config::default()
        };
        let p = processor(&config, &[]);
        assert_eq!(p.convert_document("---\ndraft: true\n---\nx", "a.md").unwrap(), None);
        assert!(p
            .convert_document("---\npublish: true\n---\nx", "a.md")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_errors_carry_stage_and_line() {
        let config = Config {
            convert_links: true,
            strict: true,
            ..Config::default()
        };
        let p = processor(&config, &["a.md"]);
        let err = p
            .convert_document("---\ntitle: t\n---\nline four\n[[missing]]\n", "a.md")
            .unwrap_err();
        assert!(matches!(
            err,
            VaultError::Stage {
                stage: Stage::ConvertBody,
                ..
            }
        ));
        assert_eq!(err.line(), Some(5));

        let err = p.convert_document("---\n- a\n---\nbody", "a.md").unwrap_err();
        assert!(matches!(
            err,
            VaultError::Stage {
                stage: Stage::SplitFrontMatter,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_publish_value_fails_examination() {
        let config = Config {
            publishable_only: true,
            ..Config::default()
        };
        let p = processor(&config, &[]);
        let err = p
            .convert_document("---\npublish: sometimes\n---\nx", "a.md")
            .unwrap_err();
        assert!(matches!(
            err,
            VaultError::Stage {
                stage: Stage::ExaminePublishability,
                ..
            }
        ));
        assert!(err.report(true).contains("examine publishability stage failed"));
    }

    struct RejectingPasser;

    impl ArgPasser for RejectingPasser {
        fn pass(&self, _harvest: &Harvest, ctx: &FileContext) -> Result<FrontMatterUpdate> {
            Err(VaultError::InvalidFrontmatter(format!("no metadata for {}", ctx.vault_path)))
        }
    }

    #[test]
    fn test_pass_metadata_failure_is_staged() {
        let config = Config::default();
        let p = Processor::new(
            PublishFilter::default(),
            VaultBodyConverter::from_config(
                &config,
                Arc::new(PathIndex::from_paths(["a.md"])),
                Arc::new(SkipList::empty()),
            )
            .unwrap(),
            RejectingPasser,
            FrontMatterMerger,
        );
        let err = p.convert_document("body\n", "a.md").unwrap_err();
        assert!(matches!(
            err,
            VaultError::Stage {
                stage: Stage::PassMetadata,
                ..
            }
        ));
    }

    #[test]
    fn test_failed_conversion_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("bad.md");
        let dest = dir.path().join("out/bad.md");
        fs::write(&source, "[[Note #frag]]").unwrap();

        let config = Config {
            convert_links: true,
            ..Config::default()
        };
        let p = processor(&config, &["bad.md"]);
        let job = FileJob {
            source,
            dest: dest.clone(),
            vault_path: "bad.md".into(),
        };
        assert!(p.convert_file(&job).is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn test_convert_file_writes_output() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.md");
        let dest = dir.path().join("out/nested/a.md");
        fs::write(&source, "body #t\n").unwrap();

        let config = Config {
            remove_tags: true,
            ..Config::default()
        };
        let p = processor(&config, &["a.md"]);
        let job = FileJob {
            source,
            dest: dest.clone(),
            vault_path: "a.md".into(),
        };
        assert_eq!(p.convert_file(&job).unwrap(), Outcome::Converted);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "---\n---\nbody \n");
        assert!(!dest.with_file_name(".a.md.tmp").exists());
    }
}
