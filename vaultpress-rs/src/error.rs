//! Error types and exit codes for vaultpress.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const CONTENT_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
}

/// Problems with a document's own content.
///
/// These are the "expected" errors: the file is malformed or refers to
/// something that does not exist, as opposed to the tool failing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentErrorKind {
    #[error("invalid link: [[{0}]]")]
    InvalidLink(String),

    #[error("space before fragment in link: [[{0}]]")]
    SpaceBeforeFragment(String),

    #[error("reference not found: {0}")]
    NotFound(String),

    #[error("unexpected href: {0}")]
    UnexpectedHref(String),

    #[error("obsidian URI has no file parameter: {0}")]
    MissingFileParam(String),
}

/// The per-file processing stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    SplitFrontMatter,
    ExaminePublishability,
    ConvertBody,
    PassMetadata,
    ConvertYaml,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Read => "read",
            Stage::SplitFrontMatter => "split front matter",
            Stage::ExaminePublishability => "examine publishability",
            Stage::ConvertBody => "convert body",
            Stage::PassMetadata => "pass metadata",
            Stage::ConvertYaml => "convert yaml",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// Main error type for vaultpress operations.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("line {line}: {kind}")]
    Content { kind: ContentErrorKind, line: usize },

    #[error("{stage} stage failed")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<VaultError>,
    },

    #[error("failed to convert {}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<VaultError>,
    },

    /// A rule claimed a match without consuming input. Always a bug in the
    /// rule set, never in the document.
    #[error("rewrite pipeline did not advance at offset {offset}")]
    PipelineStalled { offset: usize },

    #[error("invalid front matter: {0}")]
    InvalidFrontmatter(String),

    #[error("Vault not found at: {0}")]
    VaultNotFound(PathBuf),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Conversion task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl VaultError {
    pub fn content(kind: ContentErrorKind, line: usize) -> Self {
        VaultError::Content { kind, line }
    }

    /// Wrap this error with the processing stage it escaped from.
    pub fn in_stage(self, stage: Stage) -> Self {
        VaultError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Wrap this error with the source file it belongs to.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        VaultError::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, past any stage or file wrappers.
    pub fn root(&self) -> &VaultError {
        match self {
            VaultError::Stage { source, .. } | VaultError::File { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the failure is a classified content problem rather than an
    /// internal or I/O failure.
    pub fn is_expected(&self) -> bool {
        matches!(self.root(), VaultError::Content { .. })
    }

    /// Source line of the failure, when one is known.
    pub fn line(&self) -> Option<usize> {
        match self.root() {
            VaultError::Content { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// The outermost file path attached to this error.
    pub fn path(&self) -> Option<&Path> {
        match self {
            VaultError::File { path, .. } => Some(path),
            VaultError::Stage { source, .. } => source.path(),
            _ => None,
        }
    }

    /// Render the error for the terminal.
    ///
    /// With `debug` the whole cause chain is printed. Otherwise expected
    /// errors get a short `path: line N: message` diagnostic and everything
    /// else a generic message.
    pub fn report(&self, debug: bool) -> String {
        if debug {
            let mut out = self.to_string();
            let mut source = std::error::Error::source(self);
            while let Some(cause) = source {
                out.push_str("\n  caused by: ");
                out.push_str(&cause.to_string());
                source = cause.source();
            }
            return out;
        }

        let location = match (self.path(), self.line()) {
            (Some(path), Some(line)) => format!("{} (line {})", path.display(), line),
            (Some(path), None) => path.display().to_string(),
            (None, Some(line)) => format!("line {}", line),
            (None, None) => String::new(),
        };

        match self.root() {
            VaultError::Content { kind, line } => match self.path() {
                Some(path) => format!("{}: line {}: {}", path.display(), line, kind),
                None => format!("line {}: {}", line, kind),
            },
            VaultError::ConfigError(_) | VaultError::VaultNotFound(_) => self.root().to_string(),
            _ if location.is_empty() => "failed to convert".to_string(),
            _ => format!("failed to convert {}", location),
        }
    }

    /// Returns the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.root() {
            VaultError::Content { .. } => exit_code::CONTENT_ERROR,
            VaultError::ConfigError(_) | VaultError::VaultNotFound(_) => exit_code::CONFIG_ERROR,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}

/// Result type alias for vaultpress operations.
pub type Result<T> = std::result::Result<T, VaultError>;
