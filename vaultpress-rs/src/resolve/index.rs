//! Vault path index and suffix scoring.

use crate::error::{Result, VaultError};
use glob::{glob, Pattern};
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Every file path under a vault root, `/`-separated and relative to it.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    paths: Vec<String>,
}

impl PathIndex {
    /// List all files under `root`, skipping hidden files and directories.
    pub fn build(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(VaultError::VaultNotFound(root.to_path_buf()));
        }
        let pattern = Path::new(&Pattern::escape(&root.to_string_lossy())).join("**/*");
        let pattern_str = pattern.to_string_lossy();

        let mut paths = Vec::new();
        for entry in glob(&pattern_str)? {
            match entry {
                Ok(path) => {
                    if !path.is_file() {
                        continue;
                    }
                    if let Ok(relative) = path.strip_prefix(root) {
                        let hidden = relative
                            .components()
                            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'));
                        if !hidden {
                            paths.push(to_index_path(relative));
                        }
                    }
                }
                Err(e) => {
                    log::warn!("skipping unreadable path while indexing: {}", e);
                }
            }
        }

        log::debug!("indexed {} files under {}", paths.len(), root.display());
        Ok(Self::from_paths(paths))
    }

    /// Build an index from already-relative paths.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut paths: Vec<String> = paths
            .into_iter()
            .map(|p| p.as_ref().replace('\\', "/").nfc().collect())
            .collect();
        paths.sort();
        paths.dedup();
        Self { paths }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The best-scoring path for `filename`, lexicographically smallest on ties.
    pub fn best_match(&self, filename: &str) -> Option<&str> {
        let target: String = filename.nfc().collect();
        let target = target.trim_start_matches("./").trim_start_matches('/');
        // Paths are sorted, so the first minimum is also the smallest path.
        self.paths
            .iter()
            .filter_map(|path| score(path, target).map(|s| (s, path)))
            .min_by_key(|(s, _)| *s)
            .map(|(_, path)| path.as_str())
    }
}

/// How well `candidate` matches `target` by trailing path components.
///
/// `None` when the candidate is shorter than the target or any trailing
/// component differs. Otherwise the number of leading candidate components
/// left over: 0 is an exact match.
pub fn score(candidate: &str, target: &str) -> Option<usize> {
    let candidate: Vec<&str> = candidate.split('/').collect();
    let target: Vec<&str> = target.split('/').collect();
    if candidate.len() < target.len() {
        return None;
    }
    let matches = candidate
        .iter()
        .rev()
        .zip(target.iter().rev())
        .all(|(c, t)| c == t);
    matches.then(|| candidate.len() - target.len())
}

/// The file name a link identifier refers to: identifiers without an
/// extension are notes.
pub fn target_filename(file_id: &str) -> String {
    if Path::new(file_id).extension().is_some() {
        file_id.to_string()
    } else {
        format!("{}.md", file_id)
    }
}

fn to_index_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_score() {
        assert_eq!(score("test.md", "test.md"), Some(0));
        assert_eq!(score("a/b/test.md", "test.md"), Some(2));
        assert_eq!(score("a/b/test.md", "b/test.md"), Some(1));
        assert_eq!(score("a/c/test.md", "b/test.md"), None);
        assert_eq!(score("test.md", "a/test.md"), None);
        assert_eq!(score("other.md", "test.md"), None);
    }

    #[test]
    fn test_best_match_prefers_shallow() {
        let index = PathIndex::from_paths(["deep/er/note.md", "top/note.md", "note.md"]);
        assert_eq!(index.best_match("note.md"), Some("note.md"));
        assert_eq!(index.best_match("er/note.md"), Some("deep/er/note.md"));
        assert_eq!(index.best_match("missing.md"), None);
    }

    #[test]
    fn test_best_match_breaks_ties_lexicographically() {
        let index = PathIndex::from_paths(["zeta/note.md", "alpha/note.md", "mid/note.md"]);
        for _ in 0..3 {
            assert_eq!(index.best_match("note.md"), Some("alpha/note.md"));
        }
    }

    #[test]
    fn test_best_match_normalizes_unicode() {
        let index = PathIndex::from_paths(["cafe\u{301}.md"]);
        assert_eq!(index.best_match("caf\u{e9}.md"), Some("caf\u{e9}.md"));
    }

    #[test]
    fn test_target_filename() {
        assert_eq!(target_filename("note"), "note.md");
        assert_eq!(target_filename("dir/note"), "dir/note.md");
        assert_eq!(target_filename("image.png"), "image.png");
        assert_eq!(target_filename("note.md"), "note.md");
    }

    #[test]
    fn test_build_skips_hidden() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::create_dir_all(dir.path().join(".obsidian")).unwrap();
        std::fs::write(dir.path().join("a.md"), "").unwrap();
        std::fs::write(dir.path().join("sub/b.png"), "").unwrap();
        std::fs::write(dir.path().join(".obsidian/app.json"), "").unwrap();

        let index = PathIndex::build(dir.path()).unwrap();
        assert_eq!(index.paths(), &["a.md".to_string(), "sub/b.png".to_string()]);
    }
}
