//! Paths excluded from conversion.
//!
//! The skip list is a plain text file with one vault-relative path per line.
//! A listed directory excludes everything beneath it.

use crate::error::Result;
use std::collections::HashSet;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Default)]
pub struct SkipList {
    entries: HashSet<String>,
}

impl SkipList {
    /// A skip list that excludes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read a skip list file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Build a skip list from newline-delimited paths.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map(normalize)
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `relative` or any of its ancestors is listed.
    pub fn is_skipped(&self, relative: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let relative = normalize(relative);
        let mut prefix = String::with_capacity(relative.len());
        for component in relative.split('/') {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(component);
            if self.entries.contains(&prefix) {
                return true;
            }
        }
        false
    }
}

fn normalize(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    let path = path.trim_start_matches("./").trim_matches('/');
    path.nfc().collect()
}
