//! Conversion settings.
//!
//! Settings come from an optional TOML file and are then overridden by
//! command line flags. Every toggle defaults to off.

use crate::error::{Result, VaultError};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Default number of files converted at the same time.
pub const DEFAULT_CONCURRENCY: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vault root: conversion input and link resolution universe.
    pub vault: Option<PathBuf>,
    /// Destination root mirroring the vault layout.
    pub dest: Option<PathBuf>,
    /// Vault-relative subdirectory to convert instead of the whole vault.
    pub target: Option<PathBuf>,
    /// File listing vault-relative paths to leave out.
    pub skip_list: Option<PathBuf>,
    /// Path prefix remaps, `"<old>><new>|<old2>><new2>"`.
    pub remap: Option<String>,

    pub remove_tags: bool,
    pub copy_tags: bool,
    pub sync_tags: bool,
    pub copy_title: bool,
    pub copy_aliases: bool,
    pub sync_title: bool,
    pub convert_links: bool,
    pub remove_comments: bool,
    pub publishable_only: bool,
    pub remove_first_heading: bool,
    /// Fail on unresolved links instead of degrading them to text.
    pub strict: bool,
    pub strip_md_suffix: bool,
    pub percent_encode: bool,

    pub concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault: None,
            dest: None,
            target: None,
            skip_list: None,
            remap: None,
            remove_tags: false,
            copy_tags: false,
            sync_tags: false,
            copy_title: false,
            copy_aliases: false,
            sync_title: false,
            convert_links: false,
            remove_comments: false,
            publishable_only: false,
            remove_first_heading: false,
            strict: false,
            strip_md_suffix: false,
            percent_encode: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Config {
    /// Location of the user config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vaultpress").join("config.toml"))
    }

    /// Read a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Read the user config file, or fall back to defaults when there is none.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn vault_root(&self) -> Result<&Path> {
        self.vault
            .as_deref()
            .ok_or_else(|| VaultError::ConfigError("no vault given".to_string()))
    }

    pub fn dest_root(&self) -> Result<&Path> {
        self.dest
            .as_deref()
            .ok_or_else(|| VaultError::ConfigError("no destination given".to_string()))
    }

    /// Whether the first level-1 heading has to be found.
    pub fn needs_title(&self) -> bool {
        self.copy_title || self.sync_title
    }

    /// Whether body tags have to be collected.
    pub fn needs_tags(&self) -> bool {
        self.copy_tags || self.sync_tags
    }

    /// Parsed path prefix remaps, in declaration order.
    pub fn remaps(&self) -> Result<Vec<PathRemap>> {
        match &self.remap {
            Some(table) => parse_remaps(table),
            None => Ok(Vec::new()),
        }
    }

    /// Check that the settings describe a runnable conversion.
    pub fn validate(&self) -> Result<()> {
        let vault = self.vault_root()?;
        if !vault.is_dir() {
            return Err(VaultError::VaultNotFound(vault.to_path_buf()));
        }
        self.dest_root()?;

        if let Some(target) = &self.target {
            let escapes = target
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(VaultError::ConfigError(format!(
                    "target must be a path inside the vault: {}",
                    target.display()
                )));
            }
            if !vault.join(target).is_dir() {
                return Err(VaultError::ConfigError(format!(
                    "target is not a directory in the vault: {}",
                    target.display()
                )));
            }
        }

        if self.concurrency == 0 {
            return Err(VaultError::ConfigError(
                "concurrency must be at least 1".to_string(),
            ));
        }

        self.remaps()?;
        Ok(())
    }
}

/// Replace a leading path prefix with another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRemap {
    pub from: String,
    pub to: String,
}

impl PathRemap {
    /// Apply the remap if `path` starts with its prefix.
    pub fn apply(&self, path: &str) -> Option<String> {
        path.strip_prefix(self.from.as_str())
            .map(|rest| format!("{}{}", self.to, rest))
    }
}

/// Parse `"<old>><new>|<old2>><new2>"`.
pub fn parse_remaps(table: &str) -> Result<Vec<PathRemap>> {
    table.split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (from, to) = segment.split_once('>').ok_or_else(|| {
                VaultError::ConfigError(format!("remap needs the form <old>><new>: {}", segment))
            })?;
            Ok(PathRemap {
                from: from.to_string(),
                to: to.to_string(),
            })
        })
        .collect()
}
