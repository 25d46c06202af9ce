//! CLI argument definitions using clap.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vaultpress")]
#[command(
    author,
    version,
    about = "Convert an Obsidian vault into portable Markdown",
    long_about = None
)]
pub struct Cli {
    /// Vault root to convert and resolve links against
    #[arg(long)]
    pub vault: Option<PathBuf>,

    /// Destination directory
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Convert only this vault subdirectory
    #[arg(long)]
    pub target: Option<PathBuf>,

    /// File listing vault paths to leave out
    #[arg(long)]
    pub skip_list: Option<PathBuf>,

    /// Path prefix remaps, e.g. "notes>/posts|img>/static/img"
    #[arg(long)]
    pub remap: Option<String>,

    /// Maximum number of files converted at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Delete #tags from note bodies
    #[arg(long)]
    pub remove_tags: bool,

    /// Add body tags to front matter
    #[arg(long)]
    pub copy_tags: bool,

    /// Replace front matter tags with body tags
    #[arg(long)]
    pub sync_tags: bool,

    /// Set a missing title from the first heading
    #[arg(long)]
    pub copy_title: bool,

    /// Add the file name to aliases
    #[arg(long)]
    pub copy_aliases: bool,

    /// Replace title and aliases
    #[arg(long)]
    pub sync_title: bool,

    /// Rewrite wikilinks, embeds and local links as Markdown links
    #[arg(long)]
    pub convert_links: bool,

    /// Delete %%comments%%
    #[arg(long)]
    pub remove_comments: bool,

    /// Only convert notes with `publish: true`
    #[arg(long)]
    pub publishable_only: bool,

    /// Delete the first level-1 heading
    #[arg(long)]
    pub remove_first_heading: bool,

    /// Fail on links that do not resolve
    #[arg(long)]
    pub strict: bool,

    /// Drop `.md` from link targets
    #[arg(long)]
    pub strip_md_suffix: bool,

    /// Percent-encode link targets
    #[arg(long)]
    pub percent_encode: bool,

    /// Show full error chains
    #[arg(long)]
    pub debug: bool,

    /// Increase log verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Override config values with the flags given on the command line.
    /// Flags only ever switch toggles on.
    pub fn apply(&self, config: &mut Config) {
        if let Some(vault) = &self.vault {
            config.vault = Some(vault.clone());
        }
        if let Some(dest) = &self.dest {
            config.dest = Some(dest.clone());
        }
        if let Some(target) = &self.target {
            config.target = Some(target.clone());
        }
        if let Some(skip_list) = &self.skip_list {
            config.skip_list = Some(skip_list.clone());
        }
        if let Some(remap) = &self.remap {
            config.remap = Some(remap.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }

        config.remove_tags |= self.remove_tags;
        config.copy_tags |= self.copy_tags;
        config.sync_tags |= self.sync_tags;
        config.copy_title |= self.copy_title;
        config.copy_aliases |= self.copy_aliases;
        config.sync_title |= self.sync_title;
        config.convert_links |= self.convert_links;
        config.remove_comments |= self.remove_comments;
        config.publishable_only |= self.publishable_only;
        config.remove_first_heading |= self.remove_first_heading;
        config.strict |= self.strict;
        config.strip_md_suffix |= self.strip_md_suffix;
        config.percent_encode |= self.percent_encode;
    }

    /// Default log filter for env_logger.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
