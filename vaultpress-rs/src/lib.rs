//! Vaultpress - convert an Obsidian-style vault into portable Markdown.
//!
//! # Overview
//!
//! Vaultpress walks a vault and writes a mirrored tree where:
//! - Wikilinks, embeds and local Markdown links are resolved against the vault
//! - `#tags` are removed from bodies and/or harvested into front matter
//! - `%%comments%%` are erased
//! - Titles and aliases are merged into YAML front matter
//! - Non-Markdown files are copied as they are
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vaultpress::{walk, Config, PathIndex, Processor, SkipList, WalkOptions};
//!
//! # async fn run() -> vaultpress::Result<()> {
//! let config = Config {
//!     vault: Some("/path/to/vault".into()),
//!     dest: Some("/path/to/site/content".into()),
//!     convert_links: true,
//!     ..Config::default()
//! };
//! let index = Arc::new(PathIndex::build(config.vault_root()?)?);
//! let skip = Arc::new(SkipList::empty());
//! let processor = Arc::new(Processor::from_config(&config, index, Arc::clone(&skip))?);
//! let summary = walk(WalkOptions::from_config(&config, skip)?, processor).await?;
//! println!("converted {} notes", summary.converted);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod metadata;
pub mod parser;
pub mod processor;
pub mod resolve;
pub mod skiplist;
pub mod walker;

// Re-export main types at crate root
pub use config::Config;
pub use convert::{Conversion, Converter};
pub use error::{Result, VaultError};
pub use processor::{ConvertFile, Processor};
pub use resolve::{PathIndex, Resolve};
pub use skiplist::SkipList;
pub use walker::{walk, WalkOptions, WalkSummary};
