//! Link target resolution.
//!
//! A link identifier is matched against every path in the vault by trailing
//! path components: `[[note]]` finds `note.md` anywhere, `[[b/note]]` only
//! under a `b` directory. The shallowest match wins and ties go to the
//! lexicographically smallest path, so resolution is reproducible.
//!
//! Policies such as strict mode or `.md` stripping wrap a base resolver and
//! are stacked per file by [`build_resolver`].

mod index;
mod link;
pub mod policy;

pub use index::{score, target_filename, PathIndex};
pub use link::{render_external, render_internal, render_plain};

use crate::config::{Config, PathRemap};
use crate::error::{ContentErrorKind, Result};
use crate::skiplist::SkipList;
use policy::{PercentEncode, PrefixRemap, SelfFallback, SkipFilter, Strict, StripMdSuffix};
use std::sync::Arc;

/// Resolves a bare file identifier to the path a link should point at.
pub trait Resolve: Send + Sync {
    /// `Ok(None)` when nothing in the vault matches.
    fn resolve(&self, file_id: &str) -> std::result::Result<Option<String>, ContentErrorKind>;

    /// How a `#fragment` is written after a resolved path.
    fn fragment(&self, fragment: &str) -> String {
        fragment.to_string()
    }
}

impl<R: Resolve + ?Sized> Resolve for Box<R> {
    fn resolve(&self, file_id: &str) -> std::result::Result<Option<String>, ContentErrorKind> {
        (**self).resolve(file_id)
    }

    fn fragment(&self, fragment: &str) -> String {
        (**self).fragment(fragment)
    }
}

/// Base resolver: best suffix match in a [`PathIndex`].
pub struct IndexResolver {
    index: Arc<PathIndex>,
}

impl IndexResolver {
    pub fn new(index: Arc<PathIndex>) -> Self {
        Self { index }
    }
}

impl Resolve for IndexResolver {
    fn resolve(&self, file_id: &str) -> std::result::Result<Option<String>, ContentErrorKind> {
        let file_id = file_id.trim();
        if file_id.is_empty() {
            return Ok(None);
        }
        Ok(self
            .index
            .best_match(&target_filename(file_id))
            .map(str::to_string))
    }
}

/// Which policies wrap the base resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvePolicy {
    pub strict: bool,
    pub strip_md_suffix: bool,
    pub percent_encode: bool,
    pub remaps: Vec<PathRemap>,
}

impl ResolvePolicy {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            strict: config.strict,
            strip_md_suffix: config.strip_md_suffix,
            percent_encode: config.percent_encode,
            remaps: config.remaps()?,
        })
    }
}

/// Stack the configured policies around an index resolver for one file.
///
/// `own_id` is the vault-relative path of the file being converted, used
/// for links that only name a section.
pub fn build_resolver(
    policy: &ResolvePolicy,
    index: Arc<PathIndex>,
    skip: Arc<SkipList>,
    own_id: &str,
) -> Box<dyn Resolve> {
    let mut resolver: Box<dyn Resolve> = Box::new(IndexResolver::new(index));
    if !skip.is_empty() {
        resolver = Box::new(SkipFilter::new(resolver, skip));
    }
    if policy.strict {
        resolver = Box::new(Strict::new(resolver));
    }
    if policy.strip_md_suffix {
        resolver = Box::new(StripMdSuffix::new(resolver));
    }
    if !policy.remaps.is_empty() {
        resolver = Box::new(PrefixRemap::new(resolver, policy.remaps.clone()));
    }
    if policy.percent_encode {
        resolver = Box::new(PercentEncode::new(resolver));
    }
    Box::new(SelfFallback::new(resolver, own_id))
}
