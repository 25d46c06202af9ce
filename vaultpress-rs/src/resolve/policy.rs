//! Resolution policies, each wrapping an inner resolver.

use crate::config::PathRemap;
use crate::error::ContentErrorKind;
use crate::resolve::Resolve;
use crate::skiplist::SkipList;
use std::sync::Arc;

/// Resolves an empty file id (a `[[#section]]` link) to the current file.
pub struct SelfFallback<R> {
    inner: R,
    own_id: String,
}

impl<R: Resolve> SelfFallback<R> {
    pub fn new(inner: R, own_id: impl Into<String>) -> Self {
        Self {
            inner,
            own_id: own_id.into(),
        }
    }
}

impl<R: Resolve> Resolve for SelfFallback<R> {
    fn resolve(&self, file_id: &str) -> Result<Option<String>, ContentErrorKind> {
        if file_id.trim().is_empty() {
            self.inner.resolve(&self.own_id)
        } else {
            self.inner.resolve(file_id)
        }
    }

    fn fragment(&self, fragment: &str) -> String {
        self.inner.fragment(fragment)
    }
}

/// Treats paths on the skip list as missing.
pub struct SkipFilter<R> {
    inner: R,
    skip: Arc<SkipList>,
}

impl<R: Resolve> SkipFilter<R> {
    pub fn new(inner: R, skip: Arc<SkipList>) -> Self {
        Self { inner, skip }
    }
}

impl<R: Resolve> Resolve for SkipFilter<R> {
    fn resolve(&self, file_id: &str) -> Result<Option<String>, ContentErrorKind> {
        Ok(self
            .inner
            .resolve(file_id)?
            .filter(|path| !self.skip.is_skipped(path)))
    }

    fn fragment(&self, fragment: &str) -> String {
        self.inner.fragment(fragment)
    }
}

/// Turns "not found" into an error.
pub struct Strict<R> {
    inner: R,
}

impl<R: Resolve> Strict<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Resolve> Resolve for Strict<R> {
    fn resolve(&self, file_id: &str) -> Result<Option<String>, ContentErrorKind> {
        match self.inner.resolve(file_id)? {
            Some(path) => Ok(Some(path)),
            None => Err(ContentErrorKind::NotFound(file_id.to_string())),
        }
    }

    fn fragment(&self, fragment: &str) -> String {
        self.inner.fragment(fragment)
    }
}

/// Drops a trailing `.md` from resolved paths.
pub struct StripMdSuffix<R> {
    inner: R,
}

impl<R: Resolve> StripMdSuffix<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Resolve> Resolve for StripMdSuffix<R> {
    fn resolve(&self, file_id: &str) -> Result<Option<String>, ContentErrorKind> {
        Ok(self.inner.resolve(file_id)?.map(|path| match path.strip_suffix(".md") {
            Some(stripped) => stripped.to_string(),
            None => path,
        }))
    }

    fn fragment(&self, fragment: &str) -> String {
        self.inner.fragment(fragment)
    }
}

/// Rewrites the first matching path prefix.
pub struct PrefixRemap<R> {
    inner: R,
    remaps: Vec<PathRemap>,
}

impl<R: Resolve> PrefixRemap<R> {
    pub fn new(inner: R, remaps: Vec<PathRemap>) -> Self {
        Self { inner, remaps }
    }
}

impl<R: Resolve> Resolve for PrefixRemap<R> {
    fn resolve(&self, file_id: &str) -> Result<Option<String>, ContentErrorKind> {
        Ok(self.inner.resolve(file_id)?.map(|path| {
            self.remaps
                .iter()
                .find_map(|remap| remap.apply(&path))
                .unwrap_or(path)
        }))
    }

    fn fragment(&self, fragment: &str) -> String {
        self.inner.fragment(fragment)
    }
}

/// Percent-encodes each path segment, keeping the `/` separators, and
/// each fragment.
pub struct PercentEncode<R> {
    inner: R,
}

impl<R: Resolve> PercentEncode<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Resolve> Resolve for PercentEncode<R> {
    fn resolve(&self, file_id: &str) -> Result<Option<String>, ContentErrorKind> {
        Ok(self.inner.resolve(file_id)?.map(|path| {
            path.split('/')
                .map(|segment| urlencoding::encode(segment).into_owned())
                .collect::<Vec<_>>()
                .join("/")
        }))
    }

    fn fragment(&self, fragment: &str) -> String {
        urlencoding::encode(&self.inner.fragment(fragment)).into_owned()
    }
}
