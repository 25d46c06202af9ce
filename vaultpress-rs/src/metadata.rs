//! Front matter merging.
//!
//! Values harvested from a note body (title, tags) and from its file name
//! (aliases) are merged into whatever front matter the note already has:
//! ```yaml
//! title: Existing title      # kept unless syncing
//! aliases: [old, my-note]    # file stem appended once
//! tags: [rust, cli]          # body tags appended once
//! draft: false               # derived from publish
//! ```

use crate::error::{Result, VaultError};
use serde_yaml::{Mapping, Value};

const TITLE: &str = "title";
const ALIASES: &str = "aliases";
const TAGS: &str = "tags";
const DRAFT: &str = "draft";
const PUBLISH: &str = "publish";

/// Everything to merge into one note's front matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatterUpdate {
    pub title: Option<String>,
    /// Replace an existing title and aliases instead of keeping them.
    pub sync_title: bool,
    pub aliases: Vec<String>,
    /// `None` leaves `tags` untouched.
    pub tags: Option<Vec<String>>,
    /// Replace existing tags instead of appending to them.
    pub sync_tags: bool,
}

/// Merge `update` into `map`.
pub fn merge(map: &mut Mapping, update: &FrontMatterUpdate) {
    if let Some(title) = &update.title {
        if update.sync_title || !map.contains_key(TITLE) {
            map.insert(TITLE.into(), Value::String(title.clone()));
        }
    }

    if update.sync_title || !update.aliases.is_empty() {
        let existing = if update.sync_title {
            Vec::new()
        } else {
            string_list(map.get(ALIASES))
        };
        let aliases = dedup(existing.into_iter().chain(update.aliases.iter().cloned()));
        set_list(map, ALIASES, aliases);
    }

    if let Some(tags) = &update.tags {
        let existing = if update.sync_tags {
            Vec::new()
        } else {
            string_list(map.get(TAGS))
        };
        let tags = dedup(
            existing
                .into_iter()
                .chain(tags.iter().cloned())
                .map(|tag| tag.trim_start_matches('#').to_string()),
        );
        set_list(map, TAGS, tags);
    }

    if !map.contains_key(DRAFT) {
        if let Some(publish) = map.get(PUBLISH).and_then(Value::as_bool) {
            map.insert(DRAFT.into(), Value::Bool(!publish));
        }
    }
}

/// Whether front matter marks a note for publishing: `publish: true` is
/// required. A `publish` value that is not a boolean is rejected.
pub fn is_publishable(map: &Mapping) -> Result<bool> {
    match map.get(PUBLISH) {
        None => Ok(false),
        Some(Value::Bool(publish)) => Ok(*publish),
        Some(other) => Err(VaultError::InvalidFrontmatter(format!(
            "publish must be true or false, got {}",
            serde_yaml::to_string(other)?.trim_end()
        ))),
    }
}

/// Read a list field that may be written as a sequence or as a single
/// comma or space separated string.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_string).collect(),
        Some(Value::String(s)) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        Some(other) => scalar_string(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn dedup(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn set_list(map: &mut Mapping, key: &str, values: Vec<String>) {
    if values.is_empty() && !map.contains_key(key) {
        return;
    }
    let seq = values.into_iter().map(Value::String).collect();
    map.insert(key.into(), Value::Sequence(seq));
}
