//! YAML front matter splitting and parsing.

use crate::error::{Result, VaultError};
use serde_yaml::{Mapping, Value};

/// Frontmatter extraction result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterSplit<'a> {
    /// The raw YAML string (without delimiters).
    pub yaml: Option<&'a str>,
    /// The content after the frontmatter.
    pub content: &'a str,
    /// Line number where content starts (1-indexed).
    pub content_start_line: usize,
}

/// Split content into frontmatter and body.
///
/// Leading blank lines are skipped. The first remaining line must be exactly
/// `---` and a later line must be exactly `---` too; otherwise the whole
/// document is body.
pub fn split_frontmatter(content: &str) -> FrontmatterSplit<'_> {
    let whole = FrontmatterSplit {
        yaml: None,
        content,
        content_start_line: 1,
    };

    let mut offset = 0;
    let mut line_no = 1;
    for line in content.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        offset += line.len();
        line_no += 1;
    }

    let mut lines = content[offset..].split_inclusive('\n');
    let Some(opening) = lines.next() else {
        return whole;
    };
    if !is_delimiter(opening) {
        return whole;
    }

    let yaml_start = offset + opening.len();
    let mut pos = yaml_start;
    let mut current_line = line_no + 1;
    for line in lines {
        if is_delimiter(line) {
            return FrontmatterSplit {
                yaml: Some(&content[yaml_start..pos]),
                content: &content[pos + line.len()..],
                content_start_line: current_line + 1,
            };
        }
        pos += line.len();
        current_line += 1;
    }

    whole
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == "---"
}

/// Parse a raw front matter block into a mapping.
///
/// An empty or null block yields an empty mapping; any other non-mapping
/// document is rejected.
pub fn parse_frontmatter(yaml: &str) -> Result<Mapping> {
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        other => Err(VaultError::InvalidFrontmatter(format!(
            "expected a mapping, found {}",
            describe(&other)
        ))),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Serialize a mapping back to a document with `---` delimiters.
pub fn render_document(frontmatter: &Mapping, body: &str) -> Result<String> {
    let yaml = if frontmatter.is_empty() {
        String::new()
    } else {
        serde_yaml::to_string(frontmatter)?
    };
    Ok(format!("---\n{}---\n{}", yaml, body))
}
