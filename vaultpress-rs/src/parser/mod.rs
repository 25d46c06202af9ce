//! Scanners for Obsidian markdown syntax.
//!
//! Each scanner probes a `char` slice at a position and reports how much of
//! it belongs to one construct. They never look at more than they need and
//! never allocate unless they extract text.

pub mod code;
pub mod external_link;
pub mod fence;
pub mod frontmatter;
pub mod heading;
pub mod math;
pub mod scan;
pub mod tag;
pub mod wikilink;

pub use code::inline_code;
pub use external_link::{external_link, ExternalLink};
pub use fence::{code_fence, comment};
pub use frontmatter::{parse_frontmatter, render_document, split_frontmatter, FrontmatterSplit};
pub use heading::{heading, Heading};
pub use math::{inline_math, math_block};
pub use scan::Scan;
pub use tag::tag;
pub use wikilink::{embed, internal_link, parse_link_content, LinkContent};
