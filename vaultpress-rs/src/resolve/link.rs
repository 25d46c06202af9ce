//! Link text and reference synthesis.

use crate::error::ContentErrorKind;
use crate::parser::{parse_link_content, ExternalLink};
use crate::resolve::Resolve;
use url::{ParseError, Url};

/// Rewrite the body of a `[[...]]` link (or `![[...]]` embed) into a
/// Markdown link.
///
/// A blank body renders as nothing. A target the resolver cannot find
/// degrades to the link text.
pub fn render_internal(
    body: &str,
    embed: bool,
    resolver: &dyn Resolve,
) -> Result<String, ContentErrorKind> {
    if body.is_empty() {
        return Ok(String::new());
    }
    let content = parse_link_content(body)?;
    let text = content.text();

    let Some(path) = resolver.resolve(&content.file_id)? else {
        log::debug!("unresolved link [[{}]], keeping its text", body);
        return Ok(text);
    };

    let reference = match content.fragments.last() {
        Some(fragment) => format!("{}#{}", path, resolver.fragment(fragment)),
        None => path,
    };
    let bang = if embed { "!" } else { "" };
    Ok(format!("{}[{}]({})", bang, text, reference))
}

/// Rewrite a `[display](href)` link.
///
/// `Ok(None)` means the link is kept as written: web links, and local
/// references the resolver cannot find.
pub fn render_external(
    link: &ExternalLink,
    resolver: &dyn Resolve,
) -> Result<Option<String>, ContentErrorKind> {
    let href = link.href.as_str();
    match Url::parse(href) {
        Ok(url) => match url.scheme() {
            "http" | "https" if url.has_host() => Ok(None),
            "obsidian" => {
                let file = url
                    .query_pairs()
                    .find(|(key, _)| key == "file")
                    .map(|(_, value)| value.into_owned())
                    .ok_or_else(|| ContentErrorKind::MissingFileParam(href.to_string()))?;
                Ok(resolver
                    .resolve(&file)?
                    .map(|path| format!("[{}]({})", link.display, path)))
            }
            _ => Err(ContentErrorKind::UnexpectedHref(href.to_string())),
        },
        Err(ParseError::RelativeUrlWithoutBase) if !href.starts_with("//") => {
            let decoded = urlencoding::decode(href)
                .map_err(|_| ContentErrorKind::UnexpectedHref(href.to_string()))?;
            let mut parts = decoded.split('#');
            let file_id = parts.next().unwrap_or_default();
            let fragments: Vec<&str> = parts.filter(|fragment| !fragment.is_empty()).collect();

            let Some(path) = resolver.resolve(file_id)? else {
                log::debug!("unresolved link target {}, keeping it", href);
                return Ok(None);
            };
            let mut reference = path;
            for fragment in fragments {
                reference.push('#');
                reference.push_str(&resolver.fragment(fragment));
            }
            Ok(Some(format!("[{}]({})", link.display, reference)))
        }
        Err(_) => Err(ContentErrorKind::UnexpectedHref(href.to_string())),
    }
}

/// The plain text a `[[...]]` body reads as, or `None` when the body does
/// not parse as a link and should be left alone.
pub fn render_plain(body: &str) -> Option<String> {
    if body.is_empty() {
        return Some(String::new());
    }
    parse_link_content(body).ok().map(|content| content.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::policy::{PercentEncode, SelfFallback, Strict};
    use crate::resolve::{IndexResolver, PathIndex};
    use std::sync::Arc;

    fn resolver() -> SelfFallback<IndexResolver> {
        SelfFallback::new(
            IndexResolver::new(Arc::new(PathIndex::from_paths([
                "test.md",
                "notes/current.md",
                "img/pic.png",
            ]))),
            "notes/current.md",
        )
    }

    fn external(display: &str, href: &str) -> ExternalLink {
        ExternalLink {
            display: display.to_string(),
            href: href.to_string(),
        }
    }

    #[test]
    fn test_internal_breadcrumb_and_last_fragment() {
        assert_eq!(
            render_internal("test#section#subsection", false, &resolver()).unwrap(),
            "[test > section > subsection](test.md#subsection)"
        );
    }

    #[test]
    fn test_internal_embed_and_display() {
        assert_eq!(
            render_internal("pic.png|A picture", true, &resolver()).unwrap(),
            "![A picture](img/pic.png)"
        );
    }

    #[test]
    fn test_internal_section_of_current_file() {
        assert_eq!(
            render_internal("#intro", false, &resolver()).unwrap(),
            "[intro](notes/current.md#intro)"
        );
    }

    #[test]
    fn test_internal_blank_and_unresolved() {
        assert_eq!(render_internal("", false, &resolver()).unwrap(), "");
        assert_eq!(
            render_internal("ghost|Boo", false, &resolver()).unwrap(),
            "Boo"
        );
        let strict = Strict::new(resolver());
        assert_eq!(
            render_internal("ghost", false, &strict),
            Err(ContentErrorKind::NotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_external_web_link_is_kept() {
        let link = external("Rust", "https://www.rust-lang.org/learn");
        assert_eq!(render_external(&link, &resolver()).unwrap(), None);
    }

    #[test]
    fn test_external_obsidian_uri() {
        let link = external("see", "obsidian://open?vault=v&file=img%2Fpic.png");
        assert_eq!(
            render_external(&link, &resolver()).unwrap().as_deref(),
            Some("[see](img/pic.png)")
        );

        let missing = external("see", "obsidian://open?vault=v");
        assert!(matches!(
            render_external(&missing, &resolver()),
            Err(ContentErrorKind::MissingFileParam(_))
        ));
    }

    #[test]
    fn test_external_bare_identifier() {
        let link = external("t", "test#a#b");
        assert_eq!(
            render_external(&link, &resolver()).unwrap().as_deref(),
            Some("[t](test.md#a#b)")
        );

        let link = external("p", "img/pic%2Epng");
        assert_eq!(
            render_external(&link, &resolver()).unwrap().as_deref(),
            Some("[p](img/pic.png)")
        );

        let link = external("g", "ghost.md");
        assert_eq!(render_external(&link, &resolver()).unwrap(), None);
    }

    #[test]
    fn test_percent_encode_covers_fragments() {
        let resolver = PercentEncode::new(IndexResolver::new(Arc::new(PathIndex::from_paths([
            "my note.md",
        ]))));
        assert_eq!(
            render_internal("my note#My Section", false, &resolver).unwrap(),
            "[my note > My Section](my%20note.md#My%20Section)"
        );
        let link = external("s", "my%20note#First%20Part#Sub");
        assert_eq!(
            render_external(&link, &resolver).unwrap().as_deref(),
            Some("[s](my%20note.md#First%20Part#Sub)")
        );
    }

    #[test]
    fn test_external_unexpected_scheme() {
        for href in ["ftp://host/file", "mailto:someone@example.com", "//host/path"] {
            assert!(matches!(
                render_external(&external("x", href), &resolver()),
                Err(ContentErrorKind::UnexpectedHref(_))
            ));
        }
    }

    #[test]
    fn test_plain() {
        assert_eq!(render_plain("Note|title").as_deref(), Some("title"));
        assert_eq!(render_plain("a#b").as_deref(), Some("a > b"));
        assert_eq!(render_plain("").as_deref(), Some(""));
        assert_eq!(render_plain("|x"), None);
    }
}
