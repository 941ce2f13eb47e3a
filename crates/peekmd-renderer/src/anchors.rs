//! Heading ids and self-link anchors.

use std::sync::LazyLock;

use regex::Regex;

use crate::token::{Token, TokenKind};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_\s-]").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Octicon "link" icon shown on heading hover.
pub const ANCHOR_ICON: &str = r#"<svg class="octicon" viewBox="0 0 16 16" width="16" height="16"><path d="m7.775 3.275 1.25-1.25a3.5 3.5 0 1 1 4.95 4.95l-2.5 2.5a3.5 3.5 0 0 1-4.95 0 .751.751 0 0 1 .018-1.042.751.751 0 0 1 1.042-.018 1.998 1.998 0 0 0 2.83 0l2.5-2.5a2.002 2.002 0 0 0-2.83-2.83l-1.25 1.25a.751.751 0 0 1-1.042-.018.751.751 0 0 1-.018-1.042Zm-4.69 9.64a1.998 1.998 0 0 0 2.83 0l1.25-1.25a.751.751 0 0 1 1.042.018.751.751 0 0 1 .018 1.042l-1.25 1.25a3.5 3.5 0 1 1-4.95-4.95l2.5-2.5a3.5 3.5 0 0 1 4.95 0 .751.751 0 0 1-.018 1.042.751.751 0 0 1-1.042.018 1.998 1.998 0 0 0-2.83 0l-2.5 2.5a1.998 1.998 0 0 0 0 2.83Z"></path></svg>"#;

/// Convert heading text to a URL-safe id.
///
/// Lowercases, trims, strips HTML tags, drops everything except ASCII word
/// characters, whitespace and `-`, then joins whitespace runs with `-`.
/// Non-ASCII letters are dropped.
///
/// # Examples
///
/// ```
/// use peekmd_renderer::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Version 2.0"), "version-20");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = TAG_RE.replace_all(lower.trim(), "");
    let words = NON_WORD_RE.replace_all(&stripped, "");
    SPACE_RE.replace_all(&words, "-").into_owned()
}

/// Give every heading an `id` and a leading self-link.
///
/// Duplicate headings get duplicate ids.
pub(crate) fn add_heading_anchors(tokens: &mut [Token]) {
    for idx in 0..tokens.len() {
        if tokens[idx].kind != TokenKind::HeadingOpen {
            continue;
        }
        let Some(inline) = tokens.get(idx + 1).filter(|t| t.kind == TokenKind::Inline) else {
            continue;
        };

        let text: String = inline
            .children
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Text | TokenKind::CodeInline))
            .map(|t| t.content.as_str())
            .collect();
        let slug = slugify(&text);

        tokens[idx].attr_set("id", slug.as_str());
        let inline = &mut tokens[idx + 1];
        if !inline.children.is_empty() {
            let link = format!(r##"<a class="anchor" href="#{slug}">{ANCHOR_ICON}</a>"##);
            inline.children.insert(0, Token::html_inline(link));
        }
    }
}
