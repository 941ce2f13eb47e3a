//! Page metadata derived from markdown source.

use std::sync::LazyLock;

use regex::Regex;

/// Returned when no description line is found.
pub const NO_DESCRIPTION: &str = "No description provided.";

static ORDERED_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.").unwrap());
static LINK_DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[.*\]:").unwrap());
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Line prefixes that never hold description prose.
const SKIPPED_PREFIXES: &[&str] = &["#", "-", "*", "`", "!", "|", ">", "[!", "<"];

/// First prose line after the first heading, stripped of inline markup.
///
/// Headings, list items, quotes, table rows, code fences, images, raw HTML and
/// link reference definitions are skipped. Falls back to [`NO_DESCRIPTION`].
#[must_use]
pub fn extract_description(markdown: &str) -> String {
    let mut found_heading = false;

    for line in markdown.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            found_heading = true;
            continue;
        }
        if !found_heading || trimmed.is_empty() || is_skipped(trimmed) {
            continue;
        }

        let cleaned = strip_inline_markup(trimmed);
        if !cleaned.is_empty() {
            return cleaned;
        }
    }

    NO_DESCRIPTION.to_owned()
}

fn is_skipped(line: &str) -> bool {
    SKIPPED_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
        || ORDERED_ITEM_RE.is_match(line)
        || LINK_DEFINITION_RE.is_match(line)
}

fn strip_inline_markup(line: &str) -> String {
    let text = IMAGE_RE.replace_all(line, "");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = BOLD_RE.replace_all(&text, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    let text = CODE_RE.replace_all(&text, "$1");
    SPACE_RE.replace_all(&text, " ").trim().to_owned()
}

/// Topics shown on the page sidebar.
///
/// Always the same three topics; the document is not inspected.
#[must_use]
pub fn extract_topics(_name: &str) -> Vec<String> {
    ["markdown", "preview", "documentation"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_paragraph_after_heading() {
        assert_eq!(
            extract_description("# Title\n\nThis is the description.\n\nMore content."),
            "This is the description."
        );
    }

    #[test]
    fn test_list_only_falls_back() {
        assert_eq!(
            extract_description("# Title\n\n- List item\n- Another item"),
            NO_DESCRIPTION
        );
    }

    #[test]
    fn test_link_replaced_by_text() {
        let description =
            extract_description("# Title\n\nCheck out [this link](https://example.com) for more.");
        assert_eq!(description, "Check out this link for more.");
        assert!(!description.contains("https://example.com"));
    }

    #[test]
    fn test_text_before_heading_ignored() {
        assert_eq!(
            extract_description("Preamble.\n\n# Title\n\nBody."),
            "Body."
        );
    }

    #[test]
    fn test_no_heading_falls_back() {
        assert_eq!(extract_description("Just text."), NO_DESCRIPTION);
        assert_eq!(extract_description(""), NO_DESCRIPTION);
    }

    #[test]
    fn test_skipped_lines() {
        let markdown = "# Title\n\
            ## Subtitle\n\
            * star item\n\
            1. ordered\n\
            > quote\n\
            | a | b |\n\
            ```rust\n\
            ![logo](logo.png)\n\
            [!NOTE]\n\
            <div align=\"center\">\n\
            [ref]: https://example.com\n\
            Finally, prose.";
        assert_eq!(extract_description(markdown), "Finally, prose.");
    }

    #[test]
    fn test_markup_stripped() {
        assert_eq!(
            extract_description("# T\n\nA **bold**, *italic*   and `code` line."),
            "A bold, italic and code line."
        );
    }

    #[test]
    fn test_inline_image_removed() {
        assert_eq!(
            extract_description("# T\n\nA systems language with ![Rust](https://rust-lang.org) inside."),
            "A systems language with inside."
        );
    }

    #[test]
    fn test_bracket_without_target_is_not_an_image() {
        assert_eq!(
            extract_description("# T\n\nSee ![a] and [b](c) here."),
            "See ![a] and b here."
        );
    }

    #[test]
    fn test_badge_line_skipped() {
        assert_eq!(
            extract_description("# T\n\n ![ci](b.svg) ![crates](c.svg) \n\nReal text."),
            "Real text."
        );
    }

    #[test]
    fn test_topics_are_constant() {
        let expected = vec![
            "markdown".to_owned(),
            "preview".to_owned(),
            "documentation".to_owned(),
        ];
        assert_eq!(extract_topics("README"), expected);
        assert_eq!(extract_topics(""), expected);
    }
}
