//! Syntax highlighting for fenced code blocks.

use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::html::escape_html;

/// Grammar registry, loaded on first use and shared by every render.
static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Prefix for scope classes, compatible with highlight.js themes.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hljs-" };

/// Class-annotating code highlighter.
///
/// Output is already HTML-escaped and must be embedded as-is.
#[derive(Clone, Copy, Debug)]
pub struct Highlighter {
    syntaxes: &'static SyntaxSet,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            syntaxes: &SYNTAXES,
        }
    }

    /// Highlight `code` using the grammar named by `hint`.
    ///
    /// An empty or unknown hint, or a grammar that fails on the input, falls
    /// back to detection from the first line and then to escaped plain text.
    #[must_use]
    pub fn highlight(&self, code: &str, hint: &str) -> String {
        let hint = hint.trim();
        if !hint.is_empty() {
            if let Some(syntax) = self.syntaxes.find_syntax_by_token(hint) {
                match self.highlight_with(code, syntax) {
                    Ok(html) => return html,
                    Err(err) => {
                        tracing::debug!(language = hint, error = %err, "Highlighting failed, detecting language");
                    }
                }
            } else {
                tracing::debug!(language = hint, "Unknown language, detecting");
            }
        }
        self.highlight_auto(code)
    }

    fn highlight_auto(&self, code: &str) -> String {
        let detected = self
            .syntaxes
            .find_syntax_by_first_line(code)
            .filter(|syntax| syntax.name != "Plain Text");
        if let Some(syntax) = detected {
            match self.highlight_with(code, syntax) {
                Ok(html) => return html,
                Err(err) => {
                    tracing::debug!(language = %syntax.name, error = %err, "Detected grammar failed");
                }
            }
        }
        escape_html(code)
    }

    fn highlight_with(
        &self,
        code: &str,
        syntax: &SyntaxReference,
    ) -> Result<String, syntect::Error> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, self.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }

    /// Whether `hint` names a known grammar.
    #[must_use]
    pub fn supports(&self, hint: &str) -> bool {
        let hint = hint.trim();
        !hint.is_empty() && self.syntaxes.find_syntax_by_token(hint).is_some()
    }
}
