//! Code block processor trait for overriding fenced code rendering.
//!
//! Processors are registered with [`MarkdownParser`](crate::MarkdownParser)
//! and checked in order when a fence is rendered. The first processor returning
//! something other than [`ProcessResult::PassThrough`] wins; if none does, the
//! fence goes through the default highlighted rendering.
//!
//! # Example
//!
//! ```
//! use peekmd_renderer::{CodeBlockProcessor, FenceInfo, ProcessResult};
//!
//! struct GraphvizProcessor;
//!
//! impl CodeBlockProcessor for GraphvizProcessor {
//!     fn process(&self, fence: &FenceInfo, source: &str) -> ProcessResult {
//!         if fence.language == "dot" {
//!             ProcessResult::Inline(format!("<pre class=\"graphviz\">{}</pre>\n", source.trim()))
//!         } else {
//!             ProcessResult::PassThrough
//!         }
//!     }
//! }
//! ```

use std::collections::HashMap;

/// Result of processing a code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Replace the code block with this HTML, emitted verbatim.
    Inline(String),

    /// Render as a regular code block with syntax highlighting.
    PassThrough,
}

/// Fence info string split into language and attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FenceInfo {
    /// Trimmed info string as written after the fence.
    pub raw: String,
    /// First word of the info string (e.g. "rust", "mermaid").
    pub language: String,
    /// Attributes parsed from `key=value` words after the language.
    pub attrs: HashMap<String, String>,
}

/// Trait for overriding the rendering of fenced code blocks.
///
/// Processors are shared across concurrent renders and must not keep
/// per-document state.
pub trait CodeBlockProcessor: Send + Sync {
    /// Process a fenced code block.
    ///
    /// `source` is the raw, unescaped block content.
    fn process(&self, fence: &FenceInfo, source: &str) -> ProcessResult;
}

/// Parse fence info string into language and attributes.
///
/// Format: `language [key=value ...]`. Words without `=` are ignored.
#[must_use]
pub fn parse_fence_info(info: &str) -> FenceInfo {
    let raw = info.trim();
    let mut parts = raw.split_whitespace();
    let language = parts.next().unwrap_or("").to_owned();

    let mut attrs = HashMap::new();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            attrs.insert(key.to_owned(), value.trim_matches('"').to_owned());
        }
    }

    FenceInfo {
        raw: raw.to_owned(),
        language,
        attrs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fence_info_language_only() {
        let info = parse_fence_info("rust");
        assert_eq!(info.language, "rust");
        assert!(info.attrs.is_empty());
    }

    #[test]
    fn test_parse_fence_info_with_attrs() {
        let info = parse_fence_info("  python title=\"main.py\" linenos  ");
        assert_eq!(info.raw, "python title=\"main.py\" linenos");
        assert_eq!(info.language, "python");
        assert_eq!(info.attrs.get("title"), Some(&"main.py".to_owned()));
        assert_eq!(info.attrs.len(), 1);
    }

    #[test]
    fn test_parse_fence_info_empty() {
        let info = parse_fence_info("");
        assert_eq!(info, FenceInfo::default());
    }
}
