//! GitHub-flavored markdown to HTML rendering pipeline.
//!
//! [`MarkdownParser`] turns a markdown document into an HTML fragment styled
//! after a code-hosting site's file view:
//!
//! - syntax-highlighted fences with `hljs-` scope classes ([`Highlighter`])
//! - heading ids and self-link anchors ([`slugify`])
//! - `~~strikethrough~~`
//! - task list checkboxes
//! - footnotes
//! - bare URL autolinking
//! - `mermaid` fences passed through for client-side rendering ([`MermaidProcessor`])
//! - `> [!NOTE]` style alert callouts ([`process_alerts`])
//!
//! Rendering is synchronous and deterministic. Malformed input never fails;
//! it degrades to literal text.
//!
//! # Example
//!
//! ```
//! use peekmd_renderer::render_markdown;
//!
//! let html = render_markdown("## Tasks\n\n- [x] write\n- [ ] ship");
//! assert!(html.contains(r#"<h2 id="tasks">"#));
//! assert!(html.contains(r#"<ul class="contains-task-list">"#));
//! ```

mod alerts;
mod anchors;
mod code_block;
mod description;
mod diagram;
mod footnotes;
mod highlight;
mod html;
mod linkify;
mod options;
mod parser;
mod strikethrough;
mod tasks;
mod token;
mod tokenizer;

pub use alerts::{AlertKind, is_alert_type, process_alerts};
pub use anchors::{ANCHOR_ICON, slugify};
pub use code_block::{CodeBlockProcessor, FenceInfo, ProcessResult, parse_fence_info};
pub use description::{NO_DESCRIPTION, extract_description, extract_topics};
pub use diagram::{MERMAID_LANGUAGE, MermaidProcessor};
pub use highlight::Highlighter;
pub use html::escape_html;
pub use options::ParserOptions;
pub use parser::{MarkdownParser, render_markdown};
pub use token::{FootnoteMeta, Token, TokenKind, is_balanced};
