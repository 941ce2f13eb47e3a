//! HTML serialization of the token stream.
//!
//! Block tokens follow the usual newline placement: a newline after every
//! block tag, except between an opening tag and its inline content or an
//! immediately following close of the same tag. Fences go through the
//! registered [`CodeBlockProcessor`]s first and the [`Highlighter`] otherwise.

use crate::code_block::{CodeBlockProcessor, ProcessResult, parse_fence_info};
use crate::highlight::Highlighter;
use crate::token::{Token, TokenKind, plain_text};

/// Back-reference arrow, rendered as text rather than emoji.
const BACKREF_ARROW: &str = "\u{21a9}\u{fe0e}";

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Serializes tokens into an HTML fragment.
pub(crate) struct HtmlRenderer<'a> {
    processors: &'a [Box<dyn CodeBlockProcessor>],
    highlighter: &'a Highlighter,
}

impl<'a> HtmlRenderer<'a> {
    pub(crate) fn new(
        processors: &'a [Box<dyn CodeBlockProcessor>],
        highlighter: &'a Highlighter,
    ) -> Self {
        Self {
            processors,
            highlighter,
        }
    }

    pub(crate) fn render(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for (idx, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::Inline => self.render_inline(&token.children, &mut out),
                TokenKind::Fence => self.render_fence(token, &mut out),
                TokenKind::CodeBlock => {
                    out.push_str("<pre><code>");
                    out.push_str(&escape_html(&token.content));
                    out.push_str("</code></pre>\n");
                }
                TokenKind::HtmlBlock => out.push_str(&token.content),
                TokenKind::FootnoteBlockOpen => out.push_str(
                    "<hr class=\"footnotes-sep\">\n<section class=\"footnotes\">\n<ol class=\"footnotes-list\">\n",
                ),
                TokenKind::FootnoteBlockClose => out.push_str("</ol>\n</section>\n"),
                TokenKind::FootnoteOpen => {
                    let (n, _) = footnote_numbers(token);
                    out.push_str(&format!("<li id=\"fn{n}\" class=\"footnote-item\">"));
                }
                TokenKind::FootnoteClose => out.push_str("</li>\n"),
                TokenKind::FootnoteAnchor => {
                    let (_, refid) = footnote_numbers(token);
                    out.push_str(&format!(
                        " <a href=\"#fnref{refid}\" class=\"footnote-backref\">{BACKREF_ARROW}</a>"
                    ));
                }
                _ => render_token(tokens, idx, &mut out),
            }
        }
        out
    }

    fn render_inline(&self, children: &[Token], out: &mut String) {
        for (idx, child) in children.iter().enumerate() {
            match child.kind {
                TokenKind::Text => out.push_str(&escape_html(&child.content)),
                TokenKind::CodeInline => {
                    out.push_str("<code>");
                    out.push_str(&escape_html(&child.content));
                    out.push_str("</code>");
                }
                TokenKind::HtmlInline => out.push_str(&child.content),
                TokenKind::Softbreak => out.push('\n'),
                TokenKind::Hardbreak => out.push_str("<br>\n"),
                TokenKind::Image => render_image(child, out),
                TokenKind::TaskCheckbox => {
                    out.push_str("<input type=\"checkbox\" class=\"task-list-item-checkbox\"");
                    if child.attr_get("checked").is_some() {
                        out.push_str(" checked");
                    }
                    out.push_str(" disabled>");
                }
                TokenKind::FootnoteRef => {
                    let (n, refid) = footnote_numbers(child);
                    out.push_str(&format!(
                        "<sup class=\"footnote-ref\"><a href=\"#fn{n}\" id=\"fnref{refid}\">[{refid}]</a></sup>"
                    ));
                }
                _ => render_token(children, idx, out),
            }
        }
    }

    fn render_fence(&self, token: &Token, out: &mut String) {
        let fence = parse_fence_info(&token.info);

        for processor in self.processors {
            if let ProcessResult::Inline(html) = processor.process(&fence, &token.content) {
                out.push_str(&html);
                return;
            }
        }

        let highlighted = self.highlighter.highlight(&token.content, &fence.language);
        if fence.language.is_empty() {
            out.push_str("<pre><code>");
        } else {
            out.push_str("<pre><code class=\"language-");
            out.push_str(&escape_html(&fence.language));
            out.push_str("\">");
        }
        out.push_str(&highlighted);
        out.push_str("</code></pre>\n");
    }
}

/// One-based footnote number and the reference id (`n` or `n:sub`).
fn footnote_numbers(token: &Token) -> (usize, String) {
    let (id, sub_id) = token
        .footnote
        .as_ref()
        .map_or((0, 0), |meta| (meta.id, meta.sub_id));
    let n = id + 1;
    let refid = if sub_id > 0 {
        format!("{n}:{sub_id}")
    } else {
        n.to_string()
    };
    (n, refid)
}

fn render_image(token: &Token, out: &mut String) {
    out.push_str("<img src=\"");
    out.push_str(&escape_html(token.attr_get("src").unwrap_or_default()));
    out.push_str("\" alt=\"");
    out.push_str(&escape_html(&plain_text(&token.children)));
    out.push('"');
    if let Some(title) = token.attr_get("title") {
        out.push_str(" title=\"");
        out.push_str(&escape_html(title));
        out.push('"');
    }
    out.push('>');
}

fn render_attrs(token: &Token, out: &mut String) {
    for (name, value) in &token.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }
}

/// Render a tag token with the block newline rules.
fn render_token(tokens: &[Token], idx: usize, out: &mut String) {
    let token = &tokens[idx];

    // Block after the bare inline content of a tight list item
    if token.block && token.nesting != -1 && idx > 0 && tokens[idx - 1].kind == TokenKind::Inline
    {
        out.push('\n');
    }

    out.push_str(if token.nesting == -1 { "</" } else { "<" });
    out.push_str(token.tag);
    render_attrs(token, out);

    if !token.block {
        out.push('>');
        return;
    }

    let joined = token.nesting == 1
        && tokens.get(idx + 1).is_some_and(|next| {
            next.kind == TokenKind::Inline || (next.nesting == -1 && next.tag == token.tag)
        });
    out.push_str(if joined { ">" } else { ">\n" });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::MermaidProcessor;
    use crate::options::ParserOptions;
    use crate::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> String {
        let highlighter = Highlighter::new();
        let tokens = tokenize(markdown, &ParserOptions::default());
        HtmlRenderer::new(&[], &highlighter).render(&tokens)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;'&lt;/a&gt;");
    }

    #[test]
    fn test_paragraph() {
        assert_eq!(render("Hello *world*"), "<p>Hello <em>world</em></p>\n");
    }

    #[test]
    fn test_heading_and_blockquote() {
        assert_eq!(
            render("# Hi\n\n> quote"),
            "<h1>Hi</h1>\n<blockquote>\n<p>quote</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_tight_list() {
        assert_eq!(render("- a\n- b"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn test_nested_tight_list() {
        assert_eq!(
            render("- a\n  - b"),
            "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_loose_list() {
        assert_eq!(
            render("- a\n\n- b"),
            "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_ordered_list_start() {
        assert_eq!(
            render("2. two\n3. three"),
            "<ol start=\"2\">\n<li>two</li>\n<li>three</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            render("| A | B |\n|---|:-:|\n| 1 | 2 |"),
            "<table>\n<thead>\n<tr>\n<th>A</th>\n<th style=\"text-align:center\">B</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>1</td>\n<td style=\"text-align:center\">2</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_inline_elements() {
        assert_eq!(
            render("`<b>` and [link](https://a.io \"T\") and ![Alt](a.png)"),
            "<p><code>&lt;b&gt;</code> and <a href=\"https://a.io\" title=\"T\">link</a> and <img src=\"a.png\" alt=\"Alt\"></p>\n"
        );
    }

    #[test]
    fn test_breaks() {
        assert_eq!(render("a\nb  \nc"), "<p>a\nb<br>\nc</p>\n");
    }

    #[test]
    fn test_hr() {
        assert_eq!(render("a\n\n---\n\nb"), "<p>a</p>\n<hr>\n<p>b</p>\n");
    }

    #[test]
    fn test_strikethrough_markup() {
        assert_eq!(render("This is ~~deleted~~ text."), "<p>This is <s>deleted</s> text.</p>\n");
    }

    #[test]
    fn test_indented_code_is_escaped() {
        assert_eq!(render("    x < y"), "<pre><code>x &lt; y\n</code></pre>\n");
    }

    #[test]
    fn test_fence_without_language_is_escaped() {
        assert_eq!(
            render("```\nplain <text>\n```"),
            "<pre><code>plain &lt;text&gt;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_fence_with_language_is_highlighted() {
        let html = render("```rust\nlet x = 1;\n```");
        assert!(html.starts_with("<pre><code class=\"language-rust\">"));
        assert!(html.contains("hljs-"));
        assert!(html.ends_with("</code></pre>\n"));
    }

    #[test]
    fn test_processor_overrides_fence() {
        let highlighter = Highlighter::new();
        let processors: Vec<Box<dyn CodeBlockProcessor>> = vec![Box::new(MermaidProcessor)];
        let tokens = tokenize("```mermaid\nA --> B\n```", &ParserOptions::default());
        assert_eq!(
            HtmlRenderer::new(&processors, &highlighter).render(&tokens),
            "<pre class=\"mermaid\">A --> B</pre>\n"
        );
    }

    #[test]
    fn test_raw_html_passthrough() {
        assert_eq!(
            render("<div class=\"x\">\nhi\n</div>\n\na <kbd>b</kbd>"),
            "<div class=\"x\">\nhi\n</div>\n<p>a <kbd>b</kbd></p>\n"
        );
    }

    #[test]
    fn test_empty_list_item() {
        assert_eq!(render("- \n- b"), "<ul>\n<li></li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn test_attribute_values_escaped() {
        let mut token = Token::block(TokenKind::HeadingOpen, "h1", 1);
        token.attr_set("id", "a\"b");
        let mut out = String::new();
        render_token(&[token], 0, &mut out);
        assert_eq!(out, "<h1 id=\"a&quot;b\">\n");
    }
}
