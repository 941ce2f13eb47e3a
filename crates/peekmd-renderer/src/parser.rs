use std::sync::LazyLock;

use crate::alerts::process_alerts;
use crate::anchors::add_heading_anchors;
use crate::code_block::CodeBlockProcessor;
use crate::diagram::MermaidProcessor;
use crate::footnotes::footnote_tail;
use crate::highlight::Highlighter;
use crate::html::HtmlRenderer;
use crate::linkify::linkify;
use crate::options::ParserOptions;
use crate::tasks::process_task_lists;
use crate::token::{Token, TokenKind, join_text};
use crate::tokenizer::tokenize;

static DEFAULT_PARSER: LazyLock<MarkdownParser> = LazyLock::new(MarkdownParser::default);

/// Markdown to HTML pipeline.
///
/// Passes run in a fixed order:
///
/// 1. tokenize (block structure, inline content, strikethrough)
/// 2. footnote numbering, definitions moved to the end
/// 3. task list items
/// 4. bare URL links (when [`ParserOptions::linkify`] is set)
/// 5. adjacent text merge
/// 6. heading ids and anchors
/// 7. HTML serialization, with fences going through the code block
///    processors and then the highlighter
/// 8. alert callouts, rewritten on the serialized HTML
///
/// Anchors need the heading tokens, so they run before serialization; alerts
/// match on rendered blockquotes, so they run last.
///
/// The parser holds only configuration and is shared freely across threads.
///
/// # Example
///
/// ```
/// use peekmd_renderer::{MarkdownParser, ParserOptions};
///
/// let parser = MarkdownParser::new(ParserOptions::default());
/// let html = parser.render("# Hello\n\nThis is ~~old~~ new.");
/// assert!(html.contains(r#"<h1 id="hello">"#));
/// assert!(html.contains("<s>old</s>"));
/// ```
pub struct MarkdownParser {
    options: ParserOptions,
    processors: Vec<Box<dyn CodeBlockProcessor>>,
    highlighter: Highlighter,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

impl MarkdownParser {
    /// Create a parser with the built-in mermaid fence processor.
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            processors: vec![Box::new(MermaidProcessor)],
            highlighter: Highlighter::new(),
        }
    }

    /// Add a code block processor, checked after the ones already registered.
    #[must_use]
    pub fn with_processor<P: CodeBlockProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    #[must_use]
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Run the token passes and return the final token stream.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Vec<Token> {
        let tokens = tokenize(markdown, &self.options);
        let mut tokens = footnote_tail(tokens);
        process_task_lists(&mut tokens);
        if self.options.linkify {
            linkify(&mut tokens);
        }
        for token in tokens.iter_mut().filter(|t| t.kind == TokenKind::Inline) {
            join_text(&mut token.children);
        }
        add_heading_anchors(&mut tokens);
        tokens
    }

    /// Render markdown to an HTML fragment.
    #[must_use]
    pub fn render(&self, markdown: &str) -> String {
        let tokens = self.parse(markdown);
        let html = HtmlRenderer::new(&self.processors, &self.highlighter).render(&tokens);
        process_alerts(&html)
    }
}

/// Render markdown with the default options.
#[must_use]
pub fn render_markdown(markdown: &str) -> String {
    DEFAULT_PARSER.render(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::slugify;
    use crate::code_block::{FenceInfo, ProcessResult};
    use crate::token::is_balanced;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parser_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MarkdownParser>();
    }

    #[test]
    fn test_headings_have_ids_and_self_links() {
        let html = render_markdown("# Hello World\n\n## Using `render` *now*");
        assert!(html.starts_with(r##"<h1 id="hello-world"><a class="anchor" href="#hello-world"><svg"##));
        assert!(html.contains(r#"</svg></a>Hello World</h1>"#));

        let slug = slugify("Using render now");
        assert!(html.contains(&format!(r#"<h2 id="{slug}">"#)));
        assert!(html.contains(&format!(r##"href="#{slug}""##)));
    }

    #[test]
    fn test_strikethrough_round_trip() {
        let html = render_markdown("This is ~~deleted~~ text.");
        assert_eq!(html, "<p>This is <s>deleted</s> text.</p>\n");
        assert!(!html.contains('~'));
    }

    #[test]
    fn test_unclosed_strikethrough_is_literal() {
        assert_eq!(render_markdown("~~unclosed"), "<p>~~unclosed</p>\n");
    }

    #[test]
    fn test_escaped_tildes_are_literal() {
        assert_eq!(
            render_markdown(r"Keep \~~this~~ literal."),
            "<p>Keep ~~this~~ literal.</p>\n"
        );
        assert_eq!(
            render_markdown("Keep &#126;&#126;this~~ literal."),
            "<p>Keep ~~this~~ literal.</p>\n"
        );
    }

    #[test]
    fn test_strikethrough_inside_emphasis() {
        assert_eq!(
            render_markdown("*a ~~b~~ c*"),
            "<p><em>a <s>b</s> c</em></p>\n"
        );
    }

    #[test]
    fn test_task_list() {
        let html = render_markdown("- [ ] a\n- [x] b\n- [X] c");
        assert_eq!(
            html,
            "<ul class=\"contains-task-list\">\n\
             <li class=\"task-list-item\"><input type=\"checkbox\" class=\"task-list-item-checkbox\" disabled>a</li>\n\
             <li class=\"task-list-item\"><input type=\"checkbox\" class=\"task-list-item-checkbox\" checked disabled>b</li>\n\
             <li class=\"task-list-item\"><input type=\"checkbox\" class=\"task-list-item-checkbox\" checked disabled>c</li>\n\
             </ul>\n"
        );
    }

    #[test]
    fn test_mermaid_is_unescaped_other_fences_escaped() {
        let mermaid = render_markdown("```mermaid\ngraph TD\n  A-->B\n```");
        assert_eq!(mermaid, "<pre class=\"mermaid\">graph TD\n  A-->B</pre>\n");

        let plain = render_markdown("```\nA-->B\n```");
        assert!(plain.contains("A--&gt;B"));
        assert!(!plain.contains("A-->B"));
    }

    #[test]
    fn test_note_alert() {
        let html = render_markdown("> [!NOTE]\n> This is a note.");
        assert!(html.contains(r#"class="markdown-alert markdown-alert-note""#));
        assert!(html.contains("Note</p>"));
        assert!(html.contains("This is a note."));
        assert!(!html.contains("[!NOTE]"));
        assert!(!html.contains("<blockquote>"));
    }

    #[test]
    fn test_alert_keeps_nested_blockquote() {
        let html = render_markdown("> [!NOTE]\n> > inner\n>\n> outer");
        assert!(html.contains("<blockquote>\n<p>inner</p>\n</blockquote>\n<p>outer</p>\n</div>\n"));
        assert_eq!(html.matches("<blockquote>").count(), 1);
        assert_eq!(html.matches("</blockquote>").count(), 1);
    }

    #[test]
    fn test_plain_blockquote_unchanged() {
        assert_eq!(
            render_markdown("> Just a quote."),
            "<blockquote>\n<p>Just a quote.</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_unknown_alert_kind_stays_blockquote() {
        let html = render_markdown("> [!DANGER]\n> Nope.");
        assert!(html.starts_with("<blockquote>"));
        assert!(html.contains("[!DANGER]"));
    }

    #[test]
    fn test_footnotes() {
        assert_eq!(
            render_markdown("Text[^1].\n\n[^1]: Note."),
            "<p>Text<sup class=\"footnote-ref\"><a href=\"#fn1\" id=\"fnref1\">[1]</a></sup>.</p>\n\
             <hr class=\"footnotes-sep\">\n\
             <section class=\"footnotes\">\n\
             <ol class=\"footnotes-list\">\n\
             <li id=\"fn1\" class=\"footnote-item\"><p>Note. <a href=\"#fnref1\" class=\"footnote-backref\">\u{21a9}\u{fe0e}</a></p>\n\
             </li>\n\
             </ol>\n\
             </section>\n"
        );
    }

    #[test]
    fn test_repeated_footnote_reference() {
        let html = render_markdown("a[^x] b[^x]\n\n[^x]: note");
        assert!(html.contains(r#"id="fnref1:1">[1:1]</a>"#));
        assert!(html.contains(r##"href="#fnref1:1" class="footnote-backref""##));
    }

    #[test]
    fn test_linkify() {
        let html = render_markdown("Visit https://example.com today");
        assert_eq!(
            html,
            "<p>Visit <a href=\"https://example.com\">https://example.com</a> today</p>\n"
        );

        let parser = MarkdownParser::new(ParserOptions {
            linkify: false,
            ..ParserOptions::default()
        });
        assert_eq!(
            parser.render("Visit https://example.com today"),
            "<p>Visit https://example.com today</p>\n"
        );
    }

    #[test]
    fn test_html_disabled_escapes() {
        let parser = MarkdownParser::new(ParserOptions {
            html: false,
            ..ParserOptions::default()
        });
        assert_eq!(parser.render("a <b>x</b>"), "<p>a &lt;b&gt;x&lt;/b&gt;</p>\n");
    }

    #[test]
    fn test_typographer() {
        let parser = MarkdownParser::new(ParserOptions {
            typographer: true,
            ..ParserOptions::default()
        });
        assert!(parser.render("\"quoted\"").contains('\u{201c}'));
        assert!(render_markdown("\"quoted\"").contains("&quot;quoted&quot;"));
    }

    #[test]
    fn test_custom_processor_runs_after_mermaid() {
        struct Upper;
        impl CodeBlockProcessor for Upper {
            fn process(&self, fence: &FenceInfo, source: &str) -> ProcessResult {
                if fence.language == "shout" {
                    ProcessResult::Inline(format!("<p>{}</p>\n", source.trim().to_uppercase()))
                } else {
                    ProcessResult::PassThrough
                }
            }
        }

        let parser = MarkdownParser::default().with_processor(Upper);
        assert_eq!(parser.render("```shout\nhey\n```"), "<p>HEY</p>\n");
        assert!(parser.render("```mermaid\na\n```").contains("class=\"mermaid\""));
    }

    #[test]
    fn test_token_stream_is_balanced() {
        let doc = "# T\n\n- [x] a ~~b~~\n  - c\n\n> [!TIP]\n> d[^1]\n\n| x |\n|---|\n| www.e.com |\n\n[^1]: f\n";
        let tokens = MarkdownParser::default().parse(doc);
        assert!(is_balanced(&tokens));
    }

    #[test]
    fn test_malformed_input_degrades() {
        for input in ["", "~~", "~~~", "[^", "> [!", "```", "- [", "<div", "*~~a*~~"] {
            let tokens = MarkdownParser::default().parse(input);
            assert!(is_balanced(&tokens), "input: {input:?}");
            let _ = render_markdown(input);
        }
    }
}
