//! Block and inline tokenization.
//!
//! Converts the pulldown-cmark event stream into the flat token stream used by
//! the rendering passes. Runs of inline events are collected into a single
//! [`TokenKind::Inline`] container per block; the strikethrough scan and match
//! run on each container as it is closed.
//!
//! Characters produced by a backslash escape or an entity reference become
//! [`TokenKind::TextSpecial`] tokens so they never act as delimiters. They are
//! folded back into plain text once the container is closed.

use std::ops::Range;

use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
};

use crate::options::ParserOptions;
use crate::strikethrough;
use crate::token::{FootnoteMeta, Token, TokenKind, fold_special_text};

/// Base parser options for a configuration.
///
/// Strikethrough and task lists are left to the crate's own passes, and GFM
/// blockquote alerts to the HTML post-processor, so only tables and footnotes
/// are enabled here.
pub(crate) fn parser_options(options: &ParserOptions) -> Options {
    let mut opts = Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES;
    if options.typographer {
        opts |= Options::ENABLE_SMART_PUNCTUATION;
    }
    opts
}

/// Tokenize markdown source.
pub(crate) fn tokenize(markdown: &str, options: &ParserOptions) -> Vec<Token> {
    let parser = Parser::new_ext(markdown, parser_options(options));
    let mut tokenizer = Tokenizer::new(options.html);
    for (event, range) in parser.into_offset_iter() {
        match event {
            Event::Text(text) if tokenizer.leaf.is_none() => {
                tokenizer.source_text(&text, markdown, range);
            }
            event => tokenizer.event(event),
        }
    }
    tokenizer.finish()
}

/// Raw content being collected for a leaf block.
enum Leaf {
    Code { fenced: bool, info: String, content: String },
    Html(String),
}

struct Tokenizer {
    html: bool,
    tokens: Vec<Token>,
    inline: Vec<Token>,
    images: Vec<Token>,
    leaf: Option<Leaf>,
    alignments: Vec<Alignment>,
    cell_index: usize,
    in_table_head: bool,
    in_table_body: bool,
}

impl Tokenizer {
    fn new(html: bool) -> Self {
        Self {
            html,
            tokens: Vec::new(),
            inline: Vec::new(),
            images: Vec::new(),
            leaf: None,
            alignments: Vec::new(),
            cell_index: 0,
            in_table_head: false,
            in_table_body: false,
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush_inline(false);
        self.tokens
    }

    fn event(&mut self, event: Event<'_>) {
        if let Some(leaf) = &mut self.leaf {
            match (leaf, &event) {
                (Leaf::Code { content, .. }, Event::Text(text)) => {
                    content.push_str(text);
                    return;
                }
                (Leaf::Html(content), Event::Html(html) | Event::Text(html)) => {
                    content.push_str(html);
                    return;
                }
                _ => {}
            }
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => {
                let mut token = Token::new(TokenKind::CodeInline, "code", 0);
                token.content = code.into_string();
                self.push_inline(token);
            }
            Event::InlineHtml(html) => {
                if self.html {
                    self.push_inline(Token::html_inline(html.as_ref()));
                } else {
                    self.push_inline(Token::text(html.as_ref()));
                }
            }
            Event::Html(html) => {
                // Html outside an HTML block container
                self.flush_inline(false);
                self.push_html_block(html.into_string());
            }
            Event::SoftBreak => self.push_inline(Token::new(TokenKind::Softbreak, "br", 0)),
            Event::HardBreak => self.push_inline(Token::new(TokenKind::Hardbreak, "br", 0)),
            Event::Rule => {
                self.flush_inline(false);
                self.tokens.push(Token::block(TokenKind::Hr, "hr", 0));
            }
            Event::FootnoteReference(label) => {
                let mut token = Token::new(TokenKind::FootnoteRef, "", 0);
                token.footnote = Some(FootnoteMeta {
                    label: label.into_string(),
                    ..FootnoteMeta::default()
                });
                self.push_inline(token);
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.push_inline(Token::text(math.as_ref()));
            }
            Event::TaskListMarker(_) => {}
        }
    }

    #[allow(clippy::too_many_lines)]
    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open_block(TokenKind::ParagraphOpen, "p"),
            Tag::Heading { level, .. } => {
                self.open_block(TokenKind::HeadingOpen, heading_tag(level));
            }
            Tag::BlockQuote(_) => self.open_block(TokenKind::BlockquoteOpen, "blockquote"),
            Tag::CodeBlock(kind) => {
                self.flush_inline(false);
                let (fenced, info) = match kind {
                    CodeBlockKind::Fenced(info) => (true, info.into_string()),
                    CodeBlockKind::Indented => (false, String::new()),
                };
                self.leaf = Some(Leaf::Code {
                    fenced,
                    info,
                    content: String::new(),
                });
            }
            Tag::HtmlBlock => {
                self.flush_inline(false);
                self.leaf = Some(Leaf::Html(String::new()));
            }
            Tag::List(start) => match start {
                None => self.open_block(TokenKind::BulletListOpen, "ul"),
                Some(n) => {
                    self.open_block(TokenKind::OrderedListOpen, "ol");
                    if n != 1
                        && let Some(token) = self.tokens.last_mut()
                    {
                        token.attr_set("start", n.to_string());
                    }
                }
            },
            Tag::Item => self.open_block(TokenKind::ListItemOpen, "li"),
            Tag::FootnoteDefinition(label) => {
                self.open_block(TokenKind::FootnoteOpen, "li");
                if let Some(token) = self.tokens.last_mut() {
                    token.footnote = Some(FootnoteMeta {
                        label: label.into_string(),
                        ..FootnoteMeta::default()
                    });
                }
            }
            Tag::Table(alignments) => {
                self.open_block(TokenKind::TableOpen, "table");
                self.alignments = alignments;
                self.in_table_body = false;
            }
            Tag::TableHead => {
                self.open_block(TokenKind::TheadOpen, "thead");
                self.open_block(TokenKind::TrOpen, "tr");
                self.in_table_head = true;
                self.cell_index = 0;
            }
            Tag::TableRow => {
                if !self.in_table_body {
                    self.open_block(TokenKind::TbodyOpen, "tbody");
                    self.in_table_body = true;
                }
                self.open_block(TokenKind::TrOpen, "tr");
                self.cell_index = 0;
            }
            Tag::TableCell => {
                let (kind, tag) = if self.in_table_head {
                    (TokenKind::ThOpen, "th")
                } else {
                    (TokenKind::TdOpen, "td")
                };
                self.open_block(kind, tag);
                let style = match self.alignments.get(self.cell_index) {
                    Some(Alignment::Left) => Some("text-align:left"),
                    Some(Alignment::Center) => Some("text-align:center"),
                    Some(Alignment::Right) => Some("text-align:right"),
                    Some(Alignment::None) | None => None,
                };
                if let (Some(style), Some(token)) = (style, self.tokens.last_mut()) {
                    token.attr_set("style", style);
                }
            }
            Tag::Emphasis => self.push_inline(Token::new(TokenKind::EmOpen, "em", 1)),
            Tag::Strong => self.push_inline(Token::new(TokenKind::StrongOpen, "strong", 1)),
            Tag::Strikethrough => self.push_inline(Token::new(TokenKind::StrikeOpen, "s", 1)),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let mut token = Token::new(TokenKind::LinkOpen, "a", 1);
                let href = if link_type == LinkType::Email {
                    format!("mailto:{dest_url}")
                } else {
                    dest_url.into_string()
                };
                token.attr_set("href", href);
                if !title.is_empty() {
                    token.attr_set("title", title.into_string());
                }
                self.push_inline(token);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut token = Token::new(TokenKind::Image, "img", 0);
                token.attr_set("src", dest_url.into_string());
                if !title.is_empty() {
                    token.attr_set("title", title.into_string());
                }
                self.images.push(token);
            }
            Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.close_block(TokenKind::ParagraphClose, "p", true),
            TagEnd::Heading(level) => {
                self.close_block(TokenKind::HeadingClose, heading_tag(level), true);
            }
            TagEnd::BlockQuote(_) => {
                self.close_block(TokenKind::BlockquoteClose, "blockquote", false);
            }
            TagEnd::CodeBlock => match self.leaf.take() {
                Some(Leaf::Code {
                    fenced,
                    info,
                    content,
                }) => {
                    let kind = if fenced {
                        TokenKind::Fence
                    } else {
                        TokenKind::CodeBlock
                    };
                    let mut token = Token::block(kind, "code", 0);
                    token.info = info;
                    token.content = content;
                    self.tokens.push(token);
                }
                other => self.leaf = other,
            },
            TagEnd::HtmlBlock => {
                if let Some(Leaf::Html(content)) = self.leaf.take() {
                    self.push_html_block(content);
                }
            }
            TagEnd::List(ordered) => {
                if ordered {
                    self.close_block(TokenKind::OrderedListClose, "ol", false);
                } else {
                    self.close_block(TokenKind::BulletListClose, "ul", false);
                }
            }
            TagEnd::Item => self.close_block(TokenKind::ListItemClose, "li", false),
            TagEnd::FootnoteDefinition => {
                self.close_block(TokenKind::FootnoteClose, "li", false);
            }
            TagEnd::Table => {
                if self.in_table_body {
                    self.close_block(TokenKind::TbodyClose, "tbody", false);
                    self.in_table_body = false;
                }
                self.close_block(TokenKind::TableClose, "table", false);
            }
            TagEnd::TableHead => {
                self.close_block(TokenKind::TrClose, "tr", false);
                self.close_block(TokenKind::TheadClose, "thead", false);
                self.in_table_head = false;
            }
            TagEnd::TableRow => self.close_block(TokenKind::TrClose, "tr", false),
            TagEnd::TableCell => {
                if self.in_table_head {
                    self.close_block(TokenKind::ThClose, "th", true);
                } else {
                    self.close_block(TokenKind::TdClose, "td", true);
                }
                self.cell_index += 1;
            }
            TagEnd::Emphasis => self.push_inline(Token::new(TokenKind::EmClose, "em", -1)),
            TagEnd::Strong => self.push_inline(Token::new(TokenKind::StrongClose, "strong", -1)),
            TagEnd::Strikethrough => {
                self.push_inline(Token::new(TokenKind::StrikeClose, "s", -1));
            }
            TagEnd::Link => self.push_inline(Token::new(TokenKind::LinkClose, "a", -1)),
            TagEnd::Image => {
                if let Some(image) = self.images.pop() {
                    self.push_inline(image);
                }
            }
            TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::Superscript
            | TagEnd::Subscript => {}
        }
    }

    fn open_block(&mut self, kind: TokenKind, tag: &'static str) {
        self.flush_inline(false);
        self.tokens.push(Token::block(kind, tag, 1));
    }

    /// Close a block; `has_inline` blocks always get an inline container.
    fn close_block(&mut self, kind: TokenKind, tag: &'static str, has_inline: bool) {
        self.flush_inline(has_inline);
        self.tokens.push(Token::block(kind, tag, -1));
    }

    /// Push inline text, keeping escaped and entity characters apart.
    fn source_text(&mut self, text: &str, source: &str, range: Range<usize>) {
        let raw = source.get(range.clone()).unwrap_or_default();
        if raw.starts_with('&') && raw != text {
            self.push_inline(Token::text_special(text));
            return;
        }

        // An odd run of backslashes right before the text escapes its first char
        let backslashes = source.as_bytes()[..range.start.min(source.len())]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count();
        let escaped =
            backslashes % 2 == 1 && text.starts_with(|c: char| c.is_ascii_punctuation());
        if escaped {
            let (head, rest) = text.split_at(1);
            self.push_inline(Token::text_special(head));
            if !rest.is_empty() {
                self.push_text(rest);
            }
        } else {
            self.push_text(text);
        }
    }

    /// Push plain text, merging it into a preceding text token.
    fn push_text(&mut self, text: &str) {
        let target = match self.images.last_mut() {
            Some(image) => &mut image.children,
            None => &mut self.inline,
        };
        match target.last_mut() {
            Some(last) if last.kind == TokenKind::Text => last.content.push_str(text),
            _ => target.push(Token::text(text)),
        }
    }

    fn push_inline(&mut self, token: Token) {
        match self.images.last_mut() {
            Some(image) => image.children.push(token),
            None => self.inline.push(token),
        }
    }

    fn push_html_block(&mut self, content: String) {
        if self.html {
            let mut token = Token::block(TokenKind::HtmlBlock, "", 0);
            token.content = content;
            self.tokens.push(token);
        } else {
            // Without raw HTML the block degrades to a paragraph of text
            self.tokens.push(Token::block(TokenKind::ParagraphOpen, "p", 1));
            self.inline.push(Token::text(content.trim_end()));
            self.close_block(TokenKind::ParagraphClose, "p", true);
        }
    }

    fn flush_inline(&mut self, force: bool) {
        if self.inline.is_empty() && !force {
            return;
        }
        let children = std::mem::take(&mut self.inline);
        let mut token = Token::new(TokenKind::Inline, "", 0);
        token.children = strikethrough::apply(children);
        fold_special_text(&mut token.children);
        self.tokens.push(token);
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::is_balanced;
    use pretty_assertions::assert_eq;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    fn tokens(markdown: &str) -> Vec<Token> {
        tokenize(markdown, &ParserOptions::default())
    }

    #[test]
    fn test_paragraph_tokens() {
        let tokens = tokens("Hello *world*");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::ParagraphOpen,
                TokenKind::Inline,
                TokenKind::ParagraphClose
            ]
        );
        assert_eq!(
            kinds(&tokens[1].children),
            vec![
                TokenKind::Text,
                TokenKind::EmOpen,
                TokenKind::Text,
                TokenKind::EmClose
            ]
        );
    }

    #[test]
    fn test_heading_tag() {
        let tokens = tokens("### Title");
        assert_eq!(tokens[0].tag, "h3");
        assert_eq!(tokens[1].children[0].content, "Title");
    }

    #[test]
    fn test_tight_list_item_has_bare_inline() {
        let tokens = tokens("- a\n- b");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::BulletListOpen,
                TokenKind::ListItemOpen,
                TokenKind::Inline,
                TokenKind::ListItemClose,
                TokenKind::ListItemOpen,
                TokenKind::Inline,
                TokenKind::ListItemClose,
                TokenKind::BulletListClose,
            ]
        );
    }

    #[test]
    fn test_ordered_list_start() {
        let tokens = tokens("3. three\n4. four");
        assert_eq!(tokens[0].kind, TokenKind::OrderedListOpen);
        assert_eq!(tokens[0].attr_get("start"), Some("3"));
    }

    #[test]
    fn test_fence_keeps_info_and_content() {
        let tokens = tokens("```rust title=x\nfn main() {}\n```");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Fence);
        assert_eq!(tokens[0].info, "rust title=x");
        assert_eq!(tokens[0].content, "fn main() {}\n");
    }

    #[test]
    fn test_task_prefix_stays_text() {
        let tokens = tokens("- [ ] todo");
        assert_eq!(tokens[2].children[0].content, "[ ] todo");
    }

    #[test]
    fn test_strikethrough_applied_per_inline() {
        let tokens = tokens("a ~~b~~ c");
        assert!(
            tokens[1]
                .children
                .iter()
                .any(|t| t.kind == TokenKind::StrikeOpen)
        );
    }

    #[test]
    fn test_escaped_tilde_stays_literal() {
        let tokens = tokens(r"Keep \~~this~~ literal.");
        assert_eq!(tokens[1].children, vec![Token::text("Keep ~~this~~ literal.")]);
    }

    #[test]
    fn test_entity_tilde_stays_literal() {
        let tokens = tokens("Keep &#126;&#126;this~~ literal.");
        assert_eq!(tokens[1].children, vec![Token::text("Keep ~~this~~ literal.")]);
    }

    #[test]
    fn test_escaped_backslash_does_not_escape_tilde() {
        let tokens = tokens(r"a \\~~b~~");
        assert_eq!(
            kinds(&tokens[1].children),
            vec![
                TokenKind::Text,
                TokenKind::StrikeOpen,
                TokenKind::Text,
                TokenKind::StrikeClose,
            ]
        );
        assert_eq!(tokens[1].children[0].content, "a \\");
    }

    #[test]
    fn test_escapes_folded_into_text() {
        let tokens = tokens(r"1\. not a list &amp; more");
        assert_eq!(tokens[1].children, vec![Token::text("1. not a list & more")]);
    }

    #[test]
    fn test_table_structure() {
        let tokens = tokens("| A | B |\n|:--|--:|\n| 1 | 2 |");
        assert!(is_balanced(&tokens));
        let th = tokens.iter().find(|t| t.kind == TokenKind::ThOpen).unwrap();
        assert_eq!(th.attr_get("style"), Some("text-align:left"));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::TbodyOpen));
    }

    #[test]
    fn test_image_alt_collected_as_children() {
        let tokens = tokens("![Alt *text*](a.png \"T\")");
        let image = &tokens[1].children[0];
        assert_eq!(image.kind, TokenKind::Image);
        assert_eq!(image.attr_get("src"), Some("a.png"));
        assert_eq!(image.attr_get("title"), Some("T"));
        assert_eq!(crate::token::plain_text(&image.children), "Alt text");
    }

    #[test]
    fn test_html_block_passthrough() {
        let tokens = tokens("<div>\nhi\n</div>");
        assert_eq!(tokens[0].kind, TokenKind::HtmlBlock);
        assert!(tokens[0].content.starts_with("<div>"));
    }

    #[test]
    fn test_html_disabled_becomes_text() {
        let options = ParserOptions {
            html: false,
            ..ParserOptions::default()
        };
        let tokens = tokenize("<div>\nhi\n</div>\n\na <b>c</b>", &options);
        assert!(tokens.iter().all(|t| t.kind != TokenKind::HtmlBlock));
        assert!(
            tokens
                .iter()
                .flat_map(|t| &t.children)
                .all(|t| t.kind != TokenKind::HtmlInline)
        );
        assert!(is_balanced(&tokens));
    }

    #[test]
    fn test_footnote_tokens() {
        let tokens = tokens("Text[^1].\n\n[^1]: Note.");
        let reference = tokens[1]
            .children
            .iter()
            .find(|t| t.kind == TokenKind::FootnoteRef)
            .unwrap();
        assert_eq!(reference.footnote.as_ref().unwrap().label, "1");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::FootnoteOpen));
    }

    #[test]
    fn test_nested_structures_balanced() {
        let tokens = tokens("> - a\n>   - b\n>\n> ```\n> code\n> ```\n\n1. x\n\n   y");
        assert!(is_balanced(&tokens));
    }
}
