//! Token stream shared by every rendering pass.
//!
//! A document is a flat `Vec<Token>`. Container tokens come in open/close pairs
//! (`nesting` of `1` and `-1`) and own everything between them positionally.
//! Inline content of a paragraph, heading or table cell lives in the `children`
//! of a single [`TokenKind::Inline`] token, which is itself a flat stream.

/// Type tag of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    ParagraphOpen,
    ParagraphClose,
    HeadingOpen,
    HeadingClose,
    BlockquoteOpen,
    BlockquoteClose,
    BulletListOpen,
    BulletListClose,
    OrderedListOpen,
    OrderedListClose,
    ListItemOpen,
    ListItemClose,
    TableOpen,
    TableClose,
    TheadOpen,
    TheadClose,
    TbodyOpen,
    TbodyClose,
    TrOpen,
    TrClose,
    ThOpen,
    ThClose,
    TdOpen,
    TdClose,
    /// Fenced code block; `info` holds the fence info string.
    Fence,
    /// Indented code block.
    CodeBlock,
    HtmlBlock,
    Hr,
    /// Container for the inline children of a block.
    Inline,
    Text,
    /// Text from a backslash escape or entity reference; never a delimiter.
    TextSpecial,
    CodeInline,
    HtmlInline,
    Softbreak,
    Hardbreak,
    EmOpen,
    EmClose,
    StrongOpen,
    StrongClose,
    StrikeOpen,
    StrikeClose,
    LinkOpen,
    LinkClose,
    /// Image; alt text lives in `children`.
    Image,
    /// Disabled checkbox of a task list item (`checked` attribute when ticked).
    TaskCheckbox,
    FootnoteRef,
    FootnoteBlockOpen,
    FootnoteBlockClose,
    FootnoteOpen,
    FootnoteClose,
    FootnoteAnchor,
}

/// Footnote bookkeeping carried by footnote tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FootnoteMeta {
    /// Label as written in the source (`[^label]`).
    pub label: String,
    /// Zero-based footnote number, assigned in order of first reference.
    pub id: usize,
    /// Zero-based index of this reference among references to the same footnote.
    pub sub_id: usize,
}

/// Atomic unit of the intermediate representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// HTML tag name, empty for tokens without a tag.
    pub tag: &'static str,
    /// `1` opens a container, `-1` closes it, `0` is self-contained.
    pub nesting: i8,
    /// Literal content for text-bearing tokens.
    pub content: String,
    /// Fence info string.
    pub info: String,
    /// Ordered attribute list.
    pub attrs: Vec<(String, String)>,
    /// Child tokens of [`TokenKind::Inline`] and [`TokenKind::Image`].
    pub children: Vec<Token>,
    /// Whether the token is block-level (affects newline placement).
    pub block: bool,
    pub footnote: Option<FootnoteMeta>,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, tag: &'static str, nesting: i8) -> Self {
        Self {
            kind,
            tag,
            nesting,
            content: String::new(),
            info: String::new(),
            attrs: Vec::new(),
            children: Vec::new(),
            block: false,
            footnote: None,
        }
    }

    /// Create a block-level token.
    #[must_use]
    pub fn block(kind: TokenKind, tag: &'static str, nesting: i8) -> Self {
        Self {
            block: true,
            ..Self::new(kind, tag, nesting)
        }
    }

    /// Create a plain text token.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::new(TokenKind::Text, "", 0)
        }
    }

    /// Create an escaped text token.
    #[must_use]
    pub fn text_special(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::new(TokenKind::TextSpecial, "", 0)
        }
    }

    /// Create a raw inline HTML token.
    #[must_use]
    pub fn html_inline(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::new(TokenKind::HtmlInline, "", 0)
        }
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn attr_get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn attr_set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_owned(), value)),
        }
    }

    /// Append a space-separated value to an attribute (used for `class`).
    pub fn attr_join(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => {
                existing.push(' ');
                existing.push_str(value);
            }
            None => self.attrs.push((name.to_owned(), value.to_owned())),
        }
    }
}

/// Check that nesting deltas form a well-formed tree.
///
/// Every close must match the tag of the innermost open container and all
/// containers must be closed at the end. Inline children are checked recursively.
#[must_use]
pub fn is_balanced(tokens: &[Token]) -> bool {
    let mut stack: Vec<&'static str> = Vec::new();
    for token in tokens {
        match token.nesting {
            1 => stack.push(token.tag),
            -1 => {
                if stack.pop() != Some(token.tag) {
                    return false;
                }
            }
            _ => {}
        }
        if !token.children.is_empty() && !is_balanced(&token.children) {
            return false;
        }
    }
    stack.is_empty()
}

/// Merge adjacent text tokens in place.
pub(crate) fn join_text(tokens: &mut Vec<Token>) {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens.drain(..) {
        match merged.last_mut() {
            Some(last) if last.kind == TokenKind::Text && token.kind == TokenKind::Text => {
                last.content.push_str(&token.content);
            }
            _ => merged.push(token),
        }
    }
    *tokens = merged;
}

/// Turn escaped text back into plain text and merge it with its neighbours.
pub(crate) fn fold_special_text(tokens: &mut Vec<Token>) {
    for token in tokens.iter_mut() {
        if token.kind == TokenKind::TextSpecial {
            token.kind = TokenKind::Text;
        }
        if token.kind == TokenKind::Image {
            fold_special_text(&mut token.children);
        }
    }
    join_text(tokens);
}

/// Concatenate text content of inline children, descending into images.
pub(crate) fn plain_text(children: &[Token]) -> String {
    let mut out = String::new();
    for child in children {
        match child.kind {
            TokenKind::Text | TokenKind::CodeInline => out.push_str(&child.content),
            TokenKind::Image => out.push_str(&plain_text(&child.children)),
            TokenKind::Softbreak | TokenKind::Hardbreak => out.push('\n'),
            _ => {}
        }
    }
    out
}
