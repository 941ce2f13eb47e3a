//! `~~strikethrough~~` support.
//!
//! Runs over the children of one inline container in two passes:
//!
//! 1. [`scan`] splits text children at runs of two or more `~` and records a
//!    [`Delimiter`] for every run, with open/close eligibility from the
//!    flanking rule.
//! 2. [`balance`] pairs openers with closers innermost-first and turns the
//!    paired runs into `<s>`/`</s>` tokens. Unpaired runs stay literal text.

use unicode_categories::UnicodeCategories;

use crate::token::{Token, TokenKind, join_text};

const MARKER: char = '~';

/// Minimal run length that forms a delimiter.
const MARKER_LEN: usize = 2;

/// One run of marker characters found while scanning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Delimiter {
    pub(crate) marker: char,
    /// Run length in characters.
    pub(crate) length: usize,
    /// Index of the text token holding the run.
    pub(crate) token: usize,
    pub(crate) can_open: bool,
    pub(crate) can_close: bool,
    /// Index of the innermost open container token, `None` at top level.
    pub(crate) container: Option<usize>,
    /// Index of the partner delimiter once matched.
    pub(crate) end: Option<usize>,
}

/// Tokens and delimiters of one inline container.
#[derive(Debug, Default)]
pub(crate) struct InlineState {
    pub(crate) tokens: Vec<Token>,
    pub(crate) delimiters: Vec<Delimiter>,
}

/// Apply strikethrough to the children of an inline container.
pub(crate) fn apply(children: Vec<Token>) -> Vec<Token> {
    if !children
        .iter()
        .any(|t| t.kind == TokenKind::Text && t.content.contains("~~"))
    {
        return children;
    }

    let mut state = scan(&children);
    balance(&mut state);
    join_text(&mut state.tokens);
    state.tokens
}

/// Split text children at marker runs and record delimiters.
pub(crate) fn scan(children: &[Token]) -> InlineState {
    let mut state = InlineState {
        tokens: Vec::with_capacity(children.len()),
        delimiters: Vec::new(),
    };
    let mut containers: Vec<usize> = Vec::new();

    for (idx, child) in children.iter().enumerate() {
        if child.kind != TokenKind::Text {
            match child.nesting {
                1 => containers.push(state.tokens.len()),
                -1 => {
                    containers.pop();
                }
                _ => {}
            }
            state.tokens.push(child.clone());
            continue;
        }

        let before = idx.checked_sub(1).map(|i| &children[i]);
        let after = children.get(idx + 1);
        scan_text(&child.content, before, after, containers.last().copied(), &mut state);
    }

    state
}

fn scan_text(
    content: &str,
    before: Option<&Token>,
    after: Option<&Token>,
    container: Option<usize>,
    state: &mut InlineState,
) {
    let bytes = content.as_bytes();
    let mut pos = 0;
    let mut pending = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'~' || bytes.get(pos + 1) != Some(&b'~') {
            pos += 1;
            continue;
        }

        let start = pos;
        while pos < bytes.len() && bytes[pos] == b'~' {
            pos += 1;
        }

        let last_char = content[..start]
            .chars()
            .next_back()
            .unwrap_or_else(|| edge_char(before, true));
        let next_char = content[pos..]
            .chars()
            .next()
            .unwrap_or_else(|| edge_char(after, false));
        let (can_open, can_close) = flanking(last_char, next_char);

        if pending < start {
            state.tokens.push(Token::text(&content[pending..start]));
        }
        state.delimiters.push(Delimiter {
            marker: MARKER,
            length: pos - start,
            token: state.tokens.len(),
            can_open,
            can_close,
            container,
            end: None,
        });
        state.tokens.push(Token::text(&content[start..pos]));
        pending = pos;
    }

    if pending < content.len() || content.is_empty() {
        state.tokens.push(Token::text(&content[pending..]));
    }
}

/// Character standing in for a neighbouring token when a run touches a token edge.
///
/// The edges of the inline container count as whitespace; markup tokens count
/// as punctuation, matching the characters they were parsed from.
fn edge_char(neighbour: Option<&Token>, before: bool) -> char {
    let Some(token) = neighbour else {
        return ' ';
    };
    match token.kind {
        TokenKind::Text | TokenKind::TextSpecial => {
            let ch = if before {
                token.content.chars().next_back()
            } else {
                token.content.chars().next()
            };
            ch.unwrap_or(' ')
        }
        TokenKind::Softbreak | TokenKind::Hardbreak => '\n',
        TokenKind::CodeInline => '`',
        TokenKind::LinkOpen => '[',
        TokenKind::LinkClose | TokenKind::Image => ')',
        TokenKind::HtmlInline => '>',
        TokenKind::FootnoteRef => ']',
        _ => '*',
    }
}

fn is_punctuation(ch: char) -> bool {
    ch.is_ascii_punctuation() || ch.is_punctuation()
}

/// Left/right flanking test for a delimiter run.
///
/// Returns `(can_open, can_close)`. Strikethrough may split words, so a
/// left-flanking run can always open and a right-flanking run can always close.
fn flanking(last_char: char, next_char: char) -> (bool, bool) {
    let last_white = last_char.is_whitespace();
    let next_white = next_char.is_whitespace();
    let last_punct = is_punctuation(last_char);
    let next_punct = is_punctuation(next_char);

    let left = !next_white && (!next_punct || last_white || last_punct);
    let right = !last_white && (!last_punct || next_white || next_punct);
    (left, right)
}

/// Pair delimiters and rewrite paired runs into strike tokens.
pub(crate) fn balance(state: &mut InlineState) {
    let delimiters = &mut state.delimiters;
    let max = delimiters.len();

    for i in (0..max).rev() {
        let opener = &delimiters[i];
        if opener.marker != MARKER || !opener.can_open || opener.end.is_some() {
            continue;
        }
        let container = opener.container;

        let closer = (i + 1..max).find(|&j| {
            let candidate = &delimiters[j];
            candidate.marker == MARKER
                && candidate.can_close
                && candidate.end.is_none()
                && candidate.container == container
        });

        if let Some(j) = closer {
            delimiters[i].end = Some(j);
            delimiters[j].end = Some(i);
        }
    }

    // Excess markers become literal text; inserted back to front so earlier
    // token indices stay valid.
    let mut inserts: Vec<(usize, Token)> = Vec::new();
    for (i, delim) in delimiters.iter().enumerate() {
        let Some(j) = delim.end else {
            continue;
        };
        if j < i {
            continue;
        }
        let closer = &delimiters[j];

        let open = &mut state.tokens[delim.token];
        *open = Token::new(TokenKind::StrikeOpen, "s", 1);
        let close = &mut state.tokens[closer.token];
        *close = Token::new(TokenKind::StrikeClose, "s", -1);

        if delim.length > MARKER_LEN {
            let excess = MARKER.to_string().repeat(delim.length - MARKER_LEN);
            inserts.push((delim.token, Token::text(excess)));
        }
        if closer.length > MARKER_LEN {
            let excess = MARKER.to_string().repeat(closer.length - MARKER_LEN);
            inserts.push((closer.token + 1, Token::text(excess)));
        }
    }

    inserts.sort_by(|a, b| b.0.cmp(&a.0));
    for (position, token) in inserts {
        state.tokens.insert(position, token);
    }
}
