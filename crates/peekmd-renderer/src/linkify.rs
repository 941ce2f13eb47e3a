//! Bare URL autolinking.
//!
//! Text outside links is scanned for `http://`, `https://` and `www.` URLs.
//! Matches become link tokens whose text is the URL as written.

use std::sync::LazyLock;

use regex::Regex;
use unicode_categories::UnicodeCategories;

use crate::token::{Token, TokenKind};

static CANDIDATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)").unwrap());

/// A URL found in a text run.
#[derive(Debug, PartialEq, Eq)]
struct UrlMatch {
    start: usize,
    end: usize,
    href: String,
}

/// Replace bare URLs in inline text with links.
pub(crate) fn linkify(tokens: &mut [Token]) {
    for token in tokens.iter_mut().filter(|t| t.kind == TokenKind::Inline) {
        let candidates = token
            .children
            .iter()
            .any(|c| c.kind == TokenKind::Text && CANDIDATE_RE.is_match(&c.content));
        if candidates {
            let children = std::mem::take(&mut token.children);
            token.children = linkify_children(children);
        }
    }
}

fn linkify_children(children: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(children.len());
    let mut link_depth = 0usize;

    for child in children {
        match child.kind {
            TokenKind::LinkOpen => link_depth += 1,
            TokenKind::LinkClose => link_depth = link_depth.saturating_sub(1),
            TokenKind::HtmlInline => {
                if is_link_open(&child.content) {
                    link_depth += 1;
                } else if is_link_close(&child.content) {
                    link_depth = link_depth.saturating_sub(1);
                }
            }
            TokenKind::Text if link_depth == 0 => {
                split_links(&child.content, &mut out);
                continue;
            }
            _ => {}
        }
        out.push(child);
    }

    out
}

fn is_link_open(html: &str) -> bool {
    let bytes = html.as_bytes();
    bytes.len() > 2
        && bytes[0] == b'<'
        && bytes[1].eq_ignore_ascii_case(&b'a')
        && (bytes[2] == b'>' || bytes[2].is_ascii_whitespace())
}

fn is_link_close(html: &str) -> bool {
    html.get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("</a"))
}

fn split_links(text: &str, out: &mut Vec<Token>) {
    let matches = find_urls(text);
    if matches.is_empty() {
        out.push(Token::text(text));
        return;
    }

    let mut last = 0;
    for url in matches {
        if url.start > last {
            out.push(Token::text(&text[last..url.start]));
        }
        let mut open = Token::new(TokenKind::LinkOpen, "a", 1);
        open.attr_set("href", url.href);
        out.push(open);
        out.push(Token::text(&text[url.start..url.end]));
        out.push(Token::new(TokenKind::LinkClose, "a", -1));
        last = url.end;
    }
    if last < text.len() {
        out.push(Token::text(&text[last..]));
    }
}

fn find_urls(text: &str) -> Vec<UrlMatch> {
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(candidate) = CANDIDATE_RE.find_at(text, pos) {
        let start = candidate.start();
        let www = candidate.as_str().eq_ignore_ascii_case("www.");
        match match_url(text, start, candidate.end(), www) {
            Some(url) => {
                pos = url.end;
                found.push(url);
            }
            None => pos = candidate.end(),
        }
    }

    found
}

fn match_url(text: &str, start: usize, host_start: usize, www: bool) -> Option<UrlMatch> {
    let (host_len, dots) = check_domain(&text[host_start..])?;
    if host_len == 0 || (www && dots == 0) {
        return None;
    }

    let mut end = host_start + host_len;
    while let Some(ch) = text[end..].chars().next() {
        if ch.is_whitespace() || ch == '<' {
            break;
        }
        end += ch.len_utf8();
    }
    let end = start + trim_trailing(&text[start..end]);
    if end <= host_start {
        return None;
    }

    let url = &text[start..end];
    let href = if www {
        format!("http://{url}")
    } else {
        url.to_owned()
    };
    Some(UrlMatch { start, end, href })
}

/// Length of the host name at the start of `data` and the number of dots in it.
///
/// Underscores are not allowed in the last two labels.
fn check_domain(data: &str) -> Option<(usize, usize)> {
    let mut dots = 0;
    let mut uscore1 = 0;
    let mut uscore2 = 0;

    for (i, ch) in data.char_indices() {
        if ch == '_' {
            uscore2 += 1;
        } else if ch == '.' {
            uscore1 = uscore2;
            uscore2 = 0;
            dots += 1;
        } else if !is_host_char(ch) && ch != '-' {
            return (uscore1 == 0 && uscore2 == 0).then_some((i, dots));
        }
    }

    (uscore1 == 0 && uscore2 == 0).then_some((data.len(), dots))
}

fn is_host_char(ch: char) -> bool {
    !ch.is_whitespace() && !ch.is_ascii_punctuation() && !ch.is_punctuation()
}

/// Length of `url` without trailing punctuation and unbalanced closing parens.
fn trim_trailing(url: &str) -> usize {
    let mut end = url.len();

    while let Some(last) = url[..end].chars().next_back() {
        match last {
            '?' | '!' | '.' | ',' | ':' | ';' | '*' | '_' | '~' | '\'' | '"' => end -= 1,
            ')' => {
                let opening = url[..end].matches('(').count();
                let closing = url[..end].matches(')').count();
                if closing <= opening {
                    break;
                }
                end -= 1;
            }
            _ => break,
        }
    }

    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn urls(text: &str) -> Vec<(&str, String)> {
        find_urls(text)
            .into_iter()
            .map(|url| (&text[url.start..url.end], url.href))
            .collect()
    }

    #[test]
    fn test_finds_scheme_urls() {
        assert_eq!(
            urls("See https://example.com/path?q=1 and http://localhost:3000."),
            vec![
                ("https://example.com/path?q=1", "https://example.com/path?q=1".to_owned()),
                ("http://localhost:3000", "http://localhost:3000".to_owned()),
            ]
        );
    }

    #[test]
    fn test_www_gets_http_href() {
        assert_eq!(
            urls("Visit www.rust-lang.org!"),
            vec![("www.rust-lang.org", "http://www.rust-lang.org".to_owned())]
        );
    }

    #[test]
    fn test_trailing_punctuation_excluded() {
        assert_eq!(urls("(see https://a.io/x)")[0].0, "https://a.io/x");
        assert_eq!(urls("https://a.io/wiki/Rust_(language)")[0].0, "https://a.io/wiki/Rust_(language)");
        assert_eq!(urls("\"https://a.io\",")[0].0, "https://a.io");
    }

    #[test]
    fn test_rejects_non_urls() {
        assert!(urls("xhttps://example.com").is_empty());
        assert!(urls("www. nothing").is_empty());
        assert!(urls("https:// nothing").is_empty());
        assert!(urls("www.a_b.c_d").is_empty());
    }

    #[test]
    fn test_linkify_tokens() {
        let mut inline = Token::new(TokenKind::Inline, "", 0);
        inline.children = vec![Token::text("Go to https://example.com now")];
        let mut tokens = vec![inline];
        linkify(&mut tokens);

        let children = &tokens[0].children;
        assert_eq!(children.len(), 5);
        assert_eq!(children[0], Token::text("Go to "));
        assert_eq!(children[1].attr_get("href"), Some("https://example.com"));
        assert_eq!(children[2], Token::text("https://example.com"));
        assert_eq!(children[3].kind, TokenKind::LinkClose);
        assert_eq!(children[4], Token::text(" now"));
    }

    #[test]
    fn test_skips_text_inside_links() {
        let mut inline = Token::new(TokenKind::Inline, "", 0);
        let mut open = Token::new(TokenKind::LinkOpen, "a", 1);
        open.attr_set("href", "https://example.com");
        inline.children = vec![
            open,
            Token::text("https://example.com"),
            Token::new(TokenKind::LinkClose, "a", -1),
            Token::html_inline("<a href=\"x\">"),
            Token::text("www.example.com"),
            Token::html_inline("</a>"),
        ];
        let mut tokens = vec![inline.clone()];
        linkify(&mut tokens);
        assert_eq!(tokens[0], inline);
    }
}
