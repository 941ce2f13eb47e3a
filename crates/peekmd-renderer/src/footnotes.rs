//! Footnote numbering and the footnote section.
//!
//! The tokenizer leaves footnote definitions where they appear in the source.
//! [`footnote_tail`] numbers references in order of first use, lifts the
//! referenced definitions out of the document and appends them as a single
//! footnote block with back-references.

use std::collections::HashMap;

use crate::token::{FootnoteMeta, Token, TokenKind};

#[derive(Default)]
struct Numbering {
    /// Footnote id by normalized label.
    ids: HashMap<String, usize>,
    /// Labels in id order.
    labels: Vec<String>,
    /// References seen per footnote id.
    counts: Vec<usize>,
}

fn normalize(label: &str) -> String {
    label.to_lowercase()
}

/// Number footnote references and move definitions to the end of the document.
pub(crate) fn footnote_tail(tokens: Vec<Token>) -> Vec<Token> {
    let has_footnotes = tokens.iter().any(|t| {
        t.kind == TokenKind::FootnoteOpen
            || t.children.iter().any(|c| c.kind == TokenKind::FootnoteRef)
    });
    if !has_footnotes {
        return tokens;
    }

    let (mut body, mut definitions) = split_definitions(tokens);

    let mut numbering = Numbering::default();
    number_references(&mut body, &definitions, &mut numbering);

    // Definitions may reference further footnotes, so the label list can grow
    // while it is being walked.
    let mut contents: Vec<Vec<Token>> = Vec::new();
    let mut next = 0;
    while next < numbering.labels.len() {
        let key = numbering.labels[next].clone();
        let mut content = definitions.remove(&key).unwrap_or_default();
        number_references(&mut content, &definitions, &mut numbering);
        contents.push(content);
        next += 1;
    }

    if contents.is_empty() {
        return body;
    }

    body.push(Token::block(TokenKind::FootnoteBlockOpen, "section", 1));
    for (id, mut content) in contents.into_iter().enumerate() {
        let label = numbering.labels[id].clone();
        let meta = |sub_id| FootnoteMeta {
            label: label.clone(),
            id,
            sub_id,
        };

        let mut open = Token::block(TokenKind::FootnoteOpen, "li", 1);
        open.footnote = Some(meta(0));
        body.push(open);

        let last_paragraph = match content.last() {
            Some(last) if last.kind == TokenKind::ParagraphClose => content.pop(),
            _ => None,
        };
        body.append(&mut content);
        for sub_id in 0..numbering.counts[id].max(1) {
            let mut anchor = Token::new(TokenKind::FootnoteAnchor, "", 0);
            anchor.footnote = Some(meta(sub_id));
            body.push(anchor);
        }
        body.extend(last_paragraph);

        let mut close = Token::block(TokenKind::FootnoteClose, "li", -1);
        close.footnote = Some(meta(0));
        body.push(close);
    }
    body.push(Token::block(TokenKind::FootnoteBlockClose, "section", -1));

    body
}

/// Separate definition bodies from the document. The first definition of a
/// label wins.
fn split_definitions(tokens: Vec<Token>) -> (Vec<Token>, HashMap<String, Vec<Token>>) {
    let mut body = Vec::with_capacity(tokens.len());
    let mut definitions: HashMap<String, Vec<Token>> = HashMap::new();
    let mut current: Option<(String, Vec<Token>)> = None;

    for token in tokens {
        match token.kind {
            TokenKind::FootnoteOpen => {
                let label = token.footnote.map(|meta| meta.label).unwrap_or_default();
                current = Some((normalize(&label), Vec::new()));
            }
            TokenKind::FootnoteClose => {
                if let Some((key, content)) = current.take() {
                    definitions.entry(key).or_insert(content);
                }
            }
            _ => match &mut current {
                Some((_, content)) => content.push(token),
                None => body.push(token),
            },
        }
    }

    (body, definitions)
}

fn number_references(
    tokens: &mut [Token],
    definitions: &HashMap<String, Vec<Token>>,
    numbering: &mut Numbering,
) {
    for token in tokens.iter_mut().filter(|t| t.kind == TokenKind::Inline) {
        for child in &mut token.children {
            if child.kind != TokenKind::FootnoteRef {
                continue;
            }
            let label = child
                .footnote
                .as_ref()
                .map(|meta| meta.label.clone())
                .unwrap_or_default();
            let key = normalize(&label);

            let id = match numbering.ids.get(&key).copied() {
                Some(id) => id,
                None if definitions.contains_key(&key) => {
                    let id = numbering.labels.len();
                    numbering.ids.insert(key.clone(), id);
                    numbering.labels.push(key);
                    numbering.counts.push(0);
                    id
                }
                None => {
                    *child = Token::text(format!("[^{label}]"));
                    continue;
                }
            };

            let sub_id = numbering.counts[id];
            numbering.counts[id] += 1;
            child.footnote = Some(FootnoteMeta { label, id, sub_id });
        }
    }
}
