//! `- [ ]` / `- [x]` task list items.

use std::sync::LazyLock;

use regex::Regex;

use crate::token::{Token, TokenKind};

static TASK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[([ xX])\]\s*").unwrap());

/// Convert bullet list items starting with a checkbox marker into task items.
///
/// Each bullet list only looks at its own items; nested lists are handled
/// when the loop reaches their own open token.
pub(crate) fn process_task_lists(tokens: &mut [Token]) {
    for list in 0..tokens.len() {
        if tokens[list].kind != TokenKind::BulletListOpen {
            continue;
        }

        let mut depth = 0usize;
        let mut converted = false;
        for idx in list..tokens.len() {
            match tokens[idx].kind {
                TokenKind::BulletListOpen => depth += 1,
                TokenKind::BulletListClose => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                TokenKind::ListItemOpen if depth == 1 => {
                    if convert_item(tokens, idx) {
                        converted = true;
                    }
                }
                _ => {}
            }
        }

        if converted {
            tokens[list].attr_join("class", "contains-task-list");
        }
    }
}

/// Convert one list item; returns whether it was a task item.
fn convert_item(tokens: &mut [Token], item: usize) -> bool {
    let Some(inline) = find_inline(tokens, item) else {
        return false;
    };

    let children = &mut tokens[inline].children;
    let Some(first) = children.first_mut().filter(|t| t.kind == TokenKind::Text) else {
        return false;
    };
    let Some(caps) = TASK_RE.captures(&first.content) else {
        return false;
    };
    let checked = &caps[1] != " ";
    let prefix_len = caps[0].len();

    first.content.drain(..prefix_len);
    let mut checkbox = Token::new(TokenKind::TaskCheckbox, "input", 0);
    if checked {
        checkbox.attr_set("checked", "");
    }
    children.insert(0, checkbox);

    tokens[item].attr_set("class", "task-list-item");
    true
}

/// First inline container of the item, stopping at the item's close.
fn find_inline(tokens: &[Token], item: usize) -> Option<usize> {
    tokens[item + 1..]
        .iter()
        .take_while(|t| t.kind != TokenKind::ListItemClose)
        .position(|t| t.kind == TokenKind::Inline)
        .map(|offset| item + 1 + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParserOptions;
    use crate::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    fn process(markdown: &str) -> Vec<Token> {
        let mut tokens = tokenize(markdown, &ParserOptions::default());
        process_task_lists(&mut tokens);
        tokens
    }

    #[test]
    fn test_converts_task_items() {
        let tokens = process("- [ ] todo\n- [x] done\n- [X] also");
        assert_eq!(tokens[0].attr_get("class"), Some("contains-task-list"));

        let items: Vec<&Token> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::ListItemOpen)
            .collect();
        assert!(
            items
                .iter()
                .all(|t| t.attr_get("class") == Some("task-list-item"))
        );

        let inlines: Vec<&Token> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Inline)
            .collect();
        assert_eq!(inlines[0].children[0].kind, TokenKind::TaskCheckbox);
        assert_eq!(inlines[0].children[0].attr_get("checked"), None);
        assert_eq!(inlines[0].children[1].content, "todo");
        assert_eq!(inlines[1].children[0].attr_get("checked"), Some(""));
        assert_eq!(inlines[2].children[0].attr_get("checked"), Some(""));
        assert_eq!(inlines[2].children[1].content, "also");
    }

    #[test]
    fn test_plain_list_untouched() {
        let tokens = process("- one\n- two");
        assert_eq!(tokens[0].attr_get("class"), None);
        assert!(tokens.iter().all(|t| t.attr_get("class").is_none()));
    }

    #[test]
    fn test_mixed_list_marks_only_task_items() {
        let tokens = process("- [x] done\n- plain");
        assert_eq!(tokens[0].attr_get("class"), Some("contains-task-list"));
        let items: Vec<Option<&str>> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::ListItemOpen)
            .map(|t| t.attr_get("class"))
            .collect();
        assert_eq!(items, vec![Some("task-list-item"), None]);
    }

    #[test]
    fn test_non_text_first_child_is_not_a_task() {
        let tokens = process("- **[ ]** bold\n- ![img](a.png) [ ] later");
        assert_eq!(tokens[0].attr_get("class"), None);
    }

    #[test]
    fn test_ordered_list_is_not_converted() {
        let tokens = process("1. [ ] first");
        assert!(tokens.iter().all(|t| t.kind != TokenKind::TaskCheckbox));
        assert!(
            tokens
                .iter()
                .flat_map(|t| &t.children)
                .all(|t| t.kind != TokenKind::TaskCheckbox)
        );
    }

    #[test]
    fn test_nested_lists_handled_independently() {
        let tokens = process("- outer\n  - [ ] inner\n- [x] second");
        let lists: Vec<&Token> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::BulletListOpen)
            .collect();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].attr_get("class"), Some("contains-task-list"));
        assert_eq!(lists[1].attr_get("class"), Some("contains-task-list"));

        let items: Vec<Option<&str>> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::ListItemOpen)
            .map(|t| t.attr_get("class"))
            .collect();
        assert_eq!(
            items,
            vec![None, Some("task-list-item"), Some("task-list-item")]
        );
    }

    #[test]
    fn test_missing_space_after_marker_still_matches() {
        let tokens = process("- [x]done");
        assert_eq!(tokens[2].children[1].content, "done");
    }
}
