//! Greedy line wrapping under a per-line character budget.

/// Wrap `text` into at most `max_lines` lines of roughly `char_budget`
/// characters.
///
/// Tokens are never split or dropped. Once `max_lines - 1` lines are closed,
/// every remaining token goes on the last line, which may then exceed the
/// budget. A single token longer than the budget keeps its own line.
pub fn wrap_lines(text: &str, char_budget: usize, max_lines: usize) -> Vec<String> {
    let max_lines = max_lines.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for token in text.split_whitespace() {
        let token_len = token.chars().count();

        if current.is_empty() {
            current.push_str(token);
            current_len = token_len;
            continue;
        }

        let can_break = lines.len() + 1 < max_lines;
        if can_break && current_len + 1 + token_len > char_budget {
            lines.push(std::mem::take(&mut current));
            current.push_str(token);
            current_len = token_len;
        } else {
            current.push(' ');
            current.push_str(token);
            current_len += 1 + token_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_on_one_line() {
        assert_eq!(wrap_lines("hello world", 20, 2), vec!["hello world"]);
    }

    #[test]
    fn test_breaks_at_budget() {
        let lines = wrap_lines("aaaa bbbb cccc", 9, 2);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn test_single_line_takes_everything() {
        let lines = wrap_lines("aaaa bbbb cccc dddd", 5, 1);
        assert_eq!(lines, vec!["aaaa bbbb cccc dddd"]);
    }

    #[test]
    fn test_last_line_overflows_budget() {
        // Known soft-limit violation: the final line absorbs the remainder.
        let lines = wrap_lines("a b c d e f g h i j k l", 3, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "a b");
        assert!(lines[1].chars().count() > 3);
    }

    #[test]
    fn test_long_token_kept_whole() {
        let lines = wrap_lines("hi supercalifragilistic yo", 10, 3);
        assert_eq!(lines, vec!["hi", "supercalifragilistic", "yo"]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // Each word is 5 characters but more bytes.
        let lines = wrap_lines("ăîșțâ ăîșțâ", 11, 2);
        assert_eq!(lines, vec!["ăîșțâ ăîșțâ"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(wrap_lines("   ", 10, 2).is_empty());
    }

    #[test]
    fn test_never_exceeds_max_lines() {
        let text = "one two three four five six seven eight nine ten";
        for max_lines in 1..5 {
            let lines = wrap_lines(text, 4, max_lines);
            assert!(lines.len() <= max_lines);
            assert_eq!(lines.join(" "), text);
        }
    }
}
