//! Quote-like literal scanning
//!
//! Recognizes `'...'`, `"..."`, `q{...}` and `qq{...}` at the start of the
//! input. Any non-word, non-space character can delimit `q`/`qq` literals;
//! bracket delimiters nest. Backslash escapes are stepped over but left in the
//! body untouched.

/// A quote-like literal found at the start of the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteLike<'a> {
    /// `""` for plain quotes, otherwise `q` or `qq`
    pub operator: &'a str,
    pub open: &'a str,
    pub body: &'a str,
    pub close: &'a str,
    /// Total bytes consumed
    pub len: usize,
}

fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        other => other,
    }
}

/// Scan a quote-like literal at the start of `input`
pub fn scan(input: &str) -> Option<QuoteLike<'_>> {
    let (operator, rest) = if input.starts_with('\'') || input.starts_with('"') {
        ("", input)
    } else if let Some(rest) = input.strip_prefix("qq") {
        ("qq", rest)
    } else if let Some(rest) = input.strip_prefix('q') {
        ("q", rest)
    } else {
        return None;
    };

    let open = rest.chars().next()?;
    if !operator.is_empty() && (open.is_alphanumeric() || open == '_' || open.is_whitespace()) {
        return None;
    }

    let close = closing_for(open);
    let body_start = operator.len() + open.len_utf8();
    let mut depth = 0usize;
    let mut chars = input[body_start..].char_indices();

    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == close && depth == 0 {
            let body_end = body_start + i;
            let end = body_end + c.len_utf8();
            return Some(QuoteLike {
                operator,
                open: &input[operator.len()..body_start],
                body: &input[body_start..body_end],
                close: &input[body_end..end],
                len: end,
            });
        } else if c == close {
            depth -= 1;
        } else if c == open && open != close {
            depth += 1;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_quoted() {
        let q = scan(r#""this stuff" rest"#).unwrap();
        assert_eq!(q.operator, "");
        assert_eq!(q.open, "\"");
        assert_eq!(q.body, "this stuff");
        assert_eq!(q.close, "\"");
        assert_eq!(q.len, 12);
    }

    #[test]
    fn test_single_quoted_keeps_escapes() {
        let q = scan(r"'it\'s' x").unwrap();
        assert_eq!(q.body, r"it\'s");
        assert_eq!(q.len, 7);
    }

    #[test]
    fn test_q_with_nested_brackets() {
        let q = scan("q{a {b} c}!").unwrap();
        assert_eq!(q.operator, "q");
        assert_eq!(q.open, "{");
        assert_eq!(q.body, "a {b} c");
        assert_eq!(q.close, "}");
        assert_eq!(q.len, 10);
    }

    #[test]
    fn test_qq_with_symmetric_delimiter() {
        let q = scan("qq|x y|").unwrap();
        assert_eq!(q.operator, "qq");
        assert_eq!(q.body, "x y");
    }

    #[test]
    fn test_words_starting_with_q_are_not_quotes() {
        assert_eq!(scan("quit"), None);
        assert_eq!(scan("q x"), None);
    }

    #[test]
    fn test_unterminated() {
        assert_eq!(scan("'open"), None);
        assert_eq!(scan(""), None);
    }
}
