//! Scope matching and trivia-insensitive search over a token slice.
//!
//! Everything here is a pure query: no function mutates or caches. Absence
//! (an unmatched bracket, an exhausted search) is `None`, never an error, so
//! callers can fall back or decline a rewrite locally.

use crate::token::Token;
use std::ops::Range;

/// Direction of a positional search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// A matched opening/closing pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeSpan {
    pub open: usize,
    pub close: usize,
}

impl ScopeSpan {
    /// Positions strictly between the brackets.
    pub fn interior(&self) -> Range<usize> {
        self.open + 1..self.close
    }

    pub fn is_empty(&self) -> bool {
        self.close == self.open + 1
    }
}

/// Find the closing token for the scope opened at `open`.
///
/// Scans forward from `open + 1` counting depth over every scope token. The
/// first closer at depth zero is the match, provided it is the counterpart
/// of the opener; a mismatched closer (`(` ended by `]`) is no match.
pub fn match_scope(tokens: &[Token], open: usize) -> Option<usize> {
    let expected = tokens.get(open)?.closing_scope()?;
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open + 1) {
        match token {
            Token::StartOfScope(_) => depth += 1,
            Token::EndOfScope(text) => {
                if depth == 0 {
                    return (text == expected).then_some(index);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

/// Find the opening token for the scope closed at `close`.
pub fn match_scope_backward(tokens: &[Token], close: usize) -> Option<usize> {
    let close_text = tokens.get(close)?.as_end_of_scope()?;
    let mut depth = 0usize;
    for index in (0..close).rev() {
        match &tokens[index] {
            Token::EndOfScope(_) => depth += 1,
            Token::StartOfScope(text) => {
                if depth == 0 {
                    return (crate::token::closing_for(text) == Some(close_text))
                        .then_some(index);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

/// Match the scope opened at `open` into a [`ScopeSpan`].
pub fn find_scope(tokens: &[Token], open: usize) -> Option<ScopeSpan> {
    match_scope(tokens, open).map(|close| ScopeSpan { open, close })
}

/// First non-trivia position strictly after `after`.
pub fn next_non_trivia(tokens: &[Token], after: usize) -> Option<usize> {
    index_of(tokens, Direction::Forward, after + 1..tokens.len(), |_| true)
}

/// Last non-trivia position strictly before `before`.
pub fn previous_non_trivia(tokens: &[Token], before: usize) -> Option<usize> {
    index_of(tokens, Direction::Backward, 0..before, |_| true)
}

/// Next non-trivia token after `after` that satisfies `predicate`.
pub fn next_matching(
    tokens: &[Token],
    after: usize,
    predicate: impl FnMut(&Token) -> bool,
) -> Option<usize> {
    index_of(tokens, Direction::Forward, after + 1..tokens.len(), predicate)
}

/// Lazy search within `bounds`, skipping trivia.
///
/// Trivia tokens are never offered to `predicate`. Bounds past the end of
/// the slice are clamped.
pub fn index_of(
    tokens: &[Token],
    direction: Direction,
    bounds: Range<usize>,
    mut predicate: impl FnMut(&Token) -> bool,
) -> Option<usize> {
    index_of_including_trivia(tokens, direction, bounds, |token| {
        !token.is_trivia() && predicate(token)
    })
}

/// Lazy search within `bounds` that also offers trivia to `predicate`.
pub fn index_of_including_trivia(
    tokens: &[Token],
    direction: Direction,
    bounds: Range<usize>,
    predicate: impl FnMut(&Token) -> bool,
) -> Option<usize> {
    let end = bounds.end.min(tokens.len());
    let start = bounds.start.min(end);
    let window = &tokens[start..end];
    let found = match direction {
        Direction::Forward => window.iter().position(predicate),
        Direction::Backward => window.iter().rposition(predicate),
    };
    found.map(|offset| start + offset)
}

/// First token between `open` and `close` (exclusive) satisfying
/// `predicate` at the top level of that scope.
///
/// Nested scopes are jumped over, so a comma inside `((A, B))` is not a
/// top-level comma of the outer parens. An unmatched nested opener ends the
/// search with no match.
pub fn index_in_scope(
    tokens: &[Token],
    open: usize,
    close: usize,
    mut predicate: impl FnMut(&Token) -> bool,
) -> Option<usize> {
    let mut index = open + 1;
    while index < close.min(tokens.len()) {
        let token = &tokens[index];
        if !token.is_trivia() && predicate(token) {
            return Some(index);
        }
        index = match token {
            Token::StartOfScope(_) => match_scope(tokens, index)? + 1,
            _ => index + 1,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn test_match_nested() {
        let tokens = tokenize("((a, b), c)");
        assert_eq!(match_scope(&tokens, 0), Some(tokens.len() - 1));
        assert_eq!(match_scope(&tokens, 1), Some(6));
    }

    #[test]
    fn test_match_backward_is_symmetric() {
        let tokens = tokenize("[a: (b, [c])]");
        for (open, token) in tokens.iter().enumerate() {
            if token.as_start_of_scope().is_some() {
                let close = match_scope(&tokens, open).unwrap();
                assert_eq!(match_scope_backward(&tokens, close), Some(open));
            }
        }
    }

    #[test]
    fn test_unterminated_scope_is_no_match() {
        let tokens = tokenize("(a, (b)");
        assert_eq!(match_scope(&tokens, 0), None);
    }

    #[test]
    fn test_mismatched_closer_is_no_match() {
        let tokens = vec![
            Token::open("("),
            Token::Identifier("a".to_string()),
            Token::close("]"),
        ];
        assert_eq!(match_scope(&tokens, 0), None);
        assert_eq!(match_scope_backward(&tokens, 2), None);
    }

    #[test]
    fn test_match_on_non_scope_token() {
        let tokens = tokenize("a");
        assert_eq!(match_scope(&tokens, 0), None);
        assert_eq!(match_scope(&tokens, 10), None);
    }

    #[test]
    fn test_next_non_trivia_skips_comments() {
        let tokens = tokenize("a /* note */ // more\n b");
        let next = next_non_trivia(&tokens, 0).unwrap();
        assert_eq!(tokens[next].text(), "b");
        assert_eq!(previous_non_trivia(&tokens, next), Some(0));
        assert_eq!(next_non_trivia(&tokens, next), None);
    }

    #[test]
    fn test_index_in_scope_ignores_nested_commas() {
        let tokens = tokenize("((Int, String))");
        let close = match_scope(&tokens, 0).unwrap();
        assert_eq!(index_in_scope(&tokens, 0, close, |t| t.is_delimiter(",")), None);
        let inner_close = match_scope(&tokens, 1).unwrap();
        assert!(index_in_scope(&tokens, 1, inner_close, |t| t.is_delimiter(",")).is_some());
    }

    #[test]
    fn test_index_of_backward_clamps_bounds() {
        let tokens = tokenize("a b c");
        let found = index_of(&tokens, Direction::Backward, 0..100, |_| true);
        assert_eq!(found, Some(tokens.len() - 1));
        let start = tokens.len() + 3;
        assert_eq!(index_of(&tokens, Direction::Forward, start..start + 1, |_| true), None);
    }
}
