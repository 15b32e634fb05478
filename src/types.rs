//! Locating type expressions in a token slice.
//!
//! This is not a grammar: it only finds where a type written after an
//! annotation colon ends, which is all the type-aware rules need to build a
//! [`crate::range::LiveRange`] over it.

use crate::scope::{match_scope, next_non_trivia, previous_non_trivia};
use crate::token::{OperatorFixity, Token};

const EFFECTS: &[&str] = &["async", "throws", "rethrows"];

/// Last index of the type expression starting at `start`.
pub fn parse_type(tokens: &[Token], start: usize) -> Option<usize> {
    let mut end = parse_type_element(tokens, start)?;
    while let Some(next) = next_non_trivia(tokens, end) {
        let token = &tokens[next];
        if token.as_keyword().is_some_and(|word| EFFECTS.contains(&word)) {
            end = next;
            continue;
        }
        if token.is_operator("->") || token.is_operator("&") {
            // arrows are right-associative, so the rest is one type
            if let Some(rhs) = next_non_trivia(tokens, next) {
                if let Some(rhs_end) = parse_type(tokens, rhs) {
                    end = rhs_end;
                }
            }
        }
        break;
    }
    Some(end)
}

/// A single type without arrows: prefixes, a name or bracketed type, then
/// generic arguments, member access and optional markers.
fn parse_type_element(tokens: &[Token], start: usize) -> Option<usize> {
    let mut index = start;
    while tokens
        .get(index)?
        .as_keyword()
        .is_some_and(|word| word.starts_with('@') || matches!(word, "some" | "any" | "inout"))
    {
        index = next_non_trivia(tokens, index)?;
    }

    let mut end = match tokens.get(index)? {
        Token::StartOfScope(text) if text == "(" || text == "[" => match_scope(tokens, index)?,
        Token::Identifier(name) if is_type_name(name) => index,
        _ => return None,
    };

    loop {
        match tokens.get(end + 1) {
            Some(token) if token.is_start_of_scope("<") => end = match_scope(tokens, end + 1)?,
            Some(token)
                if token.is_operator(".")
                    && tokens
                        .get(end + 2)
                        .and_then(Token::as_identifier)
                        .is_some_and(is_type_name) =>
            {
                end += 2;
            }
            Some(Token::Operator(op, OperatorFixity::Postfix)) if op == "?" || op == "!" => {
                end += 1;
            }
            _ => break,
        }
    }
    Some(end)
}

fn is_type_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == '`')
}

/// `(start, end)` of the type written after the annotation colon at `colon`.
pub fn type_range_after(tokens: &[Token], colon: usize) -> Option<(usize, usize)> {
    let start = next_non_trivia(tokens, colon)?;
    let end = parse_type(tokens, start)?;
    Some((start, end))
}

/// Positions of every type-annotation colon: `let`/`var` declarations and
/// parameters of `func`, `init` and `subscript` declarations.
pub fn type_annotation_colons(tokens: &[Token]) -> Vec<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.is_delimiter(":"))
        .map(|(index, _)| index)
        .filter(|&colon| is_annotation_colon(tokens, colon))
        .collect()
}

fn is_annotation_colon(tokens: &[Token], colon: usize) -> bool {
    let Some(name) = previous_non_trivia(tokens, colon) else {
        return false;
    };
    if !tokens[name].as_identifier().is_some_and(is_type_name) {
        return false;
    }
    let Some(before) = previous_non_trivia(tokens, name) else {
        return false;
    };
    if tokens[before].is_keyword("let") || tokens[before].is_keyword("var") {
        return true;
    }
    enclosing_scope(tokens, colon).is_some_and(|open| is_parameter_clause(tokens, open))
}

/// Opening token of the innermost scope containing `index`.
fn enclosing_scope(tokens: &[Token], index: usize) -> Option<usize> {
    let mut depth = 0usize;
    for position in (0..index).rev() {
        match &tokens[position] {
            Token::EndOfScope(_) => depth += 1,
            Token::StartOfScope(_) if depth == 0 => return Some(position),
            Token::StartOfScope(_) => depth -= 1,
            _ => {}
        }
    }
    None
}

fn is_parameter_clause(tokens: &[Token], open: usize) -> bool {
    if !tokens[open].is_start_of_scope("(") {
        return false;
    }
    let Some(mut before) = previous_non_trivia(tokens, open) else {
        return false;
    };
    if tokens[before].is_keyword("init") || tokens[before].is_keyword("subscript") {
        return true;
    }
    // skip a generic parameter list: `func f<T>(...)`
    if tokens[before].is_end_of_scope(">") {
        let Some(generic_open) = crate::scope::match_scope_backward(tokens, before) else {
            return false;
        };
        let Some(name) = previous_non_trivia(tokens, generic_open) else {
            return false;
        };
        before = name;
    }
    tokens[before].as_identifier().is_some()
        && previous_non_trivia(tokens, before).is_some_and(|kw| tokens[kw].is_keyword("func"))
}
