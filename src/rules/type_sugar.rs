use super::{Rule, RuleContext};
use crate::range::LiveRange;
use crate::scope::{index_in_scope, index_of_including_trivia, match_scope, Direction};
use crate::shape::TypeShape;
use crate::stream::{StreamError, TokenStream};
use crate::token::{OperatorFixity, Token};

/// Prefers shorthand type syntax: `Array<T>` becomes `[T]`,
/// `Dictionary<K, V>` becomes `[K: V]` and `Optional<T>` becomes `T?`.
pub struct TypeSugar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sugar {
    Array,
    Dictionary,
    Optional,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    sugar: Sugar,
    name: usize,
    open: usize,
    close: usize,
}

impl Rule for TypeSugar {
    fn name(&self) -> &'static str {
        "typeSugar"
    }

    fn help(&self) -> &'static str {
        "Prefer shorthand syntax for Arrays, Dictionaries and Optionals."
    }

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Result<(), StreamError> {
        let stream = ctx.stream;
        let mut from = 0;
        loop {
            let next = next_candidate(&stream.tokens(), from);
            let Some(candidate) = next else {
                break;
            };
            from = candidate.name + 1;
            if candidate.sugar == Sugar::Optional && !ctx.options.sugar_optionals {
                continue;
            }
            let comma = {
                let tokens = stream.tokens();
                match argument_separator(&tokens, &candidate) {
                    Some(comma) => comma,
                    None => continue,
                }
            };
            ctx.record(candidate.name);
            let generic = LiveRange::new(stream, candidate.name, candidate.close)?;
            trim_arguments(stream, candidate.open, candidate.close)?;
            let close = generic.upper()?;
            match candidate.sugar {
                Sugar::Array => sugar_collection(stream, candidate.name, close, None)?,
                Sugar::Dictionary => sugar_collection(stream, candidate.name, close, comma)?,
                Sugar::Optional => sugar_optional(stream, candidate.name, close)?,
            }
            // the sugared type now starts at `name`; nested generics may too
            from = candidate.name;
        }
        Ok(())
    }
}

fn next_candidate(tokens: &[Token], from: usize) -> Option<Candidate> {
    (from..tokens.len()).find_map(|name| {
        let sugar = match tokens[name].as_identifier()? {
            "Array" => Sugar::Array,
            "Dictionary" => Sugar::Dictionary,
            "Optional" => Sugar::Optional,
            _ => return None,
        };
        // `Swift.Array<T>` cannot lose its name
        if name > 0 && tokens[name - 1].is_operator(".") {
            return None;
        }
        let open = name + 1;
        if !tokens.get(open)?.is_start_of_scope("<") {
            return None;
        }
        let close = match_scope(tokens, open)?;
        Some(Candidate {
            sugar,
            name,
            open,
            close,
        })
    })
}

/// The top-level comma of the arguments: `Some(None)` for a single argument,
/// `Some(Some(comma))` for a key/value pair, `None` when the arity is wrong.
fn argument_separator(tokens: &[Token], candidate: &Candidate) -> Option<Option<usize>> {
    let (open, close) = (candidate.open, candidate.close);
    index_of_including_trivia(tokens, Direction::Forward, open + 1..close, |t| !t.is_trivia())?;
    let comma = index_in_scope(tokens, open, close, |t| t.is_delimiter(","));
    let second = comma.and_then(|comma| index_in_scope(tokens, comma, close, |t| t.is_delimiter(",")));
    match (candidate.sugar, comma, second) {
        (Sugar::Array | Sugar::Optional, None, _) => Some(None),
        (Sugar::Dictionary, Some(comma), None) => Some(Some(comma)),
        _ => None,
    }
}

/// Drop spaces and line breaks just inside `<` and `>`.
fn trim_arguments(stream: &TokenStream, open: usize, close: usize) -> Result<(), StreamError> {
    let (first, last) = {
        let tokens = stream.tokens();
        let solid = |t: &Token| !t.is_space_or_linebreak();
        let first = index_of_including_trivia(&tokens, Direction::Forward, open + 1..close, solid);
        let last = index_of_including_trivia(&tokens, Direction::Backward, open + 1..close, solid);
        (first.unwrap_or(close), last.unwrap_or(open))
    };
    if last + 1 < close {
        stream.remove(last + 1..=close - 1)?;
    }
    if first > open + 1 {
        stream.remove(open + 1..=first - 1)?;
    }
    Ok(())
}

/// `Array<T>` or `Dictionary<K, V>` (with `comma`) to bracket syntax.
fn sugar_collection(
    stream: &TokenStream,
    name: usize,
    close: usize,
    comma: Option<usize>,
) -> Result<(), StreamError> {
    if let Some(comma) = comma {
        // the comma only moves if leading argument trivia was trimmed
        let comma = index_in_scope(&stream.tokens(), name + 1, close, |t| t.is_delimiter(","))
            .unwrap_or(comma);
        stream.replace_token(comma, Token::delimiter(":"))?;
    }
    stream.replace_token(close, Token::close("]"))?;
    stream.replace_token(name + 1, Token::open("["))?;
    stream.remove_token(name)?;
    Ok(())
}

fn sugar_optional(stream: &TokenStream, name: usize, close: usize) -> Result<(), StreamError> {
    let open = name + 1;
    let wrapped = LiveRange::new(stream, open + 1, close - 1)?;
    let postfix = Token::Operator("?".to_string(), OperatorFixity::Postfix);
    if needs_parens(&wrapped)? {
        stream.replace_token(close, Token::close(")"))?;
        stream.replace_token(open, Token::open("("))?;
        stream.insert(close + 1, [postfix])?;
    } else {
        stream.replace_token(close, postfix)?;
        stream.remove_token(open)?;
    }
    stream.remove_token(name)?;
    Ok(())
}

/// Closures, compositions and `some`/`any` types bind looser than `?`.
fn needs_parens(wrapped: &LiveRange<'_>) -> Result<bool, StreamError> {
    if wrapped.shape()? == TypeShape::Closure {
        return Ok(true);
    }
    let bounds = wrapped.current_bounds()?;
    let tokens = wrapped.stream().tokens();
    let (lower, upper) = (*bounds.start(), *bounds.end());
    let existential = tokens[lower].is_keyword("some") || tokens[lower].is_keyword("any");
    let composition = tokens[lower..=upper]
        .iter()
        .any(|t| t.is_operator("&") || t.is_operator("->"));
    Ok(existential || composition)
}
