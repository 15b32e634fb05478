use super::{Rule, RuleContext};
use crate::range::LiveRange;
use crate::scope::index_in_scope;
use crate::shape::{Classifier, TypeShape};
use crate::stream::{StreamError, TokenStream};
use crate::token::Token;
use crate::types::{type_annotation_colons, type_range_after};

/// `name: Type` and `[Key: Value]`: no space before the colon, exactly one
/// after it.
pub struct TypeColonSpacing;

impl Rule for TypeColonSpacing {
    fn name(&self) -> &'static str {
        "typeColonSpacing"
    }

    fn help(&self) -> &'static str {
        "Remove space before and add a single space after type colons."
    }

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Result<(), StreamError> {
        let stream = ctx.stream;
        let anchors = type_colons(stream)?
            .into_iter()
            .map(|colon| LiveRange::new(stream, colon, colon))
            .collect::<Result<Vec<_>, _>>()?;
        for anchor in &anchors {
            let colon = anchor.lower()?;
            let (before, after) = {
                let tokens = stream.tokens();
                (space_before(&tokens, colon), space_after(&tokens, colon))
            };
            if before.is_none() && after.is_none() {
                continue;
            }
            ctx.record(colon);
            match after {
                Some(Fix::Insert) => {
                    stream.insert(colon + 1, [Token::space()])?;
                }
                Some(Fix::Normalize) => {
                    stream.replace_token(colon + 1, Token::space())?;
                }
                None => {}
            }
            if before.is_some() {
                stream.remove(colon - 1..=colon - 1)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fix {
    Insert,
    Normalize,
}

/// Annotation colons plus the colon of every dictionary-shaped `[K: V]`
/// inside an annotated type. Brackets in expressions (literals, subscripts)
/// are never touched.
fn type_colons(stream: &TokenStream) -> Result<Vec<usize>, StreamError> {
    let (mut colons, brackets) = {
        let tokens = stream.tokens();
        let annotations = type_annotation_colons(&tokens);
        let types: Vec<(usize, usize)> = annotations
            .iter()
            .filter_map(|&colon| type_range_after(&tokens, colon))
            .collect();
        let brackets: Vec<(usize, usize)> = tokens
            .iter()
            .enumerate()
            .filter(|(open, token)| {
                token.is_start_of_scope("[")
                    && types.iter().any(|&(start, end)| (start..=end).contains(open))
            })
            .filter_map(|(open, _)| Some((open, crate::scope::match_scope(&tokens, open)?)))
            .collect();
        (annotations, brackets)
    };
    let classifier = Classifier::default();
    for (open, close) in brackets {
        let range = LiveRange::new(stream, open, close)?;
        if classifier.classify(&range)? != TypeShape::Dictionary {
            continue;
        }
        if let Some(colon) = index_in_scope(&stream.tokens(), open, close, |t| t.is_delimiter(":")) {
            colons.push(colon);
        }
    }
    colons.sort_unstable();
    colons.dedup();
    Ok(colons)
}

/// A removable space directly before the colon (not indentation).
fn space_before(tokens: &[Token], colon: usize) -> Option<()> {
    let previous = tokens.get(colon.checked_sub(1)?)?;
    if !matches!(previous, Token::Space(_)) {
        return None;
    }
    let start_of_line = colon < 2 || tokens[colon - 2].is_linebreak();
    (!start_of_line).then_some(())
}

fn space_after(tokens: &[Token], colon: usize) -> Option<Fix> {
    match tokens.get(colon + 1) {
        Some(Token::Space(text)) if text != " " => {
            // trailing whitespace before a line break is left alone
            match tokens.get(colon + 2) {
                Some(next) if next.is_linebreak() => None,
                _ => Some(Fix::Normalize),
            }
        }
        Some(Token::Space(_) | Token::Linebreak(_) | Token::Comment(_)) | None => None,
        Some(_) => Some(Fix::Insert),
    }
}
