use super::{Rule, RuleContext};
use crate::range::LiveRange;
use crate::scope::{index_of, match_scope, Direction};
use crate::shape::Classifier;
use crate::stream::{StreamError, TokenStream};
use crate::token::TokenKind;
use crate::types::{type_annotation_colons, type_range_after};
use tracing::trace;

/// Removes parentheses that wrap a whole type, and the extra pair around a
/// closure's parameter clause.
///
/// `let x: ((Int))` becomes `let x: Int`; `((Int, String)) -> Bool` becomes
/// `(Int, String) -> Bool`. Tuple parens are structural and always stay.
pub struct RedundantParens;

impl Rule for RedundantParens {
    fn name(&self) -> &'static str {
        "redundantParens"
    }

    fn help(&self) -> &'static str {
        "Remove redundant parentheses around types."
    }

    fn apply(&self, ctx: &mut RuleContext<'_>) -> Result<(), StreamError> {
        let stream = ctx.stream;
        let colons = type_annotation_colons(&stream.tokens());
        let anchors = colons
            .into_iter()
            .map(|colon| LiveRange::new(stream, colon, colon))
            .collect::<Result<Vec<_>, _>>()?;

        let classifier = Classifier::default();
        for anchor in &anchors {
            let colon = anchor.lower()?;
            let Some((start, end)) = type_range_after(&stream.tokens(), colon) else {
                continue;
            };
            let ty = LiveRange::new(stream, start, end)?;
            let first = ty.lower()?;
            let mut changed = unwrap_type(&classifier, &ty)?;
            changed |= unwrap_closure_parameters(&classifier, &ty)?;
            if changed {
                ctx.record(first);
            }
        }
        Ok(())
    }
}

/// Strip the parens `without_parens` would drop from the whole type.
fn unwrap_type(classifier: &Classifier, ty: &LiveRange<'_>) -> Result<bool, StreamError> {
    let inner = classifier.without_parens(ty)?.current_bounds()?;
    let outer = ty.current_bounds()?;
    if inner == outer {
        return Ok(false);
    }
    let stream = ty.stream();
    let keeps_comment = {
        let tokens = stream.tokens();
        tokens[*outer.start()..*inner.start()]
            .iter()
            .chain(&tokens[inner.end() + 1..=*outer.end()])
            .any(|token| token.kind() == TokenKind::Comment)
    };
    if keeps_comment {
        return Ok(false);
    }
    // trailing side first so the leading positions stay valid
    stream.remove(inner.end() + 1..=*outer.end())?;
    stream.remove(*outer.start()..=inner.start() - 1)?;
    trace!(?outer, ?inner, "unwrapped type");
    Ok(true)
}

/// Collapse `((A, B)) -> C` to `(A, B) -> C`, one pair at a time.
fn unwrap_closure_parameters(
    classifier: &Classifier,
    ty: &LiveRange<'_>,
) -> Result<bool, StreamError> {
    let stream = ty.stream();
    let mut changed = false;
    while classifier.classify(ty)? == crate::shape::TypeShape::Closure {
        let Some((open, close)) = parameter_clause(stream, ty)? else {
            break;
        };
        let clause = LiveRange::new(stream, open, close)?;
        let Some(inner) = classifier.unwrap_once(&clause)? else {
            break;
        };
        if !is_single_group(stream, &inner)? {
            break;
        }
        stream.remove(close..=close)?;
        stream.remove(open..=open)?;
        changed = true;
    }
    Ok(changed)
}

/// The outermost `(`…`)` of a closure type, after any attributes.
fn parameter_clause(
    stream: &TokenStream,
    ty: &LiveRange<'_>,
) -> Result<Option<(usize, usize)>, StreamError> {
    let bounds = ty.current_bounds()?;
    let tokens = stream.tokens();
    let open = index_of(
        &tokens,
        Direction::Forward,
        *bounds.start()..bounds.end() + 1,
        |token| token.is_start_of_scope("("),
    );
    Ok(open.and_then(|open| Some((open, match_scope(&tokens, open)?))))
}

/// Whether the range is exactly one parenthesized group.
fn is_single_group(stream: &TokenStream, range: &LiveRange<'_>) -> Result<bool, StreamError> {
    let bounds = range.current_bounds()?;
    let tokens = stream.tokens();
    Ok(tokens[*bounds.start()].is_start_of_scope("(")
        && match_scope(&tokens, *bounds.start()) == Some(*bounds.end()))
}
