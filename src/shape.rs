//! Structural classification of type expressions.
//!
//! A [`Classifier`] looks at the current bounds of a [`LiveRange`] and
//! reports its [`TypeShape`]. Nothing is cached: the shape is recomputed
//! from the stream on every call, so it is always a function of the range's
//! current content.

use crate::lexer;
use crate::range::LiveRange;
use crate::scope::{index_in_scope, index_of, match_scope, next_non_trivia, Direction};
use crate::stream::StreamError;
use crate::token::Token;
use std::fmt;

/// Structural shape of a type expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Scalar,
    Tuple,
    Array,
    Dictionary,
    Closure,
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeShape::Scalar => "scalar",
            TypeShape::Tuple => "tuple",
            TypeShape::Array => "array",
            TypeShape::Dictionary => "dictionary",
            TypeShape::Closure => "closure",
        };
        f.write_str(name)
    }
}

/// Decides whether the token at an index opens a closure type.
///
/// The slice handed to the probe ends at the classified range's upper
/// bound, so it never sees tokens past the range.
pub type ClosureProbe = fn(&[Token], usize) -> bool;

#[derive(Clone, Copy)]
pub struct Classifier {
    closure_probe: ClosureProbe,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(lexer::is_start_of_closure_type)
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier").finish_non_exhaustive()
    }
}

impl Classifier {
    pub fn new(closure_probe: ClosureProbe) -> Self {
        Self { closure_probe }
    }

    pub fn classify(&self, range: &LiveRange<'_>) -> Result<TypeShape, StreamError> {
        let bounds = range.current_bounds()?;
        let tokens = range.stream().tokens();
        Ok(self.classify_tokens(&tokens, *bounds.start(), *bounds.end()))
    }

    /// Classify `tokens[lower..=upper]`.
    ///
    /// Checks run in order and the first hit wins: tuple, array or
    /// dictionary, closure, then scalar.
    pub fn classify_tokens(&self, tokens: &[Token], lower: usize, upper: usize) -> TypeShape {
        if upper >= tokens.len() || lower > upper {
            return TypeShape::Scalar;
        }
        let visible = &tokens[..=upper];
        let Some(start) = index_of(visible, Direction::Forward, lower..upper + 1, |_| true) else {
            return TypeShape::Scalar;
        };
        if is_tuple(visible, start, lower) {
            TypeShape::Tuple
        } else if let Some(shape) = bracket_shape(visible, start) {
            shape
        } else if (self.closure_probe)(visible, start) {
            TypeShape::Closure
        } else {
            TypeShape::Scalar
        }
    }

    /// Strip redundant wrapping parentheses.
    ///
    /// Tuples come back unchanged since their parens are structural. A range
    /// that is exactly one `(`…`)` pair around a non-empty interior is
    /// replaced by a range over the trimmed interior and stripped again, so
    /// `((Int))` becomes `Int`. The result is a new range registered with
    /// the same stream.
    pub fn without_parens<'s>(&self, range: &LiveRange<'s>) -> Result<LiveRange<'s>, StreamError> {
        if self.classify(range)? == TypeShape::Tuple {
            return Ok(range.clone());
        }
        match self.unwrap_once(range)? {
            Some(inner) => self.without_parens(&inner),
            None => Ok(range.clone()),
        }
    }

    /// The trimmed interior of a range that is exactly one paren pair.
    ///
    /// Returns `None` when the range does not start with `(`, its match is
    /// not the range's last token, or the interior is only trivia. Unlike
    /// [`Classifier::without_parens`] this also unwraps tuples.
    pub fn unwrap_once<'s>(
        &self,
        range: &LiveRange<'s>,
    ) -> Result<Option<LiveRange<'s>>, StreamError> {
        let bounds = range.current_bounds()?;
        let (lower, upper) = (*bounds.start(), *bounds.end());
        let interior = {
            let tokens = range.stream().tokens();
            if !tokens[lower].is_start_of_scope("(") || match_scope(&tokens, lower) != Some(upper) {
                return Ok(None);
            }
            let first = index_of(&tokens, Direction::Forward, lower + 1..upper, |_| true);
            let last = index_of(&tokens, Direction::Backward, lower + 1..upper, |_| true);
            first.zip(last)
        };
        match interior {
            Some((first, last)) => Ok(Some(LiveRange::new(range.stream(), first, last)?)),
            None => Ok(None),
        }
    }
}

/// `(`…`)` with a top-level comma that closes the range, optionally
/// followed by a postfix `?`.
fn is_tuple(tokens: &[Token], start: usize, lower: usize) -> bool {
    if !tokens[start].is_start_of_scope("(") {
        return false;
    }
    let Some(close) = match_scope(tokens, start) else {
        return false;
    };
    let Some(last) = index_of(tokens, Direction::Backward, lower..tokens.len(), |_| true) else {
        return false;
    };
    let ends_range = close == last
        || (next_non_trivia(tokens, close) == Some(last) && tokens[last].is_postfix("?"));
    ends_range && index_in_scope(tokens, start, close, |t| t.is_delimiter(",")).is_some()
}

/// Array or dictionary for a non-empty `[`…`]`; `[]` is neither.
fn bracket_shape(tokens: &[Token], start: usize) -> Option<TypeShape> {
    if !tokens[start].is_start_of_scope("[") {
        return None;
    }
    let close = match_scope(tokens, start)?;
    index_of(tokens, Direction::Forward, start + 1..close, |_| true)?;
    if index_in_scope(tokens, start, close, |t| t.is_delimiter(":")).is_some() {
        Some(TypeShape::Dictionary)
    } else {
        Some(TypeShape::Array)
    }
}

impl<'s> LiveRange<'s> {
    /// Shape of the current content, using the lexer's closure probe.
    pub fn shape(&self) -> Result<TypeShape, StreamError> {
        Classifier::default().classify(self)
    }

    pub fn is_tuple(&self) -> Result<bool, StreamError> {
        Ok(self.shape()? == TypeShape::Tuple)
    }

    pub fn is_closure(&self) -> Result<bool, StreamError> {
        Ok(self.shape()? == TypeShape::Closure)
    }

    /// See [`Classifier::without_parens`].
    pub fn without_parens(&self) -> Result<LiveRange<'s>, StreamError> {
        Classifier::default().without_parens(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::TokenStream;

    fn whole(stream: &TokenStream) -> LiveRange<'_> {
        LiveRange::new(stream, 0, stream.len() - 1).unwrap()
    }

    fn shape_of(source: &str) -> TypeShape {
        let stream = TokenStream::from_source(source);
        let range = whole(&stream);
        range.shape().unwrap()
    }

    fn stripped(source: &str) -> String {
        let stream = TokenStream::from_source(source);
        let range = whole(&stream);
        let result = range.without_parens().unwrap();
        result.text().unwrap()
    }

    #[test]
    fn test_shapes() {
        assert_eq!(shape_of("(Int, String)"), TypeShape::Tuple);
        assert_eq!(shape_of("(Int)"), TypeShape::Scalar);
        assert_eq!(shape_of("[Int]"), TypeShape::Array);
        assert_eq!(shape_of("[String: Int]"), TypeShape::Dictionary);
        assert_eq!(shape_of("() -> Void"), TypeShape::Closure);
        assert_eq!(shape_of("Int"), TypeShape::Scalar);
    }

    #[test]
    fn test_optional_tuple() {
        assert_eq!(shape_of("(Int, String)?"), TypeShape::Tuple);
        assert_eq!(shape_of("(Int, String)!"), TypeShape::Scalar);
    }

    #[test]
    fn test_closure_taking_tuple_is_not_tuple() {
        assert_eq!(shape_of("(Int, String) -> Bool"), TypeShape::Closure);
    }

    #[test]
    fn test_nested_commas_do_not_make_tuple() {
        assert_eq!(shape_of("((Int, String))"), TypeShape::Scalar);
        assert_eq!(shape_of("[(Int, String)]"), TypeShape::Array);
        assert_eq!(shape_of("[[String: Int]]"), TypeShape::Array);
    }

    #[test]
    fn test_empty_brackets_are_scalar() {
        assert_eq!(shape_of("[]"), TypeShape::Scalar);
        assert_eq!(shape_of("[ ]"), TypeShape::Scalar);
    }

    #[test]
    fn test_unterminated_scope_falls_back_to_scalar() {
        assert_eq!(shape_of("(Int, String"), TypeShape::Scalar);
        assert_eq!(shape_of("[Int"), TypeShape::Scalar);
    }

    #[test]
    fn test_leading_trivia_skipped() {
        assert_eq!(shape_of("  [Int]"), TypeShape::Array);
    }

    #[test]
    fn test_probe_cannot_see_past_range() {
        let stream = TokenStream::from_source("(Int) -> Void");
        let params = LiveRange::new(&stream, 0, 2).unwrap();
        assert_eq!(params.text().unwrap(), "(Int)");
        assert_eq!(params.shape().unwrap(), TypeShape::Scalar);
    }

    #[test]
    fn test_custom_probe() {
        fn never(_: &[Token], _: usize) -> bool {
            false
        }
        let stream = TokenStream::from_source("() -> Void");
        let range = whole(&stream);
        let classifier = Classifier::new(never);
        assert_eq!(classifier.classify(&range).unwrap(), TypeShape::Scalar);
    }

    #[test]
    fn test_without_parens() {
        assert_eq!(stripped("(Int)"), "Int");
        assert_eq!(stripped("((Int))"), "Int");
        assert_eq!(stripped("( Int )"), "Int");
        assert_eq!(stripped("(Int, String)"), "(Int, String)");
        assert_eq!(stripped("((Int, String))"), "(Int, String)");
        assert_eq!(stripped("(Int)?"), "(Int)?");
        assert_eq!(stripped("()"), "()");
        assert_eq!(stripped("(() -> Void)"), "() -> Void");
    }

    #[test]
    fn test_without_parens_is_idempotent() {
        for source in ["(Int)", "((Int))", "((Int, String))", "(Int) -> Void", "[(Int)]"] {
            let stream = TokenStream::from_source(source);
            let range = whole(&stream);
            let once = range.without_parens().unwrap();
            let twice = once.without_parens().unwrap();
            assert_eq!(once.text().unwrap(), twice.text().unwrap(), "{source}");
            assert_eq!(once.current_bounds().unwrap(), twice.current_bounds().unwrap());
        }
    }

    #[test]
    fn test_collapsed_range_cannot_be_classified() {
        let stream = TokenStream::from_source("Int");
        let range = whole(&stream);
        stream.remove(0..=0).unwrap();
        assert_eq!(range.shape(), Err(StreamError::OutOfBounds));
        assert!(range.without_parens().is_err());
    }
}
