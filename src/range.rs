//! Self-adjusting references to a contiguous run of tokens.

use crate::stream::{RangeHandle, StreamError, TokenStream};
use crate::token::{join_text, Token};
use std::fmt;
use std::ops::RangeInclusive;

/// An inclusive token interval that follows edits to its stream.
///
/// The range registers itself with the stream on construction and releases
/// its slot when dropped. Bounds are never cached here: every read resolves
/// them again from the stream, and a range whose tokens were all removed
/// reports [`StreamError::OutOfBounds`].
///
/// Equality compares the current token content, not positions.
pub struct LiveRange<'s> {
    stream: &'s TokenStream,
    handle: RangeHandle,
}

impl<'s> LiveRange<'s> {
    /// Register `[lower, upper]` with `stream`.
    pub fn new(stream: &'s TokenStream, lower: usize, upper: usize) -> Result<Self, StreamError> {
        let handle = stream.register(lower, upper)?;
        Ok(Self { stream, handle })
    }

    pub fn stream(&self) -> &'s TokenStream {
        self.stream
    }

    /// Up-to-date inclusive bounds.
    pub fn current_bounds(&self) -> Result<RangeInclusive<usize>, StreamError> {
        let (lower, upper) = self.stream.bounds(self.handle)?;
        Ok(lower..=upper)
    }

    pub fn lower(&self) -> Result<usize, StreamError> {
        Ok(*self.current_bounds()?.start())
    }

    pub fn upper(&self) -> Result<usize, StreamError> {
        Ok(*self.current_bounds()?.end())
    }

    /// A new range over `[lower, upper]`, which must lie within this one.
    pub fn narrowed(&self, lower: usize, upper: usize) -> Result<LiveRange<'s>, StreamError> {
        let bounds = self.current_bounds()?;
        if lower < *bounds.start() || upper > *bounds.end() || lower > upper {
            return Err(StreamError::InvalidSpan {
                lower,
                upper,
                len: self.stream.len(),
            });
        }
        LiveRange::new(self.stream, lower, upper)
    }

    pub fn is_collapsed(&self) -> bool {
        self.current_bounds().is_err()
    }

    /// The tokens the range currently covers.
    pub fn tokens(&self) -> Result<Vec<Token>, StreamError> {
        let bounds = self.current_bounds()?;
        Ok(self.stream.tokens()[bounds].to_vec())
    }

    /// Source text of the covered tokens.
    pub fn text(&self) -> Result<String, StreamError> {
        let bounds = self.current_bounds()?;
        Ok(join_text(&self.stream.tokens()[bounds]))
    }
}

impl Clone for LiveRange<'_> {
    /// The copy gets its own slot and moves independently afterwards.
    fn clone(&self) -> Self {
        Self {
            stream: self.stream,
            handle: self.stream.duplicate(self.handle),
        }
    }
}

impl Drop for LiveRange<'_> {
    fn drop(&mut self) {
        self.stream.release(self.handle);
    }
}

impl PartialEq for LiveRange<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self.tokens(), other.tokens()) {
            (Ok(mine), Ok(theirs)) => mine == theirs,
            _ => false,
        }
    }
}

impl fmt::Debug for LiveRange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current_bounds() {
            Ok(bounds) => f
                .debug_struct("LiveRange")
                .field("lower", bounds.start())
                .field("upper", bounds.end())
                .finish(),
            Err(_) => f.write_str("LiveRange(collapsed)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_is_scoped() {
        let stream = TokenStream::from_source("a b c");
        {
            let _first = LiveRange::new(&stream, 0, 2).unwrap();
            let _second = LiveRange::new(&stream, 2, 4).unwrap();
            assert_eq!(stream.live_ranges(), 2);
        }
        assert_eq!(stream.live_ranges(), 0);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let stream = TokenStream::from_source("a b");
        assert!(matches!(
            LiveRange::new(&stream, 2, 1),
            Err(StreamError::InvalidSpan { .. })
        ));
        assert!(LiveRange::new(&stream, 0, 3).is_err());
        assert_eq!(stream.live_ranges(), 0);
    }

    #[test]
    fn test_follows_insertions() {
        let stream = TokenStream::from_source("x: Int");
        let range = LiveRange::new(&stream, 3, 3).unwrap();
        stream
            .insert(0, [Token::Keyword("let".to_string()), Token::space()])
            .unwrap();
        assert_eq!(range.current_bounds().unwrap(), 5..=5);
        assert_eq!(range.text().unwrap(), "Int");
    }

    #[test]
    fn test_collapse_is_out_of_bounds() {
        let stream = TokenStream::from_source("let x: Int = 1");
        let range = LiveRange::new(&stream, 5, 5).unwrap();
        assert_eq!(range.text().unwrap(), "Int");
        stream.remove(3..=6).unwrap();
        assert!(range.is_collapsed());
        assert_eq!(range.current_bounds(), Err(StreamError::OutOfBounds));
        assert_eq!(range.tokens(), Err(StreamError::OutOfBounds));
        assert_eq!(range.text(), Err(StreamError::OutOfBounds));
    }

    #[test]
    fn test_clone_moves_independently() {
        let stream = TokenStream::from_source("a b c");
        let original = LiveRange::new(&stream, 2, 4).unwrap();
        let copy = original.clone();
        assert_eq!(stream.live_ranges(), 2);
        drop(original);
        stream.remove(0..=1).unwrap();
        assert_eq!(copy.current_bounds().unwrap(), 0..=2);
        assert_eq!(copy.text().unwrap(), "b c");
    }

    #[test]
    fn test_equality_is_by_content() {
        let stream = TokenStream::from_source("Int + Int");
        let left = LiveRange::new(&stream, 0, 0).unwrap();
        let right = LiveRange::new(&stream, 4, 4).unwrap();
        assert_eq!(left, right);

        let other = TokenStream::from_source("Int");
        let elsewhere = LiveRange::new(&other, 0, 0).unwrap();
        assert_eq!(left, elsewhere);

        stream.replace_token(0, Token::Identifier("Bool".to_string())).unwrap();
        let again = LiveRange::new(&stream, 0, 0).unwrap();
        assert_eq!(again.current_bounds().unwrap(), left.current_bounds().unwrap());
        assert_ne!(again, right);
    }

    #[test]
    fn test_same_bounds_different_content_unequal() {
        let ints = TokenStream::from_source("Int + x");
        let bools = TokenStream::from_source("Bool + x");
        let left = LiveRange::new(&ints, 0, 0).unwrap();
        let right = LiveRange::new(&bools, 0, 0).unwrap();
        assert_eq!(left.current_bounds().unwrap(), right.current_bounds().unwrap());
        assert_ne!(left, right);

        let tail = LiveRange::new(&bools, 1, 4).unwrap();
        let same_tail = LiveRange::new(&ints, 1, 4).unwrap();
        assert_eq!(tail, same_tail);
        bools.replace_token(4, Token::Identifier("y".to_string())).unwrap();
        assert_eq!(tail.current_bounds().unwrap(), same_tail.current_bounds().unwrap());
        assert_ne!(tail, same_tail);
    }

    #[test]
    fn test_narrowed_stays_inside() {
        let stream = TokenStream::from_source("(Int, String)");
        let outer = LiveRange::new(&stream, 0, 5).unwrap();
        let inner = outer.narrowed(1, 4).unwrap();
        assert_eq!(inner.text().unwrap(), "Int, String");
        assert!(outer.narrowed(0, 6).is_err());
        assert!(inner.narrowed(0, 2).is_err());
    }

    #[test]
    fn test_debug_output() {
        let stream = TokenStream::from_source("a");
        let range = LiveRange::new(&stream, 0, 0).unwrap();
        assert_eq!(format!("{range:?}"), "LiveRange { lower: 0, upper: 0 }");
        stream.remove(0..=0).unwrap();
        assert_eq!(format!("{range:?}"), "LiveRange(collapsed)");
    }
}
