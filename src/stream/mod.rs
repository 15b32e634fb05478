//! The mutable token sequence for one file.
//!
//! Rules edit a [`TokenStream`] in place while [`crate::range::LiveRange`]s
//! created by earlier analysis stay registered with it. Every structural
//! edit updates the registered ranges before returning, so no range can ever
//! observe shifted tokens with stale bounds.
//!
//! Edits take `&self`: ranges borrow the stream for their whole lifetime, so
//! the token vector and the range table sit behind `RefCell`s. The stream is
//! `Send` but not `Sync`; one formatting pass owns it at a time.

pub mod arena;
pub mod errors;

pub use arena::{RangeHandle, SlotState};
pub use errors::StreamError;

use crate::lexer::tokenize;
use crate::scope::{self, Direction};
use crate::token::Token;
use arena::RangeTable;
use std::cell::{Ref, RefCell};
use std::ops::{Range, RangeInclusive};
use tracing::trace;

#[derive(Debug, Default)]
pub struct TokenStream {
    tokens: RefCell<Vec<Token>>,
    ranges: RefCell<RangeTable>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: RefCell::new(tokens),
            ranges: RefCell::new(RangeTable::default()),
        }
    }

    /// Lex `source` into a new stream.
    pub fn from_source(source: &str) -> Self {
        Self::new(tokenize(source))
    }

    pub fn len(&self) -> usize {
        self.tokens.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.borrow().is_empty()
    }

    pub fn token(&self, at: usize) -> Option<Token> {
        self.tokens.borrow().get(at).cloned()
    }

    /// Borrowed view of the current tokens.
    ///
    /// The view must be dropped before the next edit.
    pub fn tokens(&self) -> Ref<'_, [Token]> {
        Ref::map(self.tokens.borrow(), Vec::as_slice)
    }

    /// Current source text.
    pub fn source(&self) -> String {
        crate::token::join_text(self.tokens.borrow().iter())
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens.into_inner()
    }

    /// Number of ranges currently registered with this stream.
    pub fn live_ranges(&self) -> usize {
        self.ranges.borrow().live_count()
    }

    /// Splice `tokens` in at `at`, shifting everything at or after it.
    ///
    /// Returns the number of tokens inserted.
    pub fn insert(
        &self,
        at: usize,
        tokens: impl IntoIterator<Item = Token>,
    ) -> Result<usize, StreamError> {
        let mut stream = self.tokens.borrow_mut();
        if at > stream.len() {
            return Err(StreamError::InvalidPosition {
                position: at,
                len: stream.len(),
            });
        }
        let before = stream.len();
        stream.splice(at..at, tokens);
        let count = stream.len() - before;
        if count > 0 {
            self.ranges.borrow_mut().shift_for_insert(at, count);
            trace!(at, count, "inserted tokens");
        }
        Ok(count)
    }

    /// Delete the tokens in `span` and return them.
    pub fn remove(&self, span: RangeInclusive<usize>) -> Result<Vec<Token>, StreamError> {
        let (first, last) = (*span.start(), *span.end());
        let mut stream = self.tokens.borrow_mut();
        if first > last || last >= stream.len() {
            return Err(StreamError::InvalidSpan {
                lower: first,
                upper: last,
                len: stream.len(),
            });
        }
        let removed: Vec<Token> = stream.drain(first..=last).collect();
        self.ranges.borrow_mut().shift_for_remove(first, last);
        trace!(first, last, "removed tokens");
        Ok(removed)
    }

    pub fn remove_token(&self, at: usize) -> Result<Token, StreamError> {
        let mut removed = self.remove(at..=at)?;
        removed.pop().ok_or(StreamError::InvalidSpan {
            lower: at,
            upper: at,
            len: self.len(),
        })
    }

    /// Swap the token at `at` for `token` without shifting anything.
    pub fn replace_token(&self, at: usize, token: Token) -> Result<Token, StreamError> {
        let mut stream = self.tokens.borrow_mut();
        let len = stream.len();
        let slot = stream.get_mut(at).ok_or(StreamError::InvalidSpan {
            lower: at,
            upper: at,
            len,
        })?;
        Ok(std::mem::replace(slot, token))
    }

    /// Replace `span` with `tokens`.
    ///
    /// The common prefix is overwritten in place; a longer replacement is
    /// inserted after it and a shorter one removes the surplus tail, so
    /// ranges see only the length difference.
    pub fn replace(
        &self,
        span: RangeInclusive<usize>,
        tokens: impl IntoIterator<Item = Token>,
    ) -> Result<(), StreamError> {
        let (first, last) = (*span.start(), *span.end());
        let len = self.len();
        if first > last || last >= len {
            return Err(StreamError::InvalidSpan {
                lower: first,
                upper: last,
                len,
            });
        }
        let mut replacement: Vec<Token> = tokens.into_iter().collect();
        let existing = last - first + 1;
        let common = existing.min(replacement.len());
        let extra = replacement.split_off(common);
        for (offset, token) in replacement.into_iter().enumerate() {
            self.replace_token(first + offset, token)?;
        }
        if existing > common {
            self.remove(first + common..=last)?;
        } else if !extra.is_empty() {
            self.insert(first + common, extra)?;
        }
        Ok(())
    }

    /// Find a non-trivia token satisfying `predicate` within `bounds`.
    pub fn index_of(
        &self,
        direction: Direction,
        bounds: Range<usize>,
        predicate: impl FnMut(&Token) -> bool,
    ) -> Option<usize> {
        scope::index_of(&self.tokens.borrow(), direction, bounds, predicate)
    }

    pub fn next_non_trivia(&self, after: usize) -> Option<usize> {
        scope::next_non_trivia(&self.tokens.borrow(), after)
    }

    pub fn previous_non_trivia(&self, before: usize) -> Option<usize> {
        scope::previous_non_trivia(&self.tokens.borrow(), before)
    }

    pub fn match_scope(&self, open: usize) -> Option<usize> {
        scope::match_scope(&self.tokens.borrow(), open)
    }

    /// 1-based line and column of the token at `at`.
    pub fn line_column(&self, at: usize) -> (usize, usize) {
        let tokens = self.tokens.borrow();
        let mut line = 1;
        let mut column = 1;
        for token in tokens.iter().take(at) {
            if token.is_linebreak() {
                line += 1;
                column = 1;
                continue;
            }
            let text = token.text();
            match text.rfind('\n') {
                Some(last_break) => {
                    line += text.matches('\n').count();
                    column = text[last_break + 1..].chars().count() + 1;
                }
                None => column += text.chars().count(),
            }
        }
        (line, column)
    }

    pub(crate) fn register(&self, lower: usize, upper: usize) -> Result<RangeHandle, StreamError> {
        let len = self.len();
        if lower > upper || upper >= len {
            return Err(StreamError::InvalidSpan { lower, upper, len });
        }
        Ok(self
            .ranges
            .borrow_mut()
            .register(SlotState::Live { lower, upper }))
    }

    /// Register a copy of an existing range's state.
    pub(crate) fn duplicate(&self, handle: RangeHandle) -> RangeHandle {
        let mut ranges = self.ranges.borrow_mut();
        let state = ranges.state(handle).unwrap_or(SlotState::Collapsed);
        ranges.register(state)
    }

    pub(crate) fn release(&self, handle: RangeHandle) {
        if let Ok(mut ranges) = self.ranges.try_borrow_mut() {
            ranges.release(handle);
        }
    }

    pub(crate) fn bounds(&self, handle: RangeHandle) -> Result<(usize, usize), StreamError> {
        match self.ranges.borrow().state(handle) {
            Some(SlotState::Live { lower, upper }) => Ok((lower, upper)),
            Some(SlotState::Collapsed) | None => Err(StreamError::OutOfBounds),
        }
    }
}
