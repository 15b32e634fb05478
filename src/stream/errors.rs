use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The range was dereferenced after every token it covered was removed.
    #[error("range is out of bounds: every token it covered has been removed")]
    OutOfBounds,

    #[error("insertion point {position} is past the end of a stream of {len} tokens")]
    InvalidPosition { position: usize, len: usize },

    #[error("invalid span [{lower}, {upper}] in a stream of {len} tokens")]
    InvalidSpan {
        lower: usize,
        upper: usize,
        len: usize,
    },
}
