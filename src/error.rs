use std::io;

use thiserror::Error;

/// A sink failure together with how much of the input was consumed before
/// it happened.
///
/// `consumed` only counts bytes of the caller's input, never prefix bytes, so
/// writing `&input[consumed..]` again resumes exactly where the failure
/// happened.
#[derive(Debug, Error)]
#[error("sink failed after consuming {consumed} input bytes: {source}")]
pub struct WriteError {
    /// Input bytes accepted by the sink before the failure.
    pub consumed: usize,

    /// Error returned by the sink.
    #[source]
    pub source: io::Error,
}

impl WriteError {
    /// Input bytes accepted by the sink before the failure.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Drop the count and return the sink's error unchanged.
    #[must_use]
    pub fn into_source(self) -> io::Error {
        self.source
    }
}

impl From<WriteError> for io::Error {
    fn from(err: WriteError) -> Self {
        err.source
    }
}
