// Term, stream and import errors

use crate::quad::Quad;
use std::fmt;

/// Rejected input when building a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermError {
    /// A variable needs a name once the leading `?` is removed.
    EmptyVariableName,
}

impl fmt::Display for TermError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TermError::EmptyVariableName => write!(f, "variable name must not be empty"),
        }
    }
}

impl std::error::Error for TermError {}

/// The receiving end of a stream was dropped before the producer finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamClosed;

impl fmt::Display for StreamClosed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "quad stream consumer has gone away")
    }
}

impl std::error::Error for StreamClosed {}

/// Failure of a strict bulk load. `index` counts stream elements from zero,
/// holes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    MissingElement { index: usize },
    Rejected { index: usize, quad: Quad },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImportError::MissingElement { index } => {
                write!(f, "stream element {} is missing", index)
            }
            ImportError::Rejected { index, quad } => {
                write!(f, "stream element {} cannot be stored: {}", index, quad)
            }
        }
    }
}

impl std::error::Error for ImportError {}
