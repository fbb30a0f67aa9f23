//! Error types for printtape.

use std::fmt;
use std::io;

/// Result type alias for printtape operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Export destination that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkKind {
    /// Plain-text print file.
    Text,
    /// Numbered PNG image files.
    Image,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text file"),
            Self::Image => f.write_str("image file"),
        }
    }
}

/// Error type for printtape operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error from persistence.
    Io(io::Error),
    /// Persisted print-out state is truncated or has out-of-range lengths.
    CorruptState(String),
    /// Writing to an export sink failed; the sink has been disabled.
    Export { sink: SinkKind, source: io::Error },
}

impl Error {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptState(reason.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::CorruptState(reason) => write!(f, "corrupt print-out state: {reason}"),
            Self::Export { sink, source } => {
                write!(f, "error while printing to {sink}: {source}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::Export { source: e, .. } => Some(e),
            Self::CorruptState(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
