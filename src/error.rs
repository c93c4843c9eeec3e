use std::fmt;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Error type for CSV writing operations.
#[derive(Error, Debug, Clone)]
pub enum EncodeError {
    /// The underlying sink failed during a write or flush.
    ///
    /// Shared so the writer can hand the latched failure back from
    /// [`Writer::error`](crate::Writer::error) more than once.
    #[error("Write failure: {0}")]
    Write(Arc<io::Error>),

    /// The dialect cannot be used to build a writer.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<io::Error> for EncodeError {
    fn from(err: io::Error) -> Self {
        EncodeError::Write(Arc::new(err))
    }
}

impl EncodeError {
    /// Returns the kind of the sink failure, if this is a write failure.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            EncodeError::Write(err) => Some(err.kind()),
            EncodeError::InvalidConfig(_) => None,
        }
    }
}

/// Error returned by [`Writer::into_inner`](crate::Writer::into_inner).
///
/// Holds the writer that failed to flush, so its sink is not lost.
#[derive(Debug)]
pub struct IntoInnerError<W> {
    writer: W,
    error: EncodeError,
}

impl<W> IntoInnerError<W> {
    pub(crate) fn new(writer: W, error: EncodeError) -> Self {
        Self { writer, error }
    }

    /// The failure that stopped the flush.
    pub fn error(&self) -> &EncodeError {
        &self.error
    }

    /// Take back the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> fmt::Display for IntoInnerError<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<W: fmt::Debug> std::error::Error for IntoInnerError<W> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Result type alias for writing operations.
pub type Result<T> = std::result::Result<T, EncodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts_to_write() {
        let err: EncodeError = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::BrokenPipe));
        assert_eq!(err.to_string(), "Write failure: gone");
    }

    #[test]
    fn test_into_inner_error_keeps_writer() {
        let err = IntoInnerError::new(vec![1u8, 2], io::Error::other("full").into());
        assert_eq!(err.to_string(), "Write failure: full");
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.into_inner(), vec![1, 2]);
    }

    #[test]
    fn test_invalid_config_has_no_io_kind() {
        let err = EncodeError::InvalidConfig("bad".to_string());
        assert_eq!(err.io_kind(), None);
        assert_eq!(err.to_string(), "Invalid configuration: bad");
    }
}
