//! Error types for InfraPulse core.

use std::{error::Error, fmt, io};

/// Error type for InfraPulse core operations.
#[derive(Debug)]
pub enum InfraPulseError {
    /// An underlying I/O error.
    Io(io::Error),
    /// A client or device record that does not exist.
    NotFound(String),
    /// Input rejected before reaching the store.
    InvalidInput(String),
    /// A uniqueness constraint was violated (e.g. a duplicate slug).
    Conflict(String),
    /// The backing store failed.
    Storage(String),
    /// A catch-all error with a message.
    Other(String),
}

impl fmt::Display for InfraPulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::NotFound(message) => write!(f, "{message}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Storage(message) => write!(f, "storage error: {message}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for InfraPulseError {}

impl From<io::Error> for InfraPulseError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Convenience result type for InfraPulse core.
pub type Result<T> = std::result::Result<T, InfraPulseError>;

#[cfg(test)]
mod tests {
    use super::InfraPulseError;
    use std::io;

    #[test]
    fn io_error_formats_message() {
        let error = InfraPulseError::Io(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(format!("{error}"), "io error: boom");
    }

    #[test]
    fn variants_format_messages() {
        let cases = [
            (
                InfraPulseError::NotFound("client not found".to_string()),
                "client not found",
            ),
            (
                InfraPulseError::InvalidInput("name is required".to_string()),
                "invalid input: name is required",
            ),
            (
                InfraPulseError::Conflict("slug taken".to_string()),
                "conflict: slug taken",
            ),
            (
                InfraPulseError::Storage("pool exhausted".to_string()),
                "storage error: pool exhausted",
            ),
            (InfraPulseError::Other("oops".to_string()), "oops"),
        ];
        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn from_io_error_maps_variant() {
        let error: InfraPulseError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        match error {
            InfraPulseError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected Io variant, got {other:?}"),
        }
    }
}
