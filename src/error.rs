//! Error types returned by response writers and handlers.

use std::io;

/// Boxed error type returned by [`Handler`](crate::Handler) implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for hijack operations
#[derive(Debug, thiserror::Error)]
pub enum HijackError {
    /// The underlying response writer cannot hand over its connection.
    #[error("hijacking is not supported")]
    NotSupported,
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_supported_message() {
        assert_eq!(
            HijackError::NotSupported.to_string(),
            "hijacking is not supported"
        );
    }

    #[test]
    fn test_io_error_is_transparent() {
        let err = HijackError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert_eq!(err.to_string(), "gone");
        assert!(matches!(err, HijackError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }
}
