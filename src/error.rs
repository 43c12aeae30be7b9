//! Crate error types.

use std::fmt;

/// Error type for engine startup.
///
/// Routing never produces errors (a miss becomes a 404 response), so the
/// only fallible surface is binding the listener.
#[derive(Debug)]
pub enum Error {
    /// Failed to bind the listen address (e.g. address already in use).
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bind { addr, source } => {
                write!(f, "failed to bind {}: {}", addr, source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Bind { source, .. } => Some(source),
        }
    }
}
