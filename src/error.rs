//! Unified error type.

use std::fmt;

/// The error type returned by the crate's fallible operations.
///
/// Application-level failures (unknown path, missing model file) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type surfaces startup and infrastructure failures: a bad
/// configuration value, binding to a port, or accepting a connection.
#[derive(Debug)]
pub enum Error {
    Config(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Io(e)       => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(_) => None,
            Self::Io(e)     => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
