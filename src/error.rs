use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for docgrep operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the search pipeline.
///
/// Each variant maps to a process exit code via [`Error::exit_code`]:
/// no matches is exit 1, everything else fatal is exit 2. Read errors
/// never reach the top level; the loader swallows them per file.
#[derive(Error, Debug)]
pub enum Error {
    /// Empty file selection or empty result set
    #[error("{0}")]
    NoMatch(String),

    /// Failed to read or decode a single file
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load or run the embedding model
    #[error("embedder: {0}")]
    Embedder(String),

    /// Failed to read or write the embedding cache
    #[error("cache store: {0}")]
    Store(String),
}

impl Error {
    /// Process exit code for errors that terminate the run
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::NoMatch(_) => 1,
            _ => 2,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Store(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::NoMatch("nothing".into()).exit_code(), 1);
        assert_eq!(Error::Embedder("boom".into()).exit_code(), 2);
        assert_eq!(Error::Store("disk full".into()).exit_code(), 2);
    }

    #[test]
    fn test_no_match_message_is_bare() {
        // NoMatch is user-facing, the message prints without a prefix
        let e = Error::NoMatch("no files matched".into());
        assert_eq!(e.to_string(), "no files matched");
    }
}
