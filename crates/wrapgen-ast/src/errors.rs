use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while standing up or running the parse backend.
///
/// All of these are setup failures: per the reader's error policy, a
/// malformed declaration inside a header is never an error, but a backend
/// that cannot be constructed or a file that cannot be read aborts the run.
#[derive(Error, Debug)]
pub enum AstError {
    /// The C++ grammar could not be loaded into the parser.
    #[error("failed to load the C++ grammar: {0}")]
    Language(String),

    /// Failed to read a header file.
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// The parser returned no tree for this file.
    #[error("failed to parse {0}")]
    Parse(PathBuf),
}

/// Result type for AST operations.
pub type AstResult<T> = Result<T, AstError>;
