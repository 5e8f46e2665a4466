use std::path::PathBuf;
use thiserror::Error;

use wrapgen_ast::AstError;

/// Fatal reader errors.
///
/// Only environment failures land here: an unreadable directory or file, or
/// a parse backend that cannot be stood up. Everything observed inside a
/// header is reported as a [`crate::Diagnostic`] instead.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// Failed to read a directory while seeding the worklist.
    #[error("IO error scanning {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// The parse backend failed.
    #[error(transparent)]
    Ast(#[from] AstError),
}

/// Result type for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;
