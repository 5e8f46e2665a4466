//! # wrapgen-ast
//!
//! The AST source for wrapgen: parses a C++ header with tree-sitter and
//! exposes it through a [`Cursor`] with a closed [`NodeKind`] set, plus a
//! lexical [`tokens`] scanner for the places where the structured tree is
//! not enough (enum initializers, default arguments, template base clauses).
//!
//! A [`HeaderAst`] is a scoped parse: it owns the source text and the tree,
//! and every cursor borrows from it, so the parse is released exactly when
//! the handle is dropped.
//!
//! Parsing is best effort. Syntax errors inside a header do not fail the
//! parse; only an unreadable file or an unconstructible backend does.

pub mod cursor;
pub mod errors;
pub mod tokens;

pub use cursor::{Cursor, NodeKind, Visit};
pub use errors::{AstError, AstResult};
pub use tokens::{Token, TokenKind};

use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Parser, Tree};

/// A parsed header: the source text and its tree, released together.
#[derive(Debug)]
pub struct HeaderAst {
    path: PathBuf,
    source: String,
    tree: Tree,
}

impl HeaderAst {
    /// The path this header was parsed as.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Cursor over the translation unit root.
    pub fn root(&self) -> Cursor<'_> {
        Cursor::new(self.tree.root_node(), self.source.as_bytes())
    }
}

/// Read and parse a header file.
pub fn parse_header(path: &Path) -> AstResult<HeaderAst> {
    let source = fs::read_to_string(path).map_err(|e| AstError::Io(path.to_path_buf(), e))?;
    parse_source(&source, path)
}

/// Parse in-memory source as a header with the given logical path.
pub fn parse_source(source: &str, path: &Path) -> AstResult<HeaderAst> {
    let mut parser = Parser::new();
    let language = tree_sitter_cpp::language();
    parser
        .set_language(&language)
        .map_err(|e| AstError::Language(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| AstError::Parse(path.to_path_buf()))?;

    Ok(HeaderAst {
        path: path.to_path_buf(),
        source: source.to_string(),
        tree,
    })
}
