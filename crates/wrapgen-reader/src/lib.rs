//! # wrapgen-reader
//!
//! Builds and incrementally updates the semantic model of a C++ codebase's
//! public interface by walking header ASTs.
//!
//! A [`CppReader`] borrows a [`wrapgen_model::ModelRegistry`] for one run:
//! construction scans the configured source roots into a worklist, and
//! [`CppReader::read_headers`] drains it, merging each header's definitions
//! into the registry. A registry loaded from persisted state comes back as
//! unparsed placeholders; re-reading the headers re-derives everything
//! observable from source while preserving user customizations on methods
//! and parameters. Anything surprising but survivable is recorded as a
//! [`Diagnostic`]; only environment failures abort the run.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod context;
mod diagnostics;
mod errors;
mod reader;

pub use context::ReaderContext;
pub use diagnostics::Diagnostic;
pub use errors::{ReaderError, ReaderResult};
pub use reader::{CppReader, ReaderConfig};
