//! Mutable traversal state threaded through the reader.

use wrapgen_model::{AccessSpecifier, MethodDefinition};

/// Where the traversal currently is.
///
/// Scope-shaped fields are saved into locals before a nested visit and
/// restored after it, so sibling declarations always observe the state of
/// their own enclosing scope.
#[derive(Debug, Default)]
pub struct ReaderContext {
    /// Registry key of the header being processed.
    pub header: Option<String>,

    /// Namespace path from the translation unit root to the current scope.
    pub namespace: Vec<String>,

    /// Registry key of the class whose members are being visited.
    pub class: Option<String>,

    /// The method currently under construction, detached from its class
    /// until the access filter decides whether it is kept.
    pub method: Option<MethodDefinition>,

    /// Access level governing the members visited next.
    pub member_access: AccessSpecifier,
}

impl ReaderContext {
    /// Fresh context positioned at the translation unit root.
    pub fn new() -> Self {
        Self::default()
    }

    /// The namespace path as a `::`-joined string, empty at global scope.
    pub fn namespace_path(&self) -> String {
        self.namespace.join("::")
    }
}
