//! Non-fatal observations collected during a read.
//!
//! Nothing here aborts a run. Each diagnostic is also mirrored to the log
//! as it is recorded, so a caller can either inspect the collected list or
//! just watch the log output.

use std::fmt;

/// A non-fatal observation recorded during a read, in the order observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A header on disk that was not present in the loaded state.
    NewHeader(String),

    /// A class carried over from prior state whose definition was not seen
    /// anywhere this run.
    ClassRemoved(String),

    /// More than one unparsed method matched a (name, arity) identity
    /// during merge; the first match was taken.
    AmbiguousMethod {
        /// Registry key of the class owning the overloads.
        class: String,
        /// The ambiguous method name.
        method: String,
    },

    /// A base-class name that resolved to no registered class. Usually a
    /// header that is not under any source root.
    BaseNotFound {
        /// Name of the deriving class.
        class: String,
        /// The base name as spelled in the clause.
        base: String,
    },

    /// A class whose computed fully-qualified name disagrees with the key
    /// it is registered under.
    NameMismatch {
        /// The name the definition computes for itself.
        computed: String,
        /// The registry key it was stored under.
        key: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NewHeader(path) => write!(f, "new header: {path}"),
            Diagnostic::ClassRemoved(name) => {
                write!(f, "class no longer defined in any header: {name}")
            }
            Diagnostic::AmbiguousMethod { class, method } => {
                write!(f, "ambiguous overload match in {class}: {method}")
            }
            Diagnostic::BaseNotFound { class, base } => {
                write!(f, "base class {base} of {class} not found, check source roots")
            }
            Diagnostic::NameMismatch { computed, key } => {
                write!(f, "name mismatch: computed {computed}, registered as {key}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_both_names() {
        let d = Diagnostic::BaseNotFound {
            class: "Derived".to_string(),
            base: "Missing".to_string(),
        };
        let text = d.to_string();
        assert!(text.contains("Derived"));
        assert!(text.contains("Missing"));
    }
}
