//! Type references and shape-driven marshalling defaults.

use crate::marshal::MarshalDirection;
use serde::{Deserialize, Serialize};

/// A reference to a C++ type as spelled in a declaration.
///
/// Only the shape relevant to marshalling is modelled: whether the type is a
/// pointer or reference and whether it is const-qualified. The original
/// spelling is kept verbatim for downstream generators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// The type as written in source, e.g. `const btVector3 &`.
    pub spelling: String,

    /// Pointer-shaped (`*` somewhere in the declarator)?
    pub is_pointer: bool,

    /// Reference-shaped (`&` or `&&`)?
    pub is_reference: bool,

    /// Const-qualified anywhere in the spelling?
    pub is_const: bool,
}

impl TypeRef {
    /// Build a type reference by inspecting a spelled-out type.
    pub fn parse(spelling: &str) -> Self {
        let spelling = spelling.trim();
        Self {
            spelling: spelling.to_string(),
            is_pointer: spelling.contains('*'),
            is_reference: spelling.contains('&'),
            is_const: spelling
                .split(|c: char| !c.is_alphanumeric() && c != '_')
                .any(|word| word == "const"),
        }
    }

    /// The `void` type.
    pub fn void() -> Self {
        Self::parse("void")
    }

    /// Infer the marshal direction a parameter of this type defaults to.
    ///
    /// A mutable pointer or reference can carry data back to the caller, so
    /// it defaults to `InOut`; everything else is input-only.
    pub fn default_marshal_direction(&self) -> MarshalDirection {
        if (self.is_pointer || self.is_reference) && !self.is_const {
            MarshalDirection::InOut
        } else {
            MarshalDirection::In
        }
    }

    /// Reduce a spelled type to its basic name: qualifiers, declarator
    /// punctuation and any `<...>` argument list are stripped.
    ///
    /// Used by template-base recovery to normalize a template argument
    /// spelling recovered from raw tokens.
    pub fn basic_name(spelling: &str) -> String {
        let mut name = spelling.trim();
        if let Some(stripped) = name.strip_prefix("const ") {
            name = stripped.trim_start();
        }
        name = name
            .trim_end_matches(|c: char| c == '*' || c == '&' || c.is_whitespace())
            .trim_end();
        if let Some(stripped) = name.strip_suffix("const") {
            name = stripped.trim_end();
        }
        if name.ends_with('>') {
            if let Some(open) = name.find('<') {
                name = name[..open].trim_end();
            }
        }
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_type() {
        let t = TypeRef::parse("int");
        assert!(!t.is_pointer);
        assert!(!t.is_reference);
        assert!(!t.is_const);
        assert_eq!(t.default_marshal_direction(), MarshalDirection::In);
    }

    #[test]
    fn test_parse_mutable_reference() {
        let t = TypeRef::parse("btVector3 &");
        assert!(t.is_reference);
        assert!(!t.is_const);
        assert_eq!(t.default_marshal_direction(), MarshalDirection::InOut);
    }

    #[test]
    fn test_parse_const_pointer() {
        let t = TypeRef::parse("const btScalar *");
        assert!(t.is_pointer);
        assert!(t.is_const);
        assert_eq!(t.default_marshal_direction(), MarshalDirection::In);
    }

    #[test]
    fn test_const_detection_ignores_substrings() {
        // "constraint" must not count as const
        let t = TypeRef::parse("btConstraintSolver *");
        assert!(!t.is_const);
    }

    #[test]
    fn test_basic_name() {
        assert_eq!(TypeRef::basic_name("int"), "int");
        assert_eq!(TypeRef::basic_name("const btVector3 &"), "btVector3");
        assert_eq!(TypeRef::basic_name("Holder<int>"), "Holder");
        assert_eq!(TypeRef::basic_name("unsigned int"), "unsigned int");
    }
}
