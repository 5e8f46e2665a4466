use crate::access::AccessSpecifier;
use crate::marshal::MarshalDirection;
use crate::types::TypeRef;
use serde::{Deserialize, Serialize};

/// One positional parameter of a method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Parameter name as spelled in the declaration (possibly renamed in
    /// persisted state by a user).
    pub name: String,

    /// The parameter's type.
    pub type_ref: TypeRef,

    /// Carries a default value in the declaration?
    pub is_optional: bool,

    /// Marshal direction for downstream generation. `Default` until the
    /// reader infers one from the type shape.
    pub marshal_direction: MarshalDirection,
}

impl ParameterDefinition {
    /// Create a parameter with an undecided marshal direction.
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            is_optional: false,
            marshal_direction: MarshalDirection::Default,
        }
    }
}

/// A method or constructor owned by a class.
///
/// Merge identity is the pair (name, arity): re-reading a header updates the
/// single unparsed method with a matching name and parameter count instead of
/// creating a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDefinition {
    /// Method name (constructors carry the class name).
    pub name: String,

    /// Fixed-size parameter slots, one per observed argument. A slot stays
    /// `None` until the corresponding argument has been visited; populated
    /// slots survive merge so user customizations are preserved.
    pub parameters: Vec<Option<ParameterDefinition>>,

    /// Return type.
    pub return_type: TypeRef,

    /// Declared `static`?
    pub is_static: bool,

    /// Virtual (spelled or inherited)?
    pub is_virtual: bool,

    /// Pure virtual?
    pub is_abstract: bool,

    /// Is this a constructor?
    pub is_constructor: bool,

    /// Member access level.
    pub access: AccessSpecifier,

    /// True once this run has visited the method's declaration; methods
    /// loaded from persisted state stay unparsed until matched.
    #[serde(skip)]
    pub is_parsed: bool,
}

impl MethodDefinition {
    /// Create a method with `arity` empty parameter slots.
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            parameters: vec![None; arity],
            return_type: TypeRef::void(),
            is_static: false,
            is_virtual: false,
            is_abstract: false,
            is_constructor: false,
            access: AccessSpecifier::Public,
            is_parsed: false,
        }
    }

    /// Number of parameter slots.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sizes_parameter_slots() {
        let m = MethodDefinition::new("setOrigin", 2);
        assert_eq!(m.arity(), 2);
        assert!(m.parameters.iter().all(|p| p.is_none()));
        assert!(!m.is_parsed);
    }

    #[test]
    fn test_is_parsed_not_persisted() {
        let mut m = MethodDefinition::new("getOrigin", 0);
        m.is_parsed = true;

        let json = serde_json::to_string(&m).unwrap();
        let restored: MethodDefinition = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_parsed);
    }
}
