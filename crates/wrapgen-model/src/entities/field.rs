use crate::types::TypeRef;
use serde::{Deserialize, Serialize};

/// A data member owned by a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name.
    pub name: String,

    /// The field's type.
    pub type_ref: TypeRef,
}

impl FieldDefinition {
    /// Create a field definition.
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
        }
    }
}
