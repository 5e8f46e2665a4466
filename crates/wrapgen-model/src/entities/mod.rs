//! Model entity types.

pub mod class;
pub mod field;
pub mod header;
pub mod method;

pub use class::{ClassDefinition, ClassKind, EnumConstant};
pub use field::FieldDefinition;
pub use header::HeaderDefinition;
pub use method::{MethodDefinition, ParameterDefinition};
