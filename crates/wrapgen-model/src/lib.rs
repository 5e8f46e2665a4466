//! # wrapgen-model
//!
//! The semantic model of a C++ codebase's public interface: headers, classes,
//! templates, enums, methods, fields and parameters, identified by
//! fully-qualified name and stored in a [`ModelRegistry`].
//!
//! The registry is the contract between the header reader (which populates it
//! incrementally, merging against entities loaded from a prior run) and
//! downstream binding generators (which consume the finished class graph).
//! Every type here derives serde traits so an outer persistence layer can
//! encode the registry without this crate caring about the on-disk format.
//!
//! Entities reference each other by registry key (a fully-qualified name for
//! classes, a canonical path for headers), never by owning pointer. Methods
//! and fields are owned inline by their class.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod access;
pub mod entities;
pub mod marshal;
pub mod registry;
pub mod types;

pub use access::AccessSpecifier;
pub use entities::{
    ClassDefinition, ClassKind, EnumConstant, FieldDefinition, HeaderDefinition, MethodDefinition,
    ParameterDefinition,
};
pub use marshal::MarshalDirection;
pub use registry::ModelRegistry;
pub use types::TypeRef;
