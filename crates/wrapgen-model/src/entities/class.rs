use super::field::FieldDefinition;
use super::method::MethodDefinition;
use serde::{Deserialize, Serialize};

/// One constant of an enum definition, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumConstant {
    /// Constant name.
    pub name: String,

    /// The initializer expression exactly as written, or empty if the
    /// constant had no explicit value.
    pub value: String,
}

impl EnumConstant {
    /// Create a constant with its literal value text.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The variant of a class-like definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassKind {
    /// A plain class or struct.
    Class,

    /// A class template with its ordered template-parameter names.
    Template {
        /// Template parameter names (or, for a synthesized instantiation,
        /// the recovered argument spellings).
        parameters: Vec<String>,
    },

    /// An enum with its ordered constants.
    Enum {
        /// Constants in declaration order.
        constants: Vec<EnumConstant>,
    },
}

/// A class, struct, class template or enum in the model.
///
/// Identified in the registry by its fully-qualified name. Relations to
/// other classes (base, enclosing class, nested classes) are registry keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    /// Unqualified name as spelled in source. Empty for an anonymous struct.
    pub name: String,

    /// Enclosing namespace path (`a::b`), empty at global scope.
    pub namespace: String,

    /// Key of the header this class was declared in, if known.
    pub header: Option<String>,

    /// Key of the nearest enclosing class, if nested.
    pub parent: Option<String>,

    /// Which variant this definition is.
    pub kind: ClassKind,

    /// Keys of classes nested directly inside this one.
    pub nested_classes: Vec<String>,

    /// Methods owned by this class.
    pub methods: Vec<MethodDefinition>,

    /// Fields owned by this class.
    pub fields: Vec<FieldDefinition>,

    /// Key of the single retained base class, if any.
    pub base_class: Option<String>,

    /// Declared with the `struct` keyword?
    pub is_struct: bool,

    /// Typedef of a function-pointer type?
    pub is_function_proto: bool,

    /// True once this run has visited the class's own definition.
    /// Entities loaded from persisted state or created as placeholders
    /// stay unparsed until their definition is seen.
    #[serde(skip)]
    pub is_parsed: bool,
}

impl ClassDefinition {
    /// Create a definition attached to the current traversal scope.
    pub fn new(
        name: impl Into<String>,
        kind: ClassKind,
        header: Option<String>,
        parent: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            header,
            parent,
            kind,
            nested_classes: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            base_class: None,
            is_struct: false,
            is_function_proto: false,
            is_parsed: false,
        }
    }

    /// Create an unparsed placeholder carrying only a name, for entities
    /// referenced before their definition has been visited.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Class, None, None)
    }

    /// Set the namespace path.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// The fully-qualified name this definition computes for itself:
    /// enclosing class key, or namespace path, joined to its own name.
    pub fn fully_qualified_name(&self) -> String {
        if let Some(parent) = &self.parent {
            format!("{}::{}", parent, self.name)
        } else if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace, self.name)
        }
    }

    /// Template parameter list, if this is a template.
    pub fn template_parameters_mut(&mut self) -> Option<&mut Vec<String>> {
        match &mut self.kind {
            ClassKind::Template { parameters } => Some(parameters),
            _ => None,
        }
    }

    /// Enum constants, if this is an enum.
    pub fn enum_constants(&self) -> Option<&[EnumConstant]> {
        match &self.kind {
            ClassKind::Enum { constants } => Some(constants),
            _ => None,
        }
    }

    /// Register a nested class key, once.
    pub fn add_nested_class(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.nested_classes.contains(&key) {
            self.nested_classes.push(key);
        }
    }

    /// Clear state that is re-derived from source on every visit (fields,
    /// the base link, enum constants), keeping the merge surface (methods
    /// with their customized parameters) intact.
    ///
    /// Called when a placeholder loaded from prior state is adopted by the
    /// traversal, so re-reading a header never duplicates fields, nested
    /// class references or enum constants.
    pub fn reset_derived_state(&mut self) {
        self.fields.clear();
        self.base_class = None;
        if let ClassKind::Enum { constants } = &mut self.kind {
            constants.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fully_qualified_name() {
        let c = ClassDefinition::new("Shape", ClassKind::Class, None, None);
        assert_eq!(c.fully_qualified_name(), "Shape");

        let c = ClassDefinition::new("Shape", ClassKind::Class, None, None).with_namespace("geo");
        assert_eq!(c.fully_qualified_name(), "geo::Shape");

        let c = ClassDefinition::new(
            "Iterator",
            ClassKind::Class,
            None,
            Some("geo::Shape".to_string()),
        );
        assert_eq!(c.fully_qualified_name(), "geo::Shape::Iterator");
    }

    #[test]
    fn test_nested_class_registration_is_idempotent() {
        let mut c = ClassDefinition::new("Outer", ClassKind::Class, None, None);
        c.add_nested_class("Outer::Inner");
        c.add_nested_class("Outer::Inner");
        assert_eq!(c.nested_classes.len(), 1);
    }

    #[test]
    fn test_is_parsed_not_persisted() {
        let mut c = ClassDefinition::new("Shape", ClassKind::Class, None, None);
        c.is_parsed = true;

        let json = serde_json::to_string(&c).unwrap();
        let restored: ClassDefinition = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_parsed);
        assert_eq!(restored.name, "Shape");
    }
}
