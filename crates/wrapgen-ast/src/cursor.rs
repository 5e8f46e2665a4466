//! Cursor view over the parsed C++ tree.
//!
//! A [`Cursor`] wraps a tree-sitter node together with the source text and
//! presents the tree the way the model builder wants to see it: a closed
//! [`NodeKind`] tag per node, declaration-level children (base specifiers,
//! template parameters and members surface directly under their class), and
//! accessors for the spellings and specifier flags the model records.

use crate::tokens::{self, TokenKind};
use tree_sitter::Node;

/// Closed set of node kinds the model builder dispatches on.
///
/// Grammar node types with no model effect map to `Other`, which every
/// visitor handles with an explicit (ignoring) match arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `namespace n { ... }`
    Namespace,
    /// `class C ...`
    Class,
    /// `struct S ...`
    Struct,
    /// `template <...> class C ...`
    ClassTemplate,
    /// `enum E { ... }` (plain or scoped)
    Enum,
    /// One enumerator inside an enum body.
    EnumConstant,
    /// Member function declaration or definition.
    Method,
    /// Constructor declaration or definition.
    Constructor,
    /// Destructor.
    Destructor,
    /// `operator T()` conversion function.
    ConversionOperator,
    /// `template <...>` over a function.
    FunctionTemplate,
    /// Data member.
    Field,
    /// `typedef ...`
    Typedef,
    /// `union { ... }`
    Union,
    /// `public:` / `protected:` / `private:` label.
    Access,
    /// One base type name inside a base-class clause.
    BaseSpecifier,
    /// `typename T` / `class T` inside a template parameter list.
    TemplateTypeParameter,
    /// Anything else; visitors ignore it explicitly.
    Other,
}

/// Callback verdict for [`Cursor::visit_children`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Move on to the next sibling.
    Continue,
    /// Also descend into this node's declaration children.
    Recurse,
}

/// A node of the parsed header plus the source it was parsed from.
#[derive(Clone, Copy)]
pub struct Cursor<'tu> {
    node: Node<'tu>,
    source: &'tu [u8],
}

impl<'tu> Cursor<'tu> {
    pub(crate) fn new(node: Node<'tu>, source: &'tu [u8]) -> Self {
        Self { node, source }
    }

    fn wrap(&self, node: Node<'tu>) -> Cursor<'tu> {
        Cursor::new(node, self.source)
    }

    fn node_text(&self, node: Node) -> &'tu str {
        node.utf8_text(self.source).unwrap_or("")
    }

    /// Source text of this node's extent.
    pub fn text(&self) -> &'tu str {
        self.node_text(self.node)
    }

    fn all_children(&self) -> Vec<Cursor<'tu>> {
        let mut walk = self.node.walk();
        self.node
            .children(&mut walk)
            .map(|n| self.wrap(n))
            .collect()
    }

    fn child_of_kind(&self, kind: &str) -> Option<Node<'tu>> {
        let mut walk = self.node.walk();
        for child in self.node.children(&mut walk) {
            if child.kind() == kind {
                return Some(child);
            }
        }
        None
    }

    fn has_child_of_kind(&self, kind: &str) -> bool {
        self.child_of_kind(kind).is_some()
    }

    /// The model-level kind of this node.
    pub fn kind(&self) -> NodeKind {
        match self.node.kind() {
            "namespace_definition" => NodeKind::Namespace,
            "class_specifier" => NodeKind::Class,
            "struct_specifier" => NodeKind::Struct,
            "union_specifier" => NodeKind::Union,
            "enum_specifier" => NodeKind::Enum,
            "enumerator" => NodeKind::EnumConstant,
            "type_definition" => NodeKind::Typedef,
            "access_specifier" => NodeKind::Access,
            "type_parameter_declaration" => NodeKind::TemplateTypeParameter,
            "template_declaration" => {
                if self.template_inner().is_some() {
                    NodeKind::ClassTemplate
                } else {
                    NodeKind::FunctionTemplate
                }
            }
            "type_identifier" | "qualified_identifier" => {
                match self.node.parent().map(|p| p.kind()) {
                    Some("base_class_clause") => NodeKind::BaseSpecifier,
                    _ => NodeKind::Other,
                }
            }
            "function_definition" | "field_declaration" | "declaration" => {
                self.classify_declaration()
            }
            _ => NodeKind::Other,
        }
    }

    /// Distinguish fields, nested type definitions and the method family
    /// for declaration-shaped nodes.
    fn classify_declaration(&self) -> NodeKind {
        if self.node.kind() != "function_definition" {
            if let Some(spec) = self.nested_type_specifier() {
                return self.wrap(spec).kind();
            }
        }

        let Some(declarator) = self.function_declarator() else {
            return if self.node.kind() == "field_declaration" {
                NodeKind::Field
            } else {
                NodeKind::Other
            };
        };

        if subtree_contains_kind(declarator, "destructor_name") {
            return NodeKind::Destructor;
        }
        if subtree_contains_kind(declarator, "operator_cast")
            || self.node.child_by_field_name("declarator").map(|d| d.kind())
                == Some("operator_cast")
        {
            return NodeKind::ConversionOperator;
        }

        let name = Self::declarator_name(self, declarator).unwrap_or_default();
        match self.enclosing_type_name() {
            Some(class_name) if class_name == name => NodeKind::Constructor,
            _ => NodeKind::Method,
        }
    }

    /// For declarations that define a type inline (`struct { ... } x;`,
    /// a nested `enum E { ... };`), the defining specifier node.
    fn nested_type_specifier(&self) -> Option<Node<'tu>> {
        let ty = self.node.child_by_field_name("type")?;
        match ty.kind() {
            "class_specifier" | "struct_specifier" | "enum_specifier" | "union_specifier"
                if ty.child_by_field_name("body").is_some() =>
            {
                Some(ty)
            }
            _ => None,
        }
    }

    /// Unwrap a declaration/field wrapper down to the type specifier it
    /// defines, if any; otherwise the cursor itself.
    pub fn inner_definition(&self) -> Cursor<'tu> {
        match self.node.kind() {
            "field_declaration" | "declaration" => match self.nested_type_specifier() {
                Some(spec) => self.wrap(spec),
                None => *self,
            },
            _ => *self,
        }
    }

    /// Does this node carry a full definition (a body) rather than a
    /// forward declaration?
    pub fn is_definition(&self) -> bool {
        match self.node.kind() {
            "class_specifier" | "struct_specifier" | "union_specifier" | "enum_specifier" => {
                self.node.child_by_field_name("body").is_some()
            }
            "template_declaration" => self
                .template_inner()
                .map(|inner| inner.is_definition())
                .unwrap_or(false),
            _ => true,
        }
    }

    /// The templated class/struct specifier under a template declaration.
    pub fn template_inner(&self) -> Option<Cursor<'tu>> {
        if self.node.kind() != "template_declaration" {
            return None;
        }
        let mut walk = self.node.walk();
        for child in self.node.children(&mut walk) {
            if matches!(child.kind(), "class_specifier" | "struct_specifier") {
                return Some(self.wrap(child));
            }
        }
        None
    }

    /// Is the templated entity declared with `struct`?
    pub fn template_inner_is_struct(&self) -> bool {
        self.template_inner()
            .map(|inner| inner.node.kind() == "struct_specifier")
            .unwrap_or(false)
    }

    /// Name as spelled in source. Empty for anonymous declarations.
    pub fn spelling(&self) -> String {
        match self.node.kind() {
            "namespace_definition"
            | "class_specifier"
            | "struct_specifier"
            | "union_specifier"
            | "enum_specifier"
            | "enumerator" => self
                .node
                .child_by_field_name("name")
                .map(|n| self.node_text(n).to_string())
                .unwrap_or_default(),
            "template_declaration" => self
                .template_inner()
                .map(|inner| inner.spelling())
                .unwrap_or_default(),
            "type_parameter_declaration" => self
                .child_of_kind("type_identifier")
                .map(|n| self.node_text(n).to_string())
                .unwrap_or_default(),
            "type_definition"
            | "function_definition"
            | "field_declaration"
            | "declaration"
            | "parameter_declaration"
            | "optional_parameter_declaration" => {
                Self::declarator_name(self, self.node).unwrap_or_default()
            }
            _ => self.text().to_string(),
        }
    }

    /// Recover the declared name from a declarator chain.
    fn declarator_name(&self, node: Node<'tu>) -> Option<String> {
        if let Some(decl) = node.child_by_field_name("declarator") {
            return self.declarator_name(decl);
        }

        match node.kind() {
            "identifier" | "field_identifier" | "type_identifier" | "destructor_name"
            | "operator_name" => Some(self.node_text(node).to_string()),
            "qualified_identifier" => node
                .child_by_field_name("name")
                .map(|name| self.node_text(name).to_string()),
            "function_declarator" | "pointer_declarator" | "reference_declarator"
            | "parenthesized_declarator" | "init_declarator" | "field_declaration"
            | "declaration" | "type_definition" | "function_definition" => {
                let mut walk = node.walk();
                for child in node.children(&mut walk) {
                    if let Some(name) = self.declarator_name(child) {
                        return Some(name);
                    }
                }
                None
            }
            _ => None,
        }
    }

    /// Name of the nearest enclosing class-like type, used to tell
    /// constructors from methods.
    fn enclosing_type_name(&self) -> Option<String> {
        let mut parent = self.node.parent();
        while let Some(node) = parent {
            match node.kind() {
                "class_specifier" | "struct_specifier" | "union_specifier" => {
                    return node
                        .child_by_field_name("name")
                        .map(|n| self.node_text(n).to_string());
                }
                _ => {}
            }
            parent = node.parent();
        }
        None
    }

    // --- specifier flags ---

    /// Declared `static`?
    pub fn is_static(&self) -> bool {
        let mut walk = self.node.walk();
        for child in self.node.children(&mut walk) {
            if child.kind() == "storage_class_specifier" && self.node_text(child) == "static" {
                return true;
            }
        }
        false
    }

    /// Spelled `virtual`, or carrying an `override`/`final` specifier?
    pub fn is_virtual(&self) -> bool {
        if self.has_child_of_kind("virtual") {
            return true;
        }
        if let Some(declarator) = self.function_declarator() {
            let mut walk = declarator.walk();
            for child in declarator.children(&mut walk) {
                if matches!(self.node_text(child), "override" | "final") {
                    return true;
                }
            }
        }
        false
    }

    /// Pure-virtual declaration (trailing `= 0`)?
    pub fn is_pure_virtual(&self) -> bool {
        let spellings: Vec<String> = tokens::tokenize(self.text().as_bytes())
            .into_iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .map(|t| t.spelling)
            .collect();
        let mut tail: Vec<&str> = spellings.iter().map(String::as_str).collect();
        while tail.last() == Some(&";") {
            tail.pop();
        }
        tail.ends_with(&["=", "0"])
    }

    // --- function shape ---

    fn function_declarator(&self) -> Option<Node<'tu>> {
        Self::find_function_declarator(self.node)
    }

    fn find_function_declarator(node: Node<'tu>) -> Option<Node<'tu>> {
        if node.kind() == "function_declarator" {
            return Some(node);
        }
        let mut walk = node.walk();
        for child in node.children(&mut walk) {
            match child.kind() {
                "function_declarator" => return Some(child),
                "pointer_declarator"
                | "reference_declarator"
                | "init_declarator"
                | "parenthesized_declarator" => {
                    if let Some(found) = Self::find_function_declarator(child) {
                        return Some(found);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Positional arguments of a method-like node, in declaration order.
    pub fn arguments(&self) -> Vec<Cursor<'tu>> {
        let Some(declarator) = self.function_declarator() else {
            return Vec::new();
        };
        let Some(params) = declarator.child_by_field_name("parameters") else {
            return Vec::new();
        };

        let mut walk = params.walk();
        let args: Vec<Cursor<'tu>> = params
            .children(&mut walk)
            .filter(|n| {
                matches!(
                    n.kind(),
                    "parameter_declaration" | "optional_parameter_declaration"
                )
            })
            .map(|n| self.wrap(n))
            .collect();

        // `f(void)` declares no parameters
        if args.len() == 1 && args[0].text().trim() == "void" {
            return Vec::new();
        }
        args
    }

    /// Number of declared arguments.
    pub fn num_arguments(&self) -> usize {
        self.arguments().len()
    }

    /// The declared type of a parameter or field, qualifiers and
    /// declarator shape included (`const btVector3 &`).
    pub fn type_spelling(&self) -> String {
        let mut spelling = String::new();
        let mut walk = self.node.walk();
        for child in self.node.children(&mut walk) {
            if child.kind() == "type_qualifier" {
                spelling.push_str(self.node_text(child));
                spelling.push(' ');
            }
        }

        if let Some(ty) = self.node.child_by_field_name("type") {
            spelling.push_str(self.node_text(ty));
        }

        let shape = self
            .node
            .child_by_field_name("declarator")
            .map(|d| Self::declarator_shape(self, d))
            .unwrap_or_default();
        if !shape.is_empty() {
            spelling.push(' ');
            spelling.push_str(&shape);
        }

        spelling
    }

    /// Pointer/reference punctuation contributed by a declarator chain.
    fn declarator_shape(&self, node: Node<'tu>) -> String {
        match node.kind() {
            "pointer_declarator" => {
                let inner = node
                    .child_by_field_name("declarator")
                    .map(|d| Self::declarator_shape(self, d))
                    .unwrap_or_default();
                format!("*{inner}")
            }
            "reference_declarator" => {
                let mut walk = node.walk();
                let amp = node
                    .children(&mut walk)
                    .find(|n| matches!(n.kind(), "&" | "&&"))
                    .map(|n| self.node_text(n).to_string())
                    .unwrap_or_else(|| "&".to_string());
                let inner = node
                    .child_by_field_name("declarator")
                    .map(|d| Self::declarator_shape(self, d))
                    .unwrap_or_default();
                format!("{amp}{inner}")
            }
            _ => String::new(),
        }
    }

    /// The spelled return type of a method-like node, including pointer or
    /// reference shape between the type and the parameter list.
    pub fn result_type_spelling(&self) -> String {
        let mut spelling = String::new();
        let mut walk = self.node.walk();
        for child in self.node.children(&mut walk) {
            if child.kind() == "type_qualifier" {
                spelling.push_str(self.node_text(child));
                spelling.push(' ');
            }
        }

        match self.node.child_by_field_name("type") {
            Some(ty) => spelling.push_str(self.node_text(ty)),
            None => return String::new(), // constructors and destructors
        }

        let mut shape = String::new();
        let mut current = self.node.child_by_field_name("declarator");
        while let Some(node) = current {
            match node.kind() {
                "pointer_declarator" => shape.push('*'),
                "reference_declarator" => shape.push('&'),
                _ => break,
            }
            current = node.child_by_field_name("declarator").or_else(|| {
                let mut walk = node.walk();
                let next = node
                    .children(&mut walk)
                    .find(|n| n.kind().ends_with("declarator"));
                next
            });
        }
        if !shape.is_empty() {
            spelling.push(' ');
            spelling.push_str(&shape);
        }

        spelling
    }

    // --- enums ---

    /// The enumerator nodes of an enum definition, in declaration order.
    pub fn enum_constants(&self) -> Vec<Cursor<'tu>> {
        let Some(body) = self.node.child_by_field_name("body") else {
            return Vec::new();
        };
        let mut walk = body.walk();
        body.children(&mut walk)
            .filter(|n| n.kind() == "enumerator")
            .map(|n| self.wrap(n))
            .collect()
    }

    /// The initializer expression of an enumerator, if written.
    pub fn enum_value(&self) -> Option<Cursor<'tu>> {
        self.node
            .child_by_field_name("value")
            .map(|n| self.wrap(n))
    }

    // --- typedefs ---

    /// If this typedef declares a type inline (`typedef struct { ... } T;`),
    /// the declared specifier node.
    pub fn typedef_declared_type(&self) -> Option<Cursor<'tu>> {
        self.nested_type_specifier().map(|n| self.wrap(n))
    }

    /// Does this typedef name a function-pointer type?
    pub fn typedef_is_function_pointer(&self) -> bool {
        let Some(declarator) = self.node.child_by_field_name("declarator") else {
            return false;
        };
        let Some(func) = Self::find_function_declarator(declarator) else {
            return false;
        };
        subtree_contains_kind(func, "pointer_declarator")
    }

    // --- traversal ---

    /// Declaration-level children of this node.
    ///
    /// Wrapper nodes of the grammar (namespace bodies, linkage blocks,
    /// member lists, base clauses, template parameter lists) are flattened
    /// so a class's children are its base specifiers, template parameters
    /// and members, in source order.
    pub fn logical_children(&self) -> Vec<Cursor<'tu>> {
        match self.node.kind() {
            "translation_unit" | "declaration_list" | "field_declaration_list" => {
                // extern "C" blocks are transparent scopes
                let mut children = Vec::new();
                for child in self.all_children() {
                    if child.node.kind() == "linkage_specification" {
                        children.extend(child.logical_children());
                    } else {
                        children.push(child);
                    }
                }
                children
            }
            "linkage_specification" => match self.node.child_by_field_name("body") {
                Some(body) if body.kind() == "declaration_list" => {
                    self.wrap(body).logical_children()
                }
                Some(body) => vec![self.wrap(body)],
                None => Vec::new(),
            },
            "namespace_definition" => match self.node.child_by_field_name("body") {
                Some(body) => self.wrap(body).all_children(),
                None => self.all_children(),
            },
            "template_declaration" => {
                let mut children = Vec::new();
                if let Some(params) = self.child_of_kind("template_parameter_list") {
                    let mut walk = params.walk();
                    children.extend(
                        params
                            .children(&mut walk)
                            .filter(|n| n.kind() == "type_parameter_declaration")
                            .map(|n| self.wrap(n)),
                    );
                }
                if let Some(inner) = self.template_inner() {
                    children.extend(inner.logical_children());
                }
                children
            }
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                let mut children = Vec::new();
                if let Some(bases) = self.child_of_kind("base_class_clause") {
                    let mut walk = bases.walk();
                    // Template-shaped bases are left to token-level recovery.
                    children.extend(
                        bases
                            .children(&mut walk)
                            .filter(|n| {
                                matches!(n.kind(), "type_identifier" | "qualified_identifier")
                            })
                            .map(|n| self.wrap(n)),
                    );
                }
                if let Some(body) = self.node.child_by_field_name("body") {
                    children.extend(self.wrap(body).all_children());
                }
                children
            }
            "enum_specifier" => self.enum_constants(),
            "type_definition" => Vec::new(),
            _ => self.all_children(),
        }
    }

    /// Depth-first visit of declaration-level children. The callback decides
    /// per node whether to descend (`Visit::Recurse`, used to flatten union
    /// members into the enclosing scope).
    pub fn visit_children<F>(&self, f: &mut F)
    where
        F: FnMut(Cursor<'tu>) -> Visit,
    {
        for child in self.logical_children() {
            if let Visit::Recurse = f(child) {
                child.visit_children(f);
            }
        }
    }
}

fn subtree_contains_kind(node: Node, kind: &str) -> bool {
    if node.kind() == kind {
        return true;
    }
    let mut walk = node.walk();
    let children: Vec<Node> = node.children(&mut walk).collect();
    children
        .into_iter()
        .any(|child| subtree_contains_kind(child, kind))
}
