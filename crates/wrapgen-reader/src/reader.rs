//! The header reader: walks header ASTs and builds the semantic model.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use wrapgen_ast::{self as ast, Cursor, NodeKind, TokenKind, Visit};
use wrapgen_model::{
    AccessSpecifier, ClassDefinition, ClassKind, EnumConstant, FieldDefinition, HeaderDefinition,
    MarshalDirection, MethodDefinition, ModelRegistry, ParameterDefinition, TypeRef,
};

use crate::context::ReaderContext;
use crate::diagnostics::Diagnostic;
use crate::errors::{ReaderError, ReaderResult};

/// Operators that never enter the model: allocation functions, compound
/// assignment, comparison, call and copy assignment.
const EXCLUDED_METHODS: &[&str] = &[
    "operator new",
    "operator delete",
    "operator new[]",
    "operator delete[]",
    "operator+=",
    "operator-=",
    "operator*=",
    "operator/=",
    "operator==",
    "operator!=",
    "operator()",
    "operator=",
];

/// Where and what to read.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Directories scanned recursively for headers.
    pub source_roots: Vec<PathBuf>,

    /// File extensions treated as headers, without the dot.
    pub header_extensions: Vec<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            source_roots: Vec::new(),
            header_extensions: vec!["h".to_string(), "hpp".to_string()],
        }
    }
}

/// Reads C++ headers into a [`ModelRegistry`].
///
/// A reader borrows the registry for its whole run. Construction seeds the
/// worklist from the configured source roots against the registry's known
/// headers; [`CppReader::read_headers`] then drains the worklist, merging
/// what it finds into the registry incrementally.
pub struct CppReader<'p> {
    registry: &'p mut ModelRegistry,
    worklist: Vec<PathBuf>,
    excluded_methods: HashSet<&'static str>,
    context: ReaderContext,
    diagnostics: Vec<Diagnostic>,
}

impl<'p> CppReader<'p> {
    /// Create a reader and seed its worklist from the source roots.
    ///
    /// Headers marked excluded in the registry are skipped; headers not yet
    /// in the registry are reported as new.
    pub fn new(registry: &'p mut ModelRegistry, config: &ReaderConfig) -> ReaderResult<Self> {
        let mut reader = Self {
            registry,
            worklist: Vec::new(),
            excluded_methods: EXCLUDED_METHODS.iter().copied().collect(),
            context: ReaderContext::new(),
            diagnostics: Vec::new(),
        };
        reader.seed_worklist(config)?;
        Ok(reader)
    }

    fn seed_worklist(&mut self, config: &ReaderConfig) -> ReaderResult<()> {
        let mut found = Vec::new();
        for root in &config.source_roots {
            collect_headers(root, &config.header_extensions, &mut found)?;
        }
        found.sort();

        for path in found {
            let key = canonical_key(&path);
            match self.registry.header(&key) {
                Some(header) if header.is_excluded => continue,
                Some(_) => {}
                None => self.report(Diagnostic::NewHeader(key)),
            }
            self.worklist.push(path);
        }
        Ok(())
    }

    /// Headers still waiting to be processed.
    pub fn pending_headers(&self) -> &[PathBuf] {
        &self.worklist
    }

    /// Diagnostics recorded so far, in observation order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain the worklist, reading every pending header into the registry,
    /// then sweep for classes whose definition was never seen.
    ///
    /// Each header's parse is released before the next one begins. A header
    /// is removed from the worklist as soon as its translation unit is
    /// reached, so the loop advances even if the file contributes nothing.
    pub fn read_headers(&mut self) -> ReaderResult<()> {
        while let Some(path) = self.worklist.first().cloned() {
            debug!("reading header {}", path.display());
            let header = ast::parse_header(&path)?;
            self.process_header(&header);
            // process_header removes the entry; a malformed path that never
            // round-trips through canonicalization still must not loop
            self.worklist.retain(|p| p != &path);
        }
        self.finish();
        Ok(())
    }

    /// Read in-memory source as a header with the given logical path.
    ///
    /// Merges into the registry exactly like a file from the worklist, but
    /// does not touch the worklist and does not run the end-of-run sweep.
    pub fn read_source(&mut self, source: &str, path: &Path) -> ReaderResult<()> {
        let header = ast::parse_source(source, path)?;
        self.process_header(&header);
        Ok(())
    }

    fn process_header(&mut self, header: &ast::HeaderAst) {
        let key = canonical_key(header.path());
        self.worklist.retain(|p| canonical_key(p) != key);

        if self.registry.header(&key).is_none() {
            self.registry
                .insert_header(key.clone(), HeaderDefinition::new(key.clone()));
        }

        self.context.header = Some(key);
        let root = header.root();
        for child in root.logical_children() {
            self.visit_top_level(child);
        }
        self.context.header = None;
    }

    /// End-of-run sweep: classes still unparsed have no definition in any
    /// header that was read.
    fn finish(&mut self) {
        let removed: Vec<String> = self
            .registry
            .unparsed_classes()
            .into_iter()
            .map(String::from)
            .collect();
        for key in removed {
            self.report(Diagnostic::ClassRemoved(key));
        }
        info!(
            "read complete: {} headers, {} classes",
            self.registry.headers.len(),
            self.registry.classes.len()
        );
    }

    // --- traversal ---

    fn visit_top_level(&mut self, cursor: Cursor) {
        let cursor = cursor.inner_definition();
        match cursor.kind() {
            NodeKind::Namespace => {
                let name = cursor.spelling();
                let named = !name.is_empty();
                if named {
                    self.context.namespace.push(name);
                }
                for child in cursor.logical_children() {
                    self.visit_top_level(child);
                }
                if named {
                    self.context.namespace.pop();
                }
            }
            NodeKind::Class | NodeKind::Struct | NodeKind::ClassTemplate | NodeKind::Enum => {
                if cursor.is_definition() {
                    self.parse_class(cursor);
                }
            }
            NodeKind::Typedef => self.parse_typedef(cursor),
            _ => {}
        }
    }

    /// The registry key a definition named `name` gets in the current scope.
    fn qualified_name(&self, name: &str) -> String {
        if let Some(class) = &self.context.class {
            format!("{class}::{name}")
        } else if self.context.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", self.context.namespace_path(), name)
        }
    }

    /// Build or merge the class-like definition under `cursor`.
    fn parse_class(&mut self, cursor: Cursor) {
        let kind = cursor.kind();
        let name = cursor.spelling();

        // An anonymous struct member contributes its fields directly to the
        // enclosing scope, always publicly visible.
        if name.is_empty() && kind == NodeKind::Struct {
            let saved_access = self.context.member_access;
            self.context.member_access = AccessSpecifier::Public;
            cursor.visit_children(&mut |child| self.visit_member(child));
            self.context.member_access = saved_access;
            return;
        }

        let key = self.qualified_name(&name);

        // A definition already visited this run stays as-is.
        if self.registry.class(&key).map(|c| c.is_parsed) == Some(true) {
            return;
        }

        if self.registry.class(&key).is_some() {
            self.adopt_placeholder(&key, kind);
        } else {
            self.create_class(&name, &key, kind);
        }

        {
            // registered above, lookup cannot fail
            let Some(class) = self.registry.class_mut(&key) else {
                return;
            };
            class.is_parsed = true;
            match kind {
                NodeKind::Struct => class.is_struct = true,
                NodeKind::Typedef => class.is_function_proto = true,
                _ => {}
            }
        }

        self.register_in_scope(&key);

        let saved_access = self.context.member_access;
        self.context.member_access = match kind {
            NodeKind::Struct => AccessSpecifier::Public,
            NodeKind::Class => AccessSpecifier::Private,
            NodeKind::ClassTemplate => {
                if cursor.template_inner_is_struct() {
                    AccessSpecifier::Public
                } else {
                    AccessSpecifier::Private
                }
            }
            _ => saved_access,
        };
        let saved_class = self.context.class.replace(key.clone());

        match kind {
            NodeKind::Enum => self.parse_enum_constants(cursor, &key),
            NodeKind::Typedef => {} // a function prototype has no members
            _ => {
                cursor.visit_children(&mut |child| self.visit_member(child));
                let has_base = self
                    .registry
                    .class(&key)
                    .map(|c| c.base_class.is_some())
                    .unwrap_or(true);
                if !has_base {
                    self.recover_template_base(cursor, &key);
                }
            }
        }

        self.context.class = saved_class;
        self.context.member_access = saved_access;
    }

    /// Re-attach a placeholder loaded from prior state (or created by a
    /// forward reference) to the definition being visited.
    fn adopt_placeholder(&mut self, key: &str, kind: NodeKind) {
        let parent = self.context.class.clone();
        let header = self.context.header.clone();
        let namespace = self.context.namespace_path();

        let Some(class) = self.registry.class_mut(key) else {
            return;
        };
        class.parent = parent;
        class.namespace = namespace;
        if class.header.is_none() {
            class.header = header;
        }
        match kind {
            NodeKind::ClassTemplate if !matches!(class.kind, ClassKind::Template { .. }) => {
                class.kind = ClassKind::Template {
                    parameters: Vec::new(),
                };
            }
            NodeKind::Enum if !matches!(class.kind, ClassKind::Enum { .. }) => {
                class.kind = ClassKind::Enum {
                    constants: Vec::new(),
                };
            }
            _ => {}
        }
        class.reset_derived_state();
    }

    fn create_class(&mut self, name: &str, key: &str, kind: NodeKind) {
        let class_kind = match kind {
            NodeKind::ClassTemplate => ClassKind::Template {
                parameters: Vec::new(),
            },
            NodeKind::Enum => ClassKind::Enum {
                constants: Vec::new(),
            },
            _ => ClassKind::Class,
        };
        let class = ClassDefinition::new(
            name,
            class_kind,
            self.context.header.clone(),
            self.context.class.clone(),
        )
        .with_namespace(self.context.namespace_path());

        let computed = class.fully_qualified_name();
        if computed != key {
            self.report(Diagnostic::NameMismatch {
                computed,
                key: key.to_string(),
            });
        }
        self.registry.insert_class(key, class);
    }

    /// Record the new definition in its owning scope: the enclosing class's
    /// nested list, or the current header's top-level list.
    fn register_in_scope(&mut self, key: &str) {
        if let Some(parent_key) = self.context.class.clone() {
            if let Some(parent) = self.registry.class_mut(&parent_key) {
                parent.add_nested_class(key);
            }
        } else if let Some(header_key) = self.context.header.clone() {
            if let Some(header) = self.registry.header_mut(&header_key) {
                header.add_class(key);
            }
        }
    }

    fn parse_enum_constants(&mut self, cursor: Cursor, key: &str) {
        let mut constants = Vec::new();
        for constant in cursor.enum_constants() {
            let value = match constant.enum_value() {
                Some(value) => ast::tokens::tokenize(value.text().as_bytes())
                    .into_iter()
                    .filter(|t| {
                        t.kind != TokenKind::Comment && t.spelling != "," && t.spelling != "}"
                    })
                    .map(|t| t.spelling)
                    .collect::<String>(),
                None => String::new(),
            };
            constants.push(EnumConstant::new(constant.spelling(), value));
        }

        if let Some(class) = self.registry.class_mut(key) {
            class.kind = ClassKind::Enum { constants };
        }
    }

    /// One member of the class currently in context.
    fn visit_member(&mut self, cursor: Cursor) -> Visit {
        match cursor.kind() {
            NodeKind::Access => {
                if let Some(access) = AccessSpecifier::from_keyword(cursor.text()) {
                    self.context.member_access = access;
                }
                return Visit::Continue;
            }
            NodeKind::BaseSpecifier => {
                self.resolve_base(cursor);
                return Visit::Continue;
            }
            NodeKind::TemplateTypeParameter => {
                self.add_template_parameter(cursor.spelling());
                return Visit::Continue;
            }
            _ => {}
        }

        // Visibility gate. Non-public members are normally invisible, with
        // two exceptions: constructors (their presence suppresses default
        // construction downstream) and virtual methods, which stay visible
        // until the access filter decides their fate.
        if self.context.member_access != AccessSpecifier::Public {
            let visible = match cursor.kind() {
                NodeKind::Constructor => true,
                NodeKind::Method => {
                    (cursor.is_virtual() && !cursor.is_pure_virtual())
                        || self.overrides_inherited_abstract(
                            &cursor.spelling(),
                            cursor.num_arguments(),
                        )
                }
                _ => false,
            };
            if !visible {
                return Visit::Continue;
            }
        }

        match cursor.kind() {
            NodeKind::Class | NodeKind::Struct | NodeKind::ClassTemplate | NodeKind::Enum => {
                let definition = cursor.inner_definition();
                if definition.is_definition() {
                    self.parse_class(definition);
                }
            }
            NodeKind::Method | NodeKind::Constructor => self.parse_method(cursor),
            NodeKind::Field => self.parse_field(cursor),
            NodeKind::Typedef => self.parse_typedef(cursor),
            // union members belong to the enclosing class
            NodeKind::Union => return Visit::Recurse,
            NodeKind::Destructor
            | NodeKind::ConversionOperator
            | NodeKind::FunctionTemplate
            | NodeKind::Namespace
            | NodeKind::EnumConstant
            | NodeKind::Access
            | NodeKind::BaseSpecifier
            | NodeKind::TemplateTypeParameter
            | NodeKind::Other => {}
        }
        Visit::Continue
    }

    fn add_template_parameter(&mut self, parameter: String) {
        let Some(class_key) = self.context.class.clone() else {
            return;
        };
        if let Some(class) = self.registry.class_mut(&class_key) {
            if let Some(parameters) = class.template_parameters_mut() {
                if !parameters.contains(&parameter) {
                    parameters.push(parameter);
                }
            }
        }
    }

    /// Resolve a structural base-class name against the registry. The last
    /// base visited wins; single inheritance is all downstream generation
    /// supports.
    fn resolve_base(&mut self, cursor: Cursor) {
        let spelled = cursor.text().to_string();
        let Some(class_key) = self.context.class.clone() else {
            return;
        };

        match self.resolve_type_name(&spelled) {
            Some(base_key) => {
                if let Some(class) = self.registry.class_mut(&class_key) {
                    class.base_class = Some(base_key);
                }
            }
            None => {
                let class = self
                    .registry
                    .class(&class_key)
                    .map(|c| c.name.clone())
                    .unwrap_or(class_key);
                self.report(Diagnostic::BaseNotFound {
                    class,
                    base: spelled,
                });
            }
        }
    }

    /// Resolve a name spelled in the current scope to a registry key.
    ///
    /// Lookup peels the current scope outward: the current class key (whose
    /// segments already cover the enclosing classes and namespaces), one
    /// trailing segment at a time, then the bare name. A name local to an
    /// inner scope therefore shadows a global one.
    fn resolve_type_name(&self, name: &str) -> Option<String> {
        let scope = match &self.context.class {
            Some(class_key) => class_key.clone(),
            None => self.context.namespace_path(),
        };

        let mut segments: Vec<&str> = if scope.is_empty() {
            Vec::new()
        } else {
            scope.split("::").collect()
        };
        while !segments.is_empty() {
            let key = format!("{}::{}", segments.join("::"), name);
            if self.registry.class(&key).is_some() {
                return Some(key);
            }
            segments.pop();
        }

        if self.registry.class(name).is_some() {
            return Some(name.to_string());
        }
        None
    }

    /// Does the base chain of the current class declare an abstract method
    /// with this (name, arity) identity?
    fn overrides_inherited_abstract(&self, name: &str, arity: usize) -> bool {
        let Some(class_key) = &self.context.class else {
            return false;
        };
        let Some(base) = self
            .registry
            .class(class_key)
            .and_then(|c| c.base_class.clone())
        else {
            return false;
        };
        self.registry
            .abstract_methods(&base)
            .contains(&(name.to_string(), arity))
    }

    fn parse_field(&mut self, cursor: Cursor) {
        let Some(class_key) = self.context.class.clone() else {
            return;
        };
        let field = FieldDefinition::new(cursor.spelling(), TypeRef::parse(&cursor.type_spelling()));
        if let Some(class) = self.registry.class_mut(&class_key) {
            class.fields.push(field);
        }
    }

    fn parse_typedef(&mut self, cursor: Cursor) {
        // `typedef struct { ... } T;` defines the type right here
        if let Some(declared) = cursor.typedef_declared_type() {
            if declared.is_definition() {
                self.parse_class(declared);
            }
            return;
        }
        // a function-pointer typedef becomes a prototype entity
        if cursor.typedef_is_function_pointer() {
            self.parse_class(cursor);
        }
    }

    /// Build or merge one method, then run the access/abstraction filter.
    fn parse_method(&mut self, cursor: Cursor) {
        let name = cursor.spelling();
        if self.excluded_methods.contains(name.as_str()) {
            return;
        }
        let Some(class_key) = self.context.class.clone() else {
            return;
        };
        let arity = cursor.num_arguments();
        let inherits_abstract = self.overrides_inherited_abstract(&name, arity);

        // Merge: detach the single unparsed method with this identity, or
        // start a fresh one. Populated parameter slots survive the merge.
        let (mut method, ambiguous) = {
            let Some(class) = self.registry.class_mut(&class_key) else {
                return;
            };
            let matches: Vec<usize> = class
                .methods
                .iter()
                .enumerate()
                .filter(|(_, m)| !m.is_parsed && m.name == name && m.arity() == arity)
                .map(|(index, _)| index)
                .collect();
            let ambiguous = matches.len() > 1;
            let method = match matches.first() {
                Some(&index) => class.methods.remove(index),
                None => MethodDefinition::new(&name, arity),
            };
            (method, ambiguous)
        };
        if ambiguous {
            self.report(Diagnostic::AmbiguousMethod {
                class: class_key.clone(),
                method: name.clone(),
            });
        }

        method.return_type = TypeRef::parse(&cursor.result_type_spelling());
        method.is_static = cursor.is_static();
        method.is_abstract = cursor.is_pure_virtual();
        method.is_virtual = cursor.is_virtual() || method.is_abstract || inherits_abstract;
        method.is_constructor = cursor.kind() == NodeKind::Constructor;
        method.access = self.context.member_access;

        self.context.method = Some(method);
        for (index, argument) in cursor.arguments().into_iter().enumerate() {
            let Some(method) = self.context.method.as_mut() else {
                break;
            };
            let Some(slot) = method.parameters.get_mut(index) else {
                continue;
            };
            match slot {
                // an existing parameter keeps its (possibly customized)
                // name and direction; only the type is refreshed
                Some(parameter) => {
                    parameter.type_ref = TypeRef::parse(&argument.type_spelling());
                }
                None => {
                    *slot = Some(ParameterDefinition::new(
                        argument.spelling(),
                        TypeRef::parse(&argument.type_spelling()),
                    ));
                }
            }
            if let Some(parameter) = slot {
                if ast::tokens::tokenize(argument.text().as_bytes())
                    .iter()
                    .any(|t| t.kind == TokenKind::Punctuation && t.spelling == "=")
                {
                    parameter.is_optional = true;
                }
                if parameter.marshal_direction == MarshalDirection::Default {
                    parameter.marshal_direction = parameter.type_ref.default_marshal_direction();
                }
            }
        }
        let Some(mut method) = self.context.method.take() else {
            return;
        };
        method.is_parsed = true;

        // Access/abstraction filter: a non-public method is kept only if it
        // is a constructor or overrides an inherited abstract method.
        let keep = self.context.member_access == AccessSpecifier::Public
            || method.is_constructor
            || inherits_abstract;
        if keep {
            if let Some(class) = self.registry.class_mut(&class_key) {
                class.methods.push(method);
            }
        }
    }

    /// Recover a base only spelled as a template instantiation from raw
    /// tokens, since the instantiation has no structural definition node.
    ///
    /// The tokens between the first `:` and the first `{` of the class
    /// extent are scanned for `Name<Args>`; a synthesized instantiation
    /// entity is registered (linked to the generic definition when one is
    /// known) and becomes the base.
    fn recover_template_base(&mut self, cursor: Cursor, class_key: &str) {
        let clause: Vec<ast::Token> = ast::tokens::tokenize(cursor.text().as_bytes())
            .into_iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .take_while(|t| t.spelling != "{")
            .skip_while(|t| t.spelling != ":")
            .collect();
        if clause.is_empty() {
            return;
        }

        let Some(open) = clause.iter().position(|t| t.spelling == "<") else {
            return;
        };
        let Some(close) = clause.iter().position(|t| t.spelling == ">") else {
            return;
        };
        if open == 0 || close <= open + 1 {
            return;
        }

        let template = clause[open - 1].spelling.clone();
        let argument = clause[open + 1..close]
            .iter()
            .map(|t| t.spelling.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let argument = TypeRef::basic_name(&argument);
        let instantiation_key = format!("{template}<{argument}>");

        if let Some(existing) = self.registry.class_mut(&instantiation_key) {
            // carried over from prior state; the base clause still names it
            existing.is_parsed = true;
        } else {
            let generic_key = self
                .registry
                .find_class_by_name(&template)
                .map(|(key, _)| key.clone());
            let mut instantiation = ClassDefinition::new(
                &template,
                ClassKind::Template {
                    parameters: vec![argument],
                },
                self.context.header.clone(),
                None,
            );
            instantiation.base_class = generic_key;
            // synthesized this run, not a stale carry-over
            instantiation.is_parsed = true;
            self.registry
                .insert_class(instantiation_key.clone(), instantiation);
            if let Some(header_key) = self.context.header.clone() {
                if let Some(header) = self.registry.header_mut(&header_key) {
                    header.add_class(instantiation_key.clone());
                }
            }
        }

        if let Some(class) = self.registry.class_mut(class_key) {
            class.base_class = Some(instantiation_key);
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::NewHeader(_) => info!("{diagnostic}"),
            _ => warn!("{diagnostic}"),
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Canonical registry key for a header path.
fn canonical_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn collect_headers(
    dir: &Path,
    extensions: &[String],
    found: &mut Vec<PathBuf>,
) -> ReaderResult<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    let entries = fs::read_dir(dir).map_err(|e| ReaderError::Io(dir.to_path_buf(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ReaderError::Io(dir.to_path_buf(), e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_headers(&path, extensions, found)?;
        } else if let Some(extension) = path.extension() {
            let extension = extension.to_string_lossy();
            if extensions.iter().any(|e| *e == extension) {
                found.push(path);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_extensions() {
        let config = ReaderConfig::default();
        assert_eq!(config.header_extensions, vec!["h", "hpp"]);
        assert!(config.source_roots.is_empty());
    }

    #[test]
    fn test_canonical_key_normalizes_separators() {
        assert_eq!(
            canonical_key(Path::new("src\\math\\vector.h")),
            "src/math/vector.h"
        );
    }

    #[test]
    fn test_excluded_operator_set() {
        let mut registry = ModelRegistry::new();
        let reader = CppReader::new(&mut registry, &ReaderConfig::default()).unwrap();
        assert!(reader.excluded_methods.contains("operator="));
        assert!(reader.excluded_methods.contains("operator new[]"));
        assert!(!reader.excluded_methods.contains("operator<"));
    }
}
