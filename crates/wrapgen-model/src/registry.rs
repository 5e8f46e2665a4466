//! The canonical store of model entities, keyed by fully-qualified name.

use crate::entities::{ClassDefinition, HeaderDefinition};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The canonical mapping from header paths to header definitions and from
/// fully-qualified entity names to class definitions.
///
/// A registry loaded from persisted state seeds the incremental merge: its
/// entities come back as unparsed placeholders which the reader adopts and
/// fills in as it re-visits their definitions. The registry left at the end
/// of a run is the new complete state.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRegistry {
    /// Header definitions keyed by canonical path.
    pub headers: HashMap<String, HeaderDefinition>,

    /// Class definitions keyed by fully-qualified name.
    pub classes: HashMap<String, ClassDefinition>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a class by fully-qualified name.
    pub fn class(&self, key: &str) -> Option<&ClassDefinition> {
        self.classes.get(key)
    }

    /// Look up a class mutably by fully-qualified name.
    pub fn class_mut(&mut self, key: &str) -> Option<&mut ClassDefinition> {
        self.classes.get_mut(key)
    }

    /// Look up a header by canonical path.
    pub fn header(&self, key: &str) -> Option<&HeaderDefinition> {
        self.headers.get(key)
    }

    /// Look up a header mutably by canonical path.
    pub fn header_mut(&mut self, key: &str) -> Option<&mut HeaderDefinition> {
        self.headers.get_mut(key)
    }

    /// Insert a class under its fully-qualified name.
    pub fn insert_class(&mut self, key: impl Into<String>, class: ClassDefinition) {
        self.classes.insert(key.into(), class);
    }

    /// Insert a header under its canonical path.
    pub fn insert_header(&mut self, key: impl Into<String>, header: HeaderDefinition) {
        self.headers.insert(key.into(), header);
    }

    /// Find a class registered under a bare (unqualified) name.
    ///
    /// Used by template-base recovery to link a synthesized instantiation to
    /// the generic template definition, which is registered under its own
    /// unparameterized name.
    pub fn find_class_by_name(&self, name: &str) -> Option<(&String, &ClassDefinition)> {
        self.classes.iter().find(|(_, class)| class.name == name)
    }

    /// The (name, arity) identities of every abstract method reachable
    /// through the base chain starting at `key`, inclusive.
    ///
    /// Cycle-guarded; a malformed base loop terminates the walk.
    pub fn abstract_methods(&self, key: &str) -> HashSet<(String, usize)> {
        let mut identities = HashSet::new();
        let mut visited = HashSet::new();
        let mut current = Some(key.to_string());

        while let Some(k) = current {
            if !visited.insert(k.clone()) {
                break;
            }
            let Some(class) = self.classes.get(&k) else {
                break;
            };
            for method in class.methods.iter().filter(|m| m.is_abstract) {
                identities.insert((method.name.clone(), method.arity()));
            }
            current = class.base_class.clone();
        }

        identities
    }

    /// Fully-qualified names of classes whose definition was not seen this
    /// run, in no particular order.
    pub fn unparsed_classes(&self) -> Vec<&str> {
        self.classes
            .iter()
            .filter(|(_, class)| !class.is_parsed)
            .map(|(key, _)| key.as_str())
            .collect()
    }
}
