use serde::{Deserialize, Serialize};

/// A header file and the top-level definitions declared in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderDefinition {
    /// Canonical path of the header file, the registry key.
    pub path: String,

    /// Registry keys of the top-level classes declared here, in
    /// declaration order.
    pub classes: Vec<String>,

    /// Excluded headers are skipped when the worklist is seeded.
    pub is_excluded: bool,
}

impl HeaderDefinition {
    /// Create a definition for a newly discovered header.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            classes: Vec::new(),
            is_excluded: false,
        }
    }

    /// Mark this header as excluded from future runs.
    pub fn excluded(mut self) -> Self {
        self.is_excluded = true;
        self
    }

    /// Register a top-level class under this header, once.
    pub fn add_class(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.classes.contains(&key) {
            self.classes.push(key);
        }
    }
}
