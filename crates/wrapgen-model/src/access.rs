//! C++ member access levels.

use serde::{Deserialize, Serialize};

/// Visibility of a class member, governing whether it enters the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessSpecifier {
    /// Visible to all consumers.
    Public,

    /// Visible to the class and its subclasses.
    Protected,

    /// Visible to the class only.
    #[default]
    Private,
}

impl AccessSpecifier {
    /// Parse an access keyword as it appears in source (`public:`, `protected`, ...).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim_end_matches(':').trim() {
            "public" => Some(Self::Public),
            "protected" => Some(Self::Protected),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}
