//! Parameter marshalling direction for downstream code generation.

use serde::{Deserialize, Serialize};

/// Classification of a parameter as input-only, output-only, or both.
///
/// `Default` marks a parameter whose direction has not been decided yet;
/// the reader replaces it with the direction inferred from the parameter's
/// type shape unless a prior run (or a hand edit of the persisted state)
/// already pinned one down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarshalDirection {
    /// Not yet determined.
    #[default]
    Default,

    /// Data flows into the native call.
    In,

    /// Data flows out of the native call.
    Out,

    /// Data flows both ways.
    InOut,
}
