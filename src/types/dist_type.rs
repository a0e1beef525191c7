//! Distribution types
use std::fmt;

/// The way an axis is partitioned over its process grid axis
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistType {
    /// Not distributed: every process holds the whole axis
    #[cfg_attr(feature = "serde", serde(rename = "n"))]
    NotDistributed,
    /// Contiguous ranges
    #[cfg_attr(feature = "serde", serde(rename = "b"))]
    Block,
    /// Round-robin over single elements or over fixed-size blocks
    #[cfg_attr(feature = "serde", serde(rename = "c"))]
    Cyclic,
    /// Explicit list of global indices
    #[cfg_attr(feature = "serde", serde(rename = "u"))]
    Unstructured,
}

impl DistType {
    /// The one-letter code used in axis descriptors
    pub fn code(&self) -> char {
        match self {
            DistType::NotDistributed => 'n',
            DistType::Block => 'b',
            DistType::Cyclic => 'c',
            DistType::Unstructured => 'u',
        }
    }

    /// Create from a one-letter code
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'n' => Some(DistType::NotDistributed),
            'b' => Some(DistType::Block),
            'c' => Some(DistType::Cyclic),
            'u' => Some(DistType::Unstructured),
            _ => None,
        }
    }
}

impl fmt::Display for DistType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
