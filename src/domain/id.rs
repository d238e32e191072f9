use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Opaque identifier shared by cards, columns and the board root.
///
/// Cards and columns draw from the same representation so that a column
/// identifier can act as the head sentinel of its card list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

pub type CardId = Identifier;
pub type ColumnId = Identifier;

impl Identifier {
    /// Head sentinel of the column order
    pub const BOARD_ROOT: &'static str = "__board__";

    /// Generates a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn board_root() -> Self {
        Self(Self::BOARD_ROOT.to_string())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identifier {
    type Err = crate::error::KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(crate::error::KanbanError::UnknownIdentifier(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
