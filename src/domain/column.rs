use crate::domain::id::{CardId, ColumnId};
use serde::{Deserialize, Serialize};

/// A named group of cards. The card sequence itself lives in the card order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    /// Draft text of the add-card form
    #[serde(default, skip_serializing)]
    pub text: String,
}

impl Column {
    pub fn new(id: ColumnId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            text: String::new(),
        }
    }

    /// Whether the add-card form holds anything besides whitespace
    pub fn has_draft(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Column as presented: ordered and filtered card IDs plus counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub id: ColumnId,
    pub title: String,
    pub cards: Vec<CardId>,
    /// Cards in the column before filtering
    pub total_count: usize,
    pub filtered: bool,
}
