use thiserror::Error;

pub type Result<T> = std::result::Result<T, KanbanError>;

#[derive(Debug, Error)]
pub enum KanbanError {
    /// The order map is corrupted: a cycle, an orphan, a self-loop or a
    /// card with two predecessors.
    #[error("Order invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("Identifier already present in order: {0}")]
    DuplicateIdentifier(String),

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl KanbanError {
    /// True for errors that signal a corrupted order rather than bad input
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}
