use crate::error::{KanbanError, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path, time::Duration};

/// Column created when the store has none yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSeed {
    pub id: String,
    pub title: String,
}

impl ColumnSeed {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
        }
    }
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub name: String,
    /// How long a drop target stays highlighted without a hover pulse
    pub hover_timeout_ms: u64,
    pub columns: Vec<ColumnSeed>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Kanban board".to_string(),
            hover_timeout_ms: 100,
            columns: vec![
                ColumnSeed::new("A", "TODO"),
                ColumnSeed::new("B", "Doing"),
                ColumnSeed::new("C", "Waiting"),
                ColumnSeed::new("D", "Done"),
            ],
        }
    }
}

impl BoardConfig {
    /// Parses a JSON configuration; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn hover_timeout(&self) -> Duration {
        Duration::from_millis(self.hover_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.hover_timeout_ms == 0 {
            return Err(KanbanError::ConfigError(
                "hover_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(seed) = self.columns.iter().find(|c| c.id.trim().is_empty()) {
            return Err(KanbanError::ConfigError(format!(
                "column '{}' has an empty id",
                seed.title
            )));
        }
        let mut seen = HashSet::new();
        if let Some(seed) = self.columns.iter().find(|c| !seen.insert(c.id.as_str())) {
            return Err(KanbanError::ConfigError(format!(
                "column id '{}' is used more than once",
                seed.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BoardConfig::default();
        assert_eq!(config.hover_timeout(), Duration::from_millis(100));
        assert_eq!(config.columns.len(), 4);
        assert_eq!(config.columns[0].title, "TODO");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BoardConfig::from_json_str(r#"{"hover_timeout_ms": 250}"#).unwrap();
        assert_eq!(config.hover_timeout_ms, 250);
        assert_eq!(config.name, "Kanban board");
        assert_eq!(config.columns.len(), 4);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = BoardConfig::from_json_str(r#"{"hover_timeout_ms": 0}"#).unwrap_err();
        assert!(matches!(err, KanbanError::ConfigError(_)));
    }

    #[test]
    fn test_duplicate_column_ids_rejected() {
        let json = r#"{"columns": [
            {"id": "A", "title": "TODO"},
            {"id": "B", "title": "Doing"},
            {"id": "A", "title": "Done"}
        ]}"#;
        let err = BoardConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, KanbanError::ConfigError(msg) if msg.contains("'A'")));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = BoardConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, KanbanError::SerializationError(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = BoardConfig::load("/nonexistent/board.json").unwrap_err();
        assert!(matches!(err, KanbanError::IoError(_)));
    }
}
