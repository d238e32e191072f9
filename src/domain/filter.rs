use serde::{Deserialize, Serialize};

/// Keyword filter over card text.
///
/// The raw value is trimmed, lowercased and split on whitespace; a card
/// matches when its text contains every keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardFilter {
    value: String,
}

impl CardFilter {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_active(&self) -> bool {
        !self.value.trim().is_empty()
    }

    pub fn keywords(&self) -> Vec<String> {
        self.value
            .trim()
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_normalized() {
        let filter = CardFilter::new("  Wash   FACE ");
        assert!(filter.is_active());
        assert_eq!(filter.keywords(), vec!["wash".to_string(), "face".to_string()]);
    }

    #[test]
    fn test_blank_filter_is_inactive() {
        assert!(!CardFilter::new("   ").is_active());
        assert!(CardFilter::default().keywords().is_empty());
    }
}
