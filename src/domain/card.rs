use crate::domain::id::CardId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A card on the board.
///
/// The owning column is not stored; it follows from where the card sits in
/// the card order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Unsaved edit in progress
    #[serde(default, skip_serializing)]
    pub draft_text: Option<String>,
}

impl Card {
    /// Creates a new card with the given ID and text
    pub fn new(id: CardId, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            text: text.into(),
            created_at: now,
            updated_at: now,
            draft_text: None,
        }
    }

    /// Sets the text
    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.draft_text = None;
        self.updated_at = Utc::now();
    }

    pub fn set_draft(&mut self, draft: String) {
        self.draft_text = Some(draft);
    }

    /// Checks whether the text contains every keyword (keywords are expected lowercase)
    pub fn matches_keywords(&self, keywords: &[String]) -> bool {
        let text = self.text.to_lowercase();
        keywords.iter().all(|w| text.contains(w.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_creation() {
        let card = Card::new(CardId::from("a"), "Eat breakfast");
        assert_eq!(card.text, "Eat breakfast");
        assert_eq!(card.created_at, card.updated_at);
        assert!(card.draft_text.is_none());
    }

    #[test]
    fn test_set_text_clears_draft_and_updates_timestamp() {
        let mut card = Card::new(CardId::from("a"), "Old");
        let initial_updated_at = card.updated_at;
        card.set_draft("Ne".to_string());

        std::thread::sleep(std::time::Duration::from_millis(10));
        card.set_text("New".to_string());

        assert_eq!(card.text, "New");
        assert!(card.draft_text.is_none());
        assert!(card.updated_at > initial_updated_at);
    }

    #[test]
    fn test_matches_keywords() {
        let card = Card::new(CardId::from("a"), "Check SNS feed");
        assert!(card.matches_keywords(&["sns".to_string(), "check".to_string()]));
        assert!(!card.matches_keywords(&["sns".to_string(), "mail".to_string()]));
        assert!(card.matches_keywords(&[]));
    }

    #[test]
    fn test_draft_is_not_serialized() {
        let mut card = Card::new(CardId::from("a"), "Text");
        card.set_draft("editing".to_string());

        let json = serde_json::to_string(&card).unwrap();
        assert!(!json.contains("draft_text"));

        let loaded: Card = serde_json::from_str(&json).unwrap();
        assert!(loaded.draft_text.is_none());
    }
}
