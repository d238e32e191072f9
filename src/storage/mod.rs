use crate::{
    domain::{Card, CardId, Column, OrderMap, OrderPatch},
    error::Result,
};
use async_trait::async_trait;

pub mod memory;

pub use memory::MemoryStorage;

/// Persistence collaborator for board data.
///
/// Order patches are partial (only changed keys) and must be idempotent
/// under retry. The board never waits on these calls to render.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Loads all columns, in no particular order
    async fn load_columns(&self) -> Result<Vec<Column>>;

    /// Loads the column order (board root as the single head)
    async fn load_columns_order(&self) -> Result<OrderMap>;

    /// Loads all cards, in no particular order
    async fn load_cards(&self) -> Result<Vec<Card>>;

    /// Loads the card order (one head per column)
    async fn load_cards_order(&self) -> Result<OrderMap>;

    /// Creates or replaces a card
    async fn save_card(&self, card: &Card) -> Result<()>;

    /// Deletes a card; deleting one that is already gone succeeds
    async fn delete_card(&self, id: &CardId) -> Result<()>;

    /// Creates or replaces a column
    async fn save_column(&self, column: &Column) -> Result<()>;

    /// Merges a patch into the stored card order
    async fn patch_cards_order(&self, patch: &OrderPatch) -> Result<()>;

    /// Merges a patch into the stored column order
    async fn patch_columns_order(&self, patch: &OrderPatch) -> Result<()>;
}
