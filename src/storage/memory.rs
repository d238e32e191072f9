use crate::{
    domain::{Card, CardId, Column, Identifier, OrderMap, OrderPatch},
    error::{KanbanError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
};
use tokio::sync::RwLock;

#[derive(Debug)]
struct Snapshot {
    columns: BTreeMap<Identifier, Column>,
    cards: BTreeMap<CardId, Card>,
    cards_order: OrderMap,
    columns_order: OrderMap,
}

/// In-memory storage backend
#[derive(Debug)]
pub struct MemoryStorage {
    inner: RwLock<Snapshot>,
    failing: AtomicBool,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Snapshot {
                columns: BTreeMap::new(),
                cards: BTreeMap::new(),
                cards_order: OrderMap::default(),
                columns_order: OrderMap::new([Identifier::board_root()]),
            }),
            failing: AtomicBool::new(false),
        }
    }

    /// Creates a store holding `columns` in the given order
    pub fn seeded(columns: Vec<Column>, cards: Vec<Card>, cards_order: OrderMap) -> Result<Self> {
        let column_ids: Vec<Identifier> = columns.iter().map(|c| c.id.clone()).collect();
        let columns_order =
            OrderMap::from_lists([(Identifier::board_root(), column_ids.as_slice())])?;

        let mut cards_order = cards_order;
        for id in &column_ids {
            cards_order.add_head(id.clone());
        }
        cards_order.validate()?;

        Ok(Self {
            inner: RwLock::new(Snapshot {
                columns: columns.into_iter().map(|c| (c.id.clone(), c)).collect(),
                cards: cards.into_iter().map(|c| (c.id.clone(), c)).collect(),
                cards_order,
                columns_order,
            }),
            failing: AtomicBool::new(false),
        })
    }

    /// Makes every write fail, simulating an unreachable store
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(KanbanError::StorageError("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load_columns(&self) -> Result<Vec<Column>> {
        Ok(self.inner.read().await.columns.values().cloned().collect())
    }

    async fn load_columns_order(&self) -> Result<OrderMap> {
        Ok(self.inner.read().await.columns_order.clone())
    }

    async fn load_cards(&self) -> Result<Vec<Card>> {
        Ok(self.inner.read().await.cards.values().cloned().collect())
    }

    async fn load_cards_order(&self) -> Result<OrderMap> {
        Ok(self.inner.read().await.cards_order.clone())
    }

    async fn save_card(&self, card: &Card) -> Result<()> {
        self.check_writable()?;
        self.inner
            .write()
            .await
            .cards
            .insert(card.id.clone(), card.clone());
        Ok(())
    }

    async fn delete_card(&self, id: &CardId) -> Result<()> {
        self.check_writable()?;
        if self.inner.write().await.cards.remove(id).is_none() {
            tracing::debug!(card = %id, "card already deleted");
        }
        Ok(())
    }

    async fn save_column(&self, column: &Column) -> Result<()> {
        self.check_writable()?;
        let mut inner = self.inner.write().await;
        inner.cards_order.add_head(column.id.clone());
        inner.columns.insert(column.id.clone(), column.clone());
        Ok(())
    }

    async fn patch_cards_order(&self, patch: &OrderPatch) -> Result<()> {
        self.check_writable()?;
        self.inner.write().await.cards_order.merge(patch);
        Ok(())
    }

    async fn patch_columns_order(&self, patch: &OrderPatch) -> Result<()> {
        self.check_writable()?;
        self.inner.write().await.columns_order.merge(patch);
        Ok(())
    }
}
