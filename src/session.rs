//! Board session: the single owner of board state.
//!
//! Each dispatched action goes through the pure reducer. The resulting
//! state replaces the old one immediately, and the persistence requests it
//! produced are spawned as one detached background task whose outcome is
//! only logged. The local state is never rolled back.

use crate::{
    config::BoardConfig,
    domain::{
        reduce, Action, BoardState, CardId, ColumnId, DragEvent, Effect, Identifier, MoveTarget,
        PersistRequest, TimerCommand,
    },
    error::Result,
    storage::Storage,
};
use std::{sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};

/// Cancellable single-shot decay timer.
///
/// At most one timer task is pending; arming a new one aborts the old.
/// Expiries are delivered as pulse numbers on a channel.
struct HoverTimer {
    timeout: Duration,
    handle: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<u64>,
}

impl HoverTimer {
    fn arm(&mut self, pulse: u64) {
        self.cancel();
        let tx = self.tx.clone();
        let timeout = self.timeout;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            // Receiver gone means the session was dropped.
            let _ = tx.send(pulse);
        }));
        tracing::debug!(pulse, ?timeout, "hover timer armed");
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for HoverTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub struct BoardSession<S: Storage + 'static> {
    state: BoardState,
    storage: Arc<S>,
    timer: HoverTimer,
    expired: mpsc::UnboundedReceiver<u64>,
    /// Handles of persistence tasks not yet seen finished. Dropping a
    /// handle detaches its task, so in-flight writes outlive the session.
    pending: Vec<JoinHandle<()>>,
}

impl<S: Storage + 'static> BoardSession<S> {
    /// Creates an empty session. Timers and persistence run on the current tokio runtime.
    pub fn new(storage: Arc<S>, config: &BoardConfig) -> Self {
        let (tx, expired) = mpsc::unbounded_channel();
        Self {
            state: BoardState::default(),
            storage,
            timer: HoverTimer {
                timeout: config.hover_timeout(),
                handle: None,
                tx,
            },
            expired,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Loads columns, cards and both orders from storage.
    ///
    /// When the store holds no columns yet, the configured default columns
    /// are created.
    pub async fn load(&mut self, config: &BoardConfig) -> Result<()> {
        let columns = self.storage.load_columns().await?;
        let columns_order = self.storage.load_columns_order().await?;
        let seed = columns.is_empty();

        self.dispatch(Action::SetColumns {
            columns,
            order: columns_order,
        })?;

        if seed {
            for column in &config.columns {
                self.dispatch(Action::AddColumn {
                    column: Identifier::from(column.id.as_str()),
                    title: column.title.clone(),
                })?;
            }
        }

        let (cards, cards_order) = tokio::try_join!(
            self.storage.load_cards(),
            self.storage.load_cards_order()
        )?;
        self.dispatch(Action::SetCards {
            cards,
            order: cards_order,
        })?;

        tracing::info!(
            board = %config.name,
            columns = self.state.columns.len(),
            cards = self.state.cards.len(),
            seeded = seed,
            "board loaded"
        );
        Ok(())
    }

    /// Runs one action through the reducer and carries out its effects.
    ///
    /// On error the state is left exactly as it was.
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        let (next, effects) = reduce(&self.state, action).map_err(|err| {
            tracing::debug!(error = %err, "action rejected");
            err
        })?;
        self.state = next;

        let mut requests = Vec::new();
        for effect in effects {
            match effect {
                Effect::Timer(TimerCommand::Arm { pulse }) => self.timer.arm(pulse),
                Effect::Timer(TimerCommand::Cancel) => self.timer.cancel(),
                Effect::Persist(request) => requests.push(request),
            }
        }
        if !requests.is_empty() {
            self.persist(requests);
        }
        Ok(())
    }

    fn persist(&mut self, requests: Vec<PersistRequest>) {
        self.pending.retain(|handle| !handle.is_finished());
        let storage = Arc::clone(&self.storage);
        self.pending.push(tokio::spawn(async move {
            for request in requests {
                if let Err(err) = send(storage.as_ref(), &request).await {
                    tracing::warn!(error = %err, ?request, "persistence request failed");
                }
            }
        }));
    }

    /// Waits for all spawned persistence tasks to finish
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "persistence task did not complete");
            }
        }
    }

    /// Delivers hover expiries that already fired. Returns how many were handled.
    pub fn pump_timers(&mut self) -> Result<usize> {
        let mut handled = 0;
        while let Ok(pulse) = self.expired.try_recv() {
            self.dispatch(Action::Drag(DragEvent::HoverExpired { pulse }))?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Waits for the next hover expiry and delivers it
    pub async fn wait_hover_expiry(&mut self) -> Result<()> {
        if let Some(pulse) = self.expired.recv().await {
            self.dispatch(Action::Drag(DragEvent::HoverExpired { pulse }))?;
        }
        Ok(())
    }

    pub fn start_drag(&mut self, card: CardId) -> Result<()> {
        self.dispatch(Action::Drag(DragEvent::StartDrag { card }))
    }

    pub fn enter_target(&mut self, target: MoveTarget) -> Result<()> {
        self.dispatch(Action::Drag(DragEvent::EnterTarget { target }))
    }

    /// Drop target given as a bare identifier: a column ID means its head
    pub fn enter_target_id(&mut self, target: &Identifier) -> Result<()> {
        let target = MoveTarget::resolve(&self.state.cards_order, target);
        self.enter_target(target)
    }

    pub fn over_target(&mut self) -> Result<()> {
        self.dispatch(Action::Drag(DragEvent::OverTarget))
    }

    /// Drops the dragged card. A rejected move still ends the drag.
    pub fn drop_card(&mut self) -> Result<()> {
        let result = self.dispatch(Action::Drag(DragEvent::Drop));
        if result.is_err() {
            self.end_drag()?;
        }
        result
    }

    pub fn end_drag(&mut self) -> Result<()> {
        self.dispatch(Action::Drag(DragEvent::EndDrag))
    }

    pub fn set_filter(&mut self, value: impl Into<String>) -> Result<()> {
        self.dispatch(Action::SetFilter {
            value: value.into(),
        })
    }

    /// Submits a column's add-card form. Returns the new card's ID, or
    /// `None` when the form was blank.
    pub fn add_card(&mut self, column: &ColumnId, text: impl Into<String>) -> Result<Option<CardId>> {
        self.dispatch(Action::SetDraftText {
            column: column.clone(),
            value: text.into(),
        })?;
        let card = Identifier::generate();
        self.dispatch(Action::ConfirmInput {
            column: column.clone(),
            card: card.clone(),
        })?;
        Ok(self.state.cards.contains_key(&card).then_some(card))
    }

    pub fn add_column(&mut self, title: impl Into<String>) -> Result<ColumnId> {
        let column = Identifier::generate();
        self.dispatch(Action::AddColumn {
            column: column.clone(),
            title: title.into(),
        })?;
        Ok(column)
    }
}

async fn send<S: Storage + ?Sized>(storage: &S, request: &PersistRequest) -> Result<()> {
    match request {
        PersistRequest::PatchCardsOrder(patch) => storage.patch_cards_order(patch).await,
        PersistRequest::PatchColumnsOrder(patch) => storage.patch_columns_order(patch).await,
        PersistRequest::CreateCard(card) | PersistRequest::UpdateCard(card) => {
            storage.save_card(card).await
        }
        PersistRequest::DeleteCard(id) => storage.delete_card(id).await,
        PersistRequest::CreateColumn(column) => storage.save_column(column).await,
    }
}
