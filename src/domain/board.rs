use crate::domain::card::Card;
use crate::domain::column::{Column, ColumnView};
use crate::domain::drag::{DragEvent, DragState, TimerCommand};
use crate::domain::filter::CardFilter;
use crate::domain::id::{CardId, ColumnId, Identifier};
use crate::domain::order::{OrderMap, OrderPatch};
use crate::domain::reorder::{self, MoveTarget};
use crate::error::{KanbanError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Everything the board session owns
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    pub columns: BTreeMap<ColumnId, Column>,
    pub cards: BTreeMap<CardId, Card>,
    /// Card lists, one head per column
    pub cards_order: OrderMap,
    /// Column list under the board root
    pub columns_order: OrderMap,
    pub filter: CardFilter,
    pub drag: DragState,
    /// Card awaiting delete confirmation
    pub deleting_card: Option<CardId>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            columns: BTreeMap::new(),
            cards: BTreeMap::new(),
            cards_order: OrderMap::default(),
            columns_order: OrderMap::new([Identifier::board_root()]),
            filter: CardFilter::default(),
            drag: DragState::default(),
            deleting_card: None,
        }
    }
}

/// State changes, dispatched by the session or the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replaces all columns; `order` lists them under the board root
    SetColumns { columns: Vec<Column>, order: OrderMap },
    /// Replaces all cards and the card order
    SetCards { cards: Vec<Card>, order: OrderMap },
    SetFilter { value: String },
    Drag(DragEvent),
    /// Moves a card without a gesture
    MoveCard { card: CardId, target: MoveTarget },
    /// Edits the add-card form of a column
    SetDraftText { column: ColumnId, value: String },
    /// Submits the add-card form; `card` is the identifier for the new card
    ConfirmInput { column: ColumnId, card: CardId },
    SetCardDraft { card: CardId, value: String },
    CommitCardDraft { card: CardId },
    SetDeletingCard { card: CardId },
    CancelDelete,
    ConfirmDelete,
    AddColumn { column: ColumnId, title: String },
    MoveColumn { column: ColumnId, target: MoveTarget },
}

/// Work handed to the persistence collaborator. Nothing waits on it.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistRequest {
    PatchCardsOrder(OrderPatch),
    PatchColumnsOrder(OrderPatch),
    CreateCard(Card),
    UpdateCard(Card),
    DeleteCard(CardId),
    CreateColumn(Column),
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Timer(TimerCommand),
    Persist(PersistRequest),
}

/// Computes the state following `action`.
///
/// The current state is only read. On error no new state exists, so the
/// caller simply keeps the one it has. That includes the drag: a drop whose
/// move is rejected leaves the caller's drag hovering, and the caller ends
/// it with [`DragEvent::EndDrag`] ([`crate::BoardSession::drop_card`] does
/// this).
pub fn reduce(state: &BoardState, action: Action) -> Result<(BoardState, Vec<Effect>)> {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match action {
        Action::SetColumns { columns, order } => {
            let mut order = order;
            order.add_head(Identifier::board_root());
            order.validate()?;
            check_column_order(&columns, &order)?;

            let heads: Vec<ColumnId> = columns.iter().map(|c| c.id.clone()).collect();
            next.cards_order = retain_lists(&state.cards_order, &heads)?;
            let kept = next.cards_order.entries().map(|(_, card)| card).collect::<BTreeSet<_>>();
            next.cards.retain(|id, _| kept.contains(id));
            if next.cards.len() < state.cards.len() {
                tracing::debug!(
                    dropped = state.cards.len() - next.cards.len(),
                    "cards of removed columns dropped"
                );
            }
            if next
                .deleting_card
                .as_ref()
                .is_some_and(|card| !next.cards.contains_key(card))
            {
                next.deleting_card = None;
            }

            next.columns = columns.into_iter().map(|c| (c.id.clone(), c)).collect();
            next.columns_order = order;
        }
        Action::SetCards { cards, order } => {
            let mut order = order;
            for column in next.columns.keys() {
                order.add_head(column.clone());
            }
            order.validate()?;

            let mut reachable = BTreeSet::new();
            for column in next.columns.keys() {
                reachable.extend(reorder::materialize(&order, column, |_| true)?);
            }
            if let Some(card) = cards.iter().find(|c| !reachable.contains(&c.id)) {
                return Err(KanbanError::InvariantViolation(format!(
                    "card {} is not in any column",
                    card.id
                )));
            }

            next.cards = cards.into_iter().map(|c| (c.id.clone(), c)).collect();
            next.cards_order = order;
        }
        Action::SetFilter { value } => {
            next.filter = CardFilter::new(value);
        }
        Action::Drag(event) => {
            let transition = state.drag.transition(event);
            next.drag = transition.state;
            if let Some(timer) = transition.timer {
                effects.push(Effect::Timer(timer));
            }
            if let Some(request) = transition.request {
                move_card(&mut next, &mut effects, &request.card, &request.target)?;
            }
        }
        Action::MoveCard { card, target } => {
            move_card(&mut next, &mut effects, &card, &target)?;
        }
        Action::SetDraftText { column, value } => {
            let column = next
                .columns
                .get_mut(&column)
                .ok_or_else(|| KanbanError::ColumnNotFound(column.to_string()))?;
            column.text = value;
        }
        Action::ConfirmInput { column, card } => {
            let draft = next
                .columns
                .get(&column)
                .ok_or_else(|| KanbanError::ColumnNotFound(column.to_string()))?;
            if draft.has_draft() {
                let card = Card::new(card, draft.text.clone());
                let patch = reorder::compute_insert_patch(
                    &next.cards_order,
                    &card.id,
                    &MoveTarget::Head(column.clone()),
                )?;
                next.cards_order = reorder::apply_patch(&next.cards_order, &patch)?;
                next.cards.insert(card.id.clone(), card.clone());
                if let Some(column) = next.columns.get_mut(&column) {
                    column.text.clear();
                }
                effects.push(Effect::Persist(PersistRequest::CreateCard(card)));
                effects.push(Effect::Persist(PersistRequest::PatchCardsOrder(patch)));
            }
        }
        Action::SetCardDraft { card, value } => {
            card_mut(&mut next, &card)?.set_draft(value);
        }
        Action::CommitCardDraft { card } => {
            let card = card_mut(&mut next, &card)?;
            if let Some(draft) = card.draft_text.take() {
                card.set_text(draft);
                effects.push(Effect::Persist(PersistRequest::UpdateCard(card.clone())));
            }
        }
        Action::SetDeletingCard { card } => {
            if !next.cards.contains_key(&card) {
                return Err(KanbanError::CardNotFound(card.to_string()));
            }
            next.deleting_card = Some(card);
        }
        Action::CancelDelete => {
            next.deleting_card = None;
        }
        Action::ConfirmDelete => {
            if let Some(card) = next.deleting_card.take() {
                let patch = reorder::compute_remove_patch(&next.cards_order, &card)?;
                next.cards_order = reorder::apply_patch(&next.cards_order, &patch)?;
                next.cards.remove(&card);
                effects.push(Effect::Persist(PersistRequest::DeleteCard(card)));
                effects.push(Effect::Persist(PersistRequest::PatchCardsOrder(patch)));
            }
        }
        Action::AddColumn { column, title } => {
            let patch = reorder::compute_insert_patch(
                &next.columns_order,
                &column,
                &MoveTarget::Append(Identifier::board_root()),
            )?;
            next.columns_order = reorder::apply_patch(&next.columns_order, &patch)?;
            next.cards_order.add_head(column.clone());
            let column = Column::new(column, title);
            next.columns.insert(column.id.clone(), column.clone());
            effects.push(Effect::Persist(PersistRequest::CreateColumn(column)));
            effects.push(Effect::Persist(PersistRequest::PatchColumnsOrder(patch)));
        }
        Action::MoveColumn { column, target } => {
            let patch = reorder::plan_move(&next.columns_order, &column, &target)?;
            if !patch.is_empty() {
                next.columns_order = reorder::apply_patch(&next.columns_order, &patch)?;
                effects.push(Effect::Persist(PersistRequest::PatchColumnsOrder(patch)));
            }
        }
    }

    Ok((next, effects))
}

/// Fails unless `order` lists exactly the given columns under the board root
fn check_column_order(columns: &[Column], order: &OrderMap) -> Result<()> {
    let provided = columns.iter().map(|c| &c.id).collect::<BTreeSet<_>>();
    if provided.len() < columns.len() {
        let duplicate = columns
            .iter()
            .enumerate()
            .find(|(i, c)| columns[..*i].iter().any(|other| other.id == c.id))
            .map(|(_, c)| c.id.to_string())
            .unwrap_or_default();
        return Err(KanbanError::DuplicateIdentifier(duplicate));
    }

    let listed = reorder::materialize(order, &Identifier::board_root(), |_| true)?;
    let matches = listed.len() == order.len()
        && listed.len() == provided.len()
        && listed.iter().all(|id| provided.contains(id));
    if !matches {
        return Err(KanbanError::InvariantViolation(format!(
            "column order {:?} does not match columns {:?}",
            listed, provided
        )));
    }
    Ok(())
}

/// Keeps only the card lists headed by `heads`; new heads start empty
fn retain_lists(order: &OrderMap, heads: &[ColumnId]) -> Result<OrderMap> {
    let lists = heads
        .iter()
        .map(|head| -> Result<(ColumnId, Vec<CardId>)> {
            Ok((head.clone(), reorder::materialize(order, head, |_| true)?))
        })
        .collect::<Result<Vec<_>>>()?;
    OrderMap::from_lists(lists.iter().map(|(head, items)| (head.clone(), items.as_slice())))
}

/// Applies a card move locally and queues the same patch for persistence
fn move_card(
    state: &mut BoardState,
    effects: &mut Vec<Effect>,
    card: &CardId,
    target: &MoveTarget,
) -> Result<()> {
    let patch = reorder::plan_move(&state.cards_order, card, target)?;
    if patch.is_empty() {
        return Ok(());
    }
    state.cards_order = reorder::apply_patch(&state.cards_order, &patch)?;
    effects.push(Effect::Persist(PersistRequest::PatchCardsOrder(patch)));
    Ok(())
}

fn card_mut<'a>(state: &'a mut BoardState, card: &CardId) -> Result<&'a mut Card> {
    state
        .cards
        .get_mut(card)
        .ok_or_else(|| KanbanError::CardNotFound(card.to_string()))
}

impl BoardState {
    /// Column IDs in display order
    pub fn column_ids(&self) -> Result<Vec<ColumnId>> {
        reorder::materialize(&self.columns_order, &Identifier::board_root(), |id| {
            self.columns.contains_key(id)
        })
    }

    /// Card IDs of a column in display order, ignoring the filter
    pub fn card_ids(&self, column: &ColumnId) -> Result<Vec<CardId>> {
        if !self.columns.contains_key(column) {
            return Err(KanbanError::ColumnNotFound(column.to_string()));
        }
        reorder::materialize(&self.cards_order, column, |id| self.cards.contains_key(id))
    }

    /// Ordered, filtered view of a column
    pub fn column_view(&self, column: &ColumnId) -> Result<ColumnView> {
        let all = self.card_ids(column)?;
        let total_count = all.len();
        let keywords = self.filter.keywords();
        let cards = all
            .into_iter()
            .filter(|id| {
                self.cards
                    .get(id)
                    .map(|card| card.matches_keywords(&keywords))
                    .unwrap_or(false)
            })
            .collect();

        let title = self
            .columns
            .get(column)
            .map(|c| c.title.clone())
            .unwrap_or_default();

        Ok(ColumnView {
            id: column.clone(),
            title,
            cards,
            total_count,
            filtered: self.filter.is_active(),
        })
    }

    /// Views of every column in display order
    pub fn column_views(&self) -> Result<Vec<ColumnView>> {
        self.column_ids()?
            .iter()
            .map(|id| self.column_view(id))
            .collect()
    }

    /// Column currently holding `card`
    pub fn column_of(&self, card: &CardId) -> Result<ColumnId> {
        if !self.cards.contains_key(card) {
            return Err(KanbanError::CardNotFound(card.to_string()));
        }
        reorder::owning_head(&self.cards_order, card)
    }

    /// Whether the drop indicator is shown for the current hover
    pub fn drop_indicator_visible(&self) -> bool {
        self.drag.indicator_visible(&self.cards_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::drag::DragPhase;

    fn id(s: &str) -> Identifier {
        Identifier::from(s)
    }

    fn ids(items: &[&str]) -> Vec<Identifier> {
        items.iter().map(|s| id(s)).collect()
    }

    fn dispatch(state: &BoardState, action: Action) -> (BoardState, Vec<Effect>) {
        reduce(state, action).unwrap()
    }

    /// TODO / Doing / Waiting / Done with cards a-f
    fn loaded() -> BoardState {
        let columns = vec![
            Column::new(id("A"), "TODO"),
            Column::new(id("B"), "Doing"),
            Column::new(id("C"), "Waiting"),
            Column::new(id("D"), "Done"),
        ];
        let column_ids = ids(&["A", "B", "C", "D"]);
        let columns_order =
            OrderMap::from_lists(vec![(Identifier::board_root(), column_ids.as_slice())]).unwrap();
        let (state, _) = dispatch(
            &BoardState::default(),
            Action::SetColumns {
                columns,
                order: columns_order,
            },
        );

        let cards = vec![
            Card::new(id("a"), "Eat breakfast"),
            Card::new(id("b"), "Check SNS"),
            Card::new(id("c"), "Go to bed"),
            Card::new(id("d"), "Wash face"),
            Card::new(id("e"), "Brush teeth"),
            Card::new(id("f"), "Get out of bed"),
        ];
        let (a, b, d) = (ids(&["a", "b", "c"]), ids(&["d", "e"]), ids(&["f"]));
        let order = OrderMap::from_lists(vec![
            (id("A"), a.as_slice()),
            (id("B"), b.as_slice()),
            (id("D"), d.as_slice()),
        ])
        .unwrap();
        dispatch(&state, Action::SetCards { cards, order }).0
    }

    fn persisted_patches(effects: &[Effect]) -> Vec<&OrderPatch> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Persist(PersistRequest::PatchCardsOrder(patch)) => Some(patch),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_load_orders_columns_and_cards() {
        let state = loaded();
        assert_eq!(state.column_ids().unwrap(), ids(&["A", "B", "C", "D"]));
        assert_eq!(state.card_ids(&id("A")).unwrap(), ids(&["a", "b", "c"]));
        assert!(state.card_ids(&id("C")).unwrap().is_empty());
        assert!(state.cards_order.is_head(&id("C")));
    }

    #[test]
    fn test_set_cards_rejects_corrupt_order() {
        let state = loaded();
        let mut bad = OrderMap::new([id("A")]);
        bad.merge(&vec![(id("A"), Some(id("a"))), (id("a"), Some(id("a")))].into_iter().collect());

        let err = reduce(&state, Action::SetCards { cards: vec![], order: bad }).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_set_cards_rejects_unordered_card() {
        let state = loaded();
        let items = ids(&["a"]);
        let order = OrderMap::from_lists(vec![(id("A"), items.as_slice())]).unwrap();

        let err = reduce(
            &state,
            Action::SetCards {
                cards: vec![Card::new(id("a"), "Listed"), Card::new(id("orphan"), "Lost")],
                order,
            },
        )
        .unwrap_err();

        assert!(err.is_invariant_violation());
        assert_eq!(state.cards.len(), 6);
    }

    #[test]
    fn test_set_cards_rejects_card_under_unknown_head() {
        let state = loaded();
        let items = ids(&["a"]);
        let order = OrderMap::from_lists(vec![(id("Z"), items.as_slice())]).unwrap();

        let err = reduce(
            &state,
            Action::SetCards {
                cards: vec![Card::new(id("a"), "Misplaced")],
                order,
            },
        )
        .unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_set_columns_rejects_mismatched_order() {
        let state = BoardState::default();
        let listed = ids(&["A"]);
        let order =
            OrderMap::from_lists(vec![(Identifier::board_root(), listed.as_slice())]).unwrap();

        let err = reduce(
            &state,
            Action::SetColumns {
                columns: vec![Column::new(id("A"), "TODO"), Column::new(id("B"), "Doing")],
                order: order.clone(),
            },
        )
        .unwrap_err();
        assert!(err.is_invariant_violation());

        let err = reduce(
            &state,
            Action::SetColumns {
                columns: vec![Column::new(id("A"), "TODO"), Column::new(id("A"), "Again")],
                order,
            },
        )
        .unwrap_err();
        assert!(matches!(err, KanbanError::DuplicateIdentifier(_)));
    }

    #[test]
    fn test_set_columns_drops_lists_of_removed_columns() {
        let state = loaded();
        let (state, _) = dispatch(&state, Action::SetDeletingCard { card: id("d") });
        let kept = ids(&["A", "C", "D", "E"]);
        let order =
            OrderMap::from_lists(vec![(Identifier::board_root(), kept.as_slice())]).unwrap();

        let (state, _) = dispatch(
            &state,
            Action::SetColumns {
                columns: vec![
                    Column::new(id("A"), "TODO"),
                    Column::new(id("C"), "Waiting"),
                    Column::new(id("D"), "Done"),
                    Column::new(id("E"), "Archive"),
                ],
                order,
            },
        );

        assert_eq!(state.column_ids().unwrap(), kept);
        assert!(!state.cards_order.is_head(&id("B")));
        assert!(state.cards_order.is_head(&id("E")));
        assert!(!state.cards_order.contains(&id("d")));
        assert!(!state.cards.contains_key(&id("e")));
        assert!(state.deleting_card.is_none());
        assert_eq!(state.card_ids(&id("A")).unwrap(), ids(&["a", "b", "c"]));
        assert_eq!(state.card_ids(&id("D")).unwrap(), ids(&["f"]));
        state.cards_order.validate().unwrap();
    }

    #[test]
    fn test_rejected_drop_leaves_drag_for_caller_to_end() {
        let state = loaded();
        let (state, _) = dispatch(&state, Action::Drag(DragEvent::StartDrag { card: id("a") }));
        let (state, _) = dispatch(
            &state,
            Action::Drag(DragEvent::EnterTarget {
                target: MoveTarget::Before(id("ghost")),
            }),
        );

        assert!(reduce(&state, Action::Drag(DragEvent::Drop)).is_err());
        assert!(matches!(state.drag.phase(), DragPhase::Hovering { .. }));

        let (state, effects) = dispatch(&state, Action::Drag(DragEvent::EndDrag));
        assert!(state.drag.is_idle());
        assert_eq!(effects, vec![Effect::Timer(TimerCommand::Cancel)]);
        assert_eq!(state.card_ids(&id("A")).unwrap(), ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_drag_and_drop_moves_card_and_persists_patch() {
        let state = loaded();
        let (state, _) = dispatch(&state, Action::Drag(DragEvent::StartDrag { card: id("c") }));
        let (state, effects) = dispatch(
            &state,
            Action::Drag(DragEvent::EnterTarget {
                target: MoveTarget::Before(id("a")),
            }),
        );
        assert_eq!(effects, vec![Effect::Timer(TimerCommand::Arm { pulse: 1 })]);
        assert!(state.drop_indicator_visible());

        let (state, effects) = dispatch(&state, Action::Drag(DragEvent::Drop));

        assert!(state.drag.is_idle());
        assert_eq!(state.card_ids(&id("A")).unwrap(), ids(&["c", "a", "b"]));
        assert_eq!(effects[0], Effect::Timer(TimerCommand::Cancel));
        let patches = persisted_patches(&effects);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].len(), 3);
    }

    #[test]
    fn test_drop_after_hover_decay_still_moves() {
        let state = loaded();
        let (state, _) = dispatch(&state, Action::Drag(DragEvent::StartDrag { card: id("a") }));
        let (state, _) = dispatch(
            &state,
            Action::Drag(DragEvent::EnterTarget {
                target: MoveTarget::Before(id("e")),
            }),
        );
        let pulse = state.drag.pulse();
        let (state, _) = dispatch(&state, Action::Drag(DragEvent::HoverExpired { pulse }));

        assert!(!state.drop_indicator_visible());
        assert!(matches!(state.drag.phase(), DragPhase::Hovering { alive: false, .. }));

        let (state, _) = dispatch(&state, Action::Drag(DragEvent::Drop));
        assert_eq!(state.card_ids(&id("B")).unwrap(), ids(&["d", "a", "e"]));
        assert_eq!(state.column_of(&id("a")).unwrap(), id("B"));
    }

    #[test]
    fn test_drop_without_target_changes_nothing() {
        let state = loaded();
        let (dragging, _) = dispatch(&state, Action::Drag(DragEvent::StartDrag { card: id("a") }));
        let (after, effects) = dispatch(&dragging, Action::Drag(DragEvent::Drop));

        assert!(effects.is_empty());
        assert_eq!(after.cards_order, state.cards_order);
        assert!(after.drag.is_idle());
    }

    #[test]
    fn test_noop_drop_persists_nothing() {
        let state = loaded();
        let (state, _) = dispatch(&state, Action::Drag(DragEvent::StartDrag { card: id("a") }));
        let (state, _) = dispatch(
            &state,
            Action::Drag(DragEvent::EnterTarget {
                target: MoveTarget::Before(id("b")),
            }),
        );
        assert!(!state.drop_indicator_visible());

        let (_, effects) = dispatch(&state, Action::Drag(DragEvent::Drop));
        assert!(persisted_patches(&effects).is_empty());
    }

    #[test]
    fn test_failed_move_leaves_state_untouched() {
        let state = loaded();
        let err = reduce(
            &state,
            Action::MoveCard {
                card: id("zz"),
                target: MoveTarget::Head(id("A")),
            },
        )
        .unwrap_err();

        assert!(matches!(err, KanbanError::UnknownIdentifier(_)));
        assert_eq!(state.card_ids(&id("A")).unwrap(), ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_move_card_to_end_of_other_column() {
        let state = loaded();
        let (state, effects) = dispatch(
            &state,
            Action::MoveCard {
                card: id("a"),
                target: MoveTarget::Append(id("C")),
            },
        );

        assert_eq!(state.card_ids(&id("C")).unwrap(), ids(&["a"]));
        assert_eq!(state.card_ids(&id("A")).unwrap(), ids(&["b", "c"]));
        assert_eq!(persisted_patches(&effects).len(), 1);
    }

    #[test]
    fn test_confirm_input_adds_card_at_head() {
        let state = loaded();
        let (state, _) = dispatch(
            &state,
            Action::SetDraftText {
                column: id("A"),
                value: "Make coffee".to_string(),
            },
        );
        let (state, effects) = dispatch(
            &state,
            Action::ConfirmInput {
                column: id("A"),
                card: id("n"),
            },
        );

        assert_eq!(state.card_ids(&id("A")).unwrap(), ids(&["n", "a", "b", "c"]));
        assert_eq!(state.cards[&id("n")].text, "Make coffee");
        assert!(state.columns[&id("A")].text.is_empty());
        assert!(matches!(
            &effects[0],
            Effect::Persist(PersistRequest::CreateCard(card)) if card.id == id("n")
        ));
        assert_eq!(persisted_patches(&effects).len(), 1);
    }

    #[test]
    fn test_confirm_blank_input_is_noop() {
        let state = loaded();
        let (state, _) = dispatch(
            &state,
            Action::SetDraftText {
                column: id("C"),
                value: "   ".to_string(),
            },
        );
        let (after, effects) = dispatch(
            &state,
            Action::ConfirmInput {
                column: id("C"),
                card: id("n"),
            },
        );

        assert!(effects.is_empty());
        assert!(!after.cards.contains_key(&id("n")));
    }

    #[test]
    fn test_draft_for_unknown_column_fails() {
        let err = reduce(
            &loaded(),
            Action::SetDraftText {
                column: id("Z"),
                value: "x".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, KanbanError::ColumnNotFound(_)));
    }

    #[test]
    fn test_delete_flow() {
        let state = loaded();
        let (state, _) = dispatch(&state, Action::SetDeletingCard { card: id("b") });
        assert_eq!(state.deleting_card, Some(id("b")));

        let (cancelled, _) = dispatch(&state, Action::CancelDelete);
        assert!(cancelled.deleting_card.is_none());
        assert!(cancelled.cards.contains_key(&id("b")));

        let (state, effects) = dispatch(&state, Action::ConfirmDelete);
        assert!(state.deleting_card.is_none());
        assert!(!state.cards.contains_key(&id("b")));
        assert_eq!(state.card_ids(&id("A")).unwrap(), ids(&["a", "c"]));
        assert!(effects.contains(&Effect::Persist(PersistRequest::DeleteCard(id("b")))));
    }

    #[test]
    fn test_confirm_delete_without_pending_card_is_noop() {
        let (_, effects) = dispatch(&loaded(), Action::ConfirmDelete);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_filter_view() {
        let state = loaded();
        let (state, _) = dispatch(
            &state,
            Action::SetFilter {
                value: " BED ".to_string(),
            },
        );

        let view = state.column_view(&id("A")).unwrap();
        assert!(view.filtered);
        assert_eq!(view.cards, ids(&["c"]));
        assert_eq!(view.total_count, 3);
        assert_eq!(view.title, "TODO");

        let views = state.column_views().unwrap();
        assert_eq!(views.len(), 4);
        assert_eq!(views[3].cards, ids(&["f"]));
    }

    #[test]
    fn test_commit_card_draft() {
        let state = loaded();
        let (state, _) = dispatch(
            &state,
            Action::SetCardDraft {
                card: id("a"),
                value: "Eat lunch".to_string(),
            },
        );
        let (state, effects) = dispatch(&state, Action::CommitCardDraft { card: id("a") });

        assert_eq!(state.cards[&id("a")].text, "Eat lunch");
        assert_eq!(effects.len(), 1);

        let (_, effects) = dispatch(&state, Action::CommitCardDraft { card: id("a") });
        assert!(effects.is_empty());
    }

    #[test]
    fn test_add_and_move_column() {
        let state = loaded();
        let (state, effects) = dispatch(
            &state,
            Action::AddColumn {
                column: id("E"),
                title: "Archive".to_string(),
            },
        );
        assert_eq!(state.column_ids().unwrap(), ids(&["A", "B", "C", "D", "E"]));
        assert!(state.cards_order.is_head(&id("E")));
        assert_eq!(effects.len(), 2);

        let (state, _) = dispatch(
            &state,
            Action::MoveColumn {
                column: id("E"),
                target: MoveTarget::Before(id("B")),
            },
        );
        assert_eq!(state.column_ids().unwrap(), ids(&["A", "E", "B", "C", "D"]));

        let (state, _) = dispatch(
            &state,
            Action::MoveColumn {
                column: id("D"),
                target: MoveTarget::Head(Identifier::board_root()),
            },
        );
        assert_eq!(state.column_ids().unwrap(), ids(&["D", "A", "E", "B", "C"]));
    }

    #[test]
    fn test_add_duplicate_column_rejected() {
        let err = reduce(
            &loaded(),
            Action::AddColumn {
                column: id("A"),
                title: "Again".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, KanbanError::DuplicateIdentifier(_)));
    }
}
