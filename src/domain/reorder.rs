//! Order reconciliation engine.
//!
//! Pure functions over [`OrderMap`]: computing the minimal patch that moves,
//! inserts or removes an item, merging a patch, and walking a list into a
//! concrete sequence for display.

use crate::domain::id::Identifier;
use crate::domain::order::{OrderMap, OrderPatch};
use crate::error::{KanbanError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where a moved or inserted item should land
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MoveTarget {
    /// Immediately before this item
    Before(Identifier),
    /// First position of this list
    Head(Identifier),
    /// Last position of this list
    Append(Identifier),
}

impl MoveTarget {
    /// Interprets a bare drop identifier: a head means "first in that list",
    /// anything else means "right before that item".
    pub fn resolve(order: &OrderMap, to: &Identifier) -> Self {
        if order.is_head(to) {
            Self::Head(to.clone())
        } else {
            Self::Before(to.clone())
        }
    }

    pub fn id(&self) -> &Identifier {
        match self {
            Self::Before(id) | Self::Head(id) | Self::Append(id) => id,
        }
    }
}

/// Walks the list starting at `head` and returns its items in order.
///
/// Items rejected by `is_known` are skipped but still followed, so a
/// dangling entry never truncates the list. Revisiting an item means the
/// order is corrupted and fails with [`KanbanError::InvariantViolation`].
pub fn materialize(
    order: &OrderMap,
    head: &Identifier,
    is_known: impl Fn(&Identifier) -> bool,
) -> Result<Vec<Identifier>> {
    let mut visited = HashSet::new();
    let mut sequence = Vec::new();
    let mut current = order.successor(head);

    while let Some(id) = current {
        if !visited.insert(id) {
            return Err(KanbanError::InvariantViolation(format!(
                "cycle through {} while walking {}",
                id, head
            )));
        }
        if is_known(id) {
            sequence.push(id.clone());
        } else {
            tracing::warn!(list = %head, item = %id, "skipping dangling order entry");
        }
        current = order.successor(id);
    }

    Ok(sequence)
}

/// Merges `patch` into a copy of `order`.
///
/// Debug builds re-check every invariant on the result.
pub fn apply_patch(order: &OrderMap, patch: &OrderPatch) -> Result<OrderMap> {
    let mut next = order.clone();
    next.merge(patch);
    if cfg!(debug_assertions) {
        next.validate()?;
    }
    Ok(next)
}

/// Patch moving `from` right before `to`, or to the head of `to` when it is a list head.
///
/// Moving an item onto itself, or to the slot it already occupies, yields
/// an empty patch.
pub fn compute_move_patch(order: &OrderMap, from: &Identifier, to: &Identifier) -> Result<OrderPatch> {
    if from == to {
        return Ok(OrderPatch::new());
    }
    plan_move(order, from, &MoveTarget::resolve(order, to))
}

/// Patch moving `from` to the end of the list headed by `head`
pub fn compute_append_patch(order: &OrderMap, from: &Identifier, head: &Identifier) -> Result<OrderPatch> {
    plan_move(order, from, &MoveTarget::Append(head.clone()))
}

/// Patch relocating an existing item to `target`. Contains at most three entries.
pub fn plan_move(order: &OrderMap, from: &Identifier, target: &MoveTarget) -> Result<OrderPatch> {
    if order.is_head(from) {
        return Err(KanbanError::InvalidMove(format!("{} is a list head", from)));
    }
    if target.id() == from {
        return Ok(OrderPatch::new());
    }

    let from_pred = locate_predecessor(order, from)?;
    let from_next = order.successor(from);
    let (after, before) = insertion_point(order, target)?;

    // Already in place.
    if &after == from || before.as_ref() == Some(from) {
        return Ok(OrderPatch::new());
    }

    let mut patch = OrderPatch::new();
    patch.assign(order, &from_pred, from_next);
    patch.assign(order, &after, Some(from));
    patch.assign(order, from, before.as_ref());

    debug_assert!(patch.len() <= 3);
    tracing::debug!(item = %from, ?target, entries = patch.len(), "computed move patch");
    Ok(patch)
}

/// Patch placing an item that is not yet ordered at `target`
pub fn compute_insert_patch(order: &OrderMap, id: &Identifier, target: &MoveTarget) -> Result<OrderPatch> {
    if order.contains(id) {
        return Err(KanbanError::DuplicateIdentifier(id.to_string()));
    }

    let (after, before) = insertion_point(order, target)?;
    let mut patch = OrderPatch::new();
    patch.assign(order, &after, Some(id));
    patch.assign(order, id, before.as_ref());

    tracing::debug!(item = %id, ?target, entries = patch.len(), "computed insert patch");
    Ok(patch)
}

/// Patch unlinking `id`: its predecessor is repointed to its successor and its key is dropped
pub fn compute_remove_patch(order: &OrderMap, id: &Identifier) -> Result<OrderPatch> {
    if order.is_head(id) {
        return Err(KanbanError::InvalidMove(format!("{} is a list head", id)));
    }

    let pred = locate_predecessor(order, id)?;
    let mut patch = OrderPatch::new();
    patch.assign(order, &pred, order.successor(id));
    patch.assign(order, id, None);

    tracing::debug!(item = %id, entries = patch.len(), "computed remove patch");
    Ok(patch)
}

/// Returns the head of the list holding `id`
pub fn owning_head(order: &OrderMap, id: &Identifier) -> Result<Identifier> {
    let mut current = id.clone();
    let mut steps = 0;
    while !order.is_head(&current) {
        current = locate_predecessor(order, &current)?;
        steps += 1;
        if steps > order.len() {
            return Err(KanbanError::InvariantViolation(format!(
                "cycle while searching the list of {}",
                id
            )));
        }
    }
    Ok(current)
}

/// Returns the last item of the list headed by `head`, or `head` itself when the list is empty
pub fn tail_of(order: &OrderMap, head: &Identifier) -> Result<Identifier> {
    let mut visited = HashSet::new();
    let mut last = head;
    while let Some(id) = order.successor(last) {
        if !visited.insert(id) {
            return Err(KanbanError::InvariantViolation(format!(
                "cycle through {} while walking {}",
                id, head
            )));
        }
        last = id;
    }
    Ok(last.clone())
}

/// Scans for the single key pointing at `id`.
///
/// Heads have no predecessor; an item that has an entry of its own but
/// nothing pointing at it is an orphan.
fn locate_predecessor(order: &OrderMap, id: &Identifier) -> Result<Identifier> {
    match order.predecessors_of(id).as_slice() {
        [pred] => Ok((*pred).clone()),
        [] if order.has_entry(id) => Err(KanbanError::InvariantViolation(format!(
            "{} has no predecessor",
            id
        ))),
        [] => Err(KanbanError::UnknownIdentifier(id.to_string())),
        _ => Err(KanbanError::InvariantViolation(format!(
            "{} has more than one predecessor",
            id
        ))),
    }
}

/// Resolves a target to the pair of items the new position sits between
fn insertion_point(order: &OrderMap, target: &MoveTarget) -> Result<(Identifier, Option<Identifier>)> {
    match target {
        MoveTarget::Before(to) if order.is_head(to) => {
            Ok((to.clone(), order.successor(to).cloned()))
        }
        MoveTarget::Before(to) => Ok((locate_predecessor(order, to)?, Some(to.clone()))),
        MoveTarget::Head(head) => {
            require_head(order, head)?;
            Ok((head.clone(), order.successor(head).cloned()))
        }
        MoveTarget::Append(head) => {
            require_head(order, head)?;
            Ok((tail_of(order, head)?, None))
        }
    }
}

fn require_head(order: &OrderMap, head: &Identifier) -> Result<()> {
    if order.is_head(head) {
        Ok(())
    } else {
        Err(KanbanError::UnknownIdentifier(head.to_string()))
    }
}
