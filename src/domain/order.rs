use crate::domain::id::Identifier;
use crate::error::{KanbanError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Successor-pointer encoding of a set of ordered lists.
///
/// Each head sentinel (a column for cards, the board root for columns)
/// maps to the first item of its list, and each item maps to the item
/// right after it. The last item of a list has no entry.
///
/// Invariants:
/// - A: walking from any head terminates, no cycles.
/// - B: every item has exactly one predecessor and is reachable from exactly one head.
/// - C: no key maps to itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMap {
    heads: BTreeSet<Identifier>,
    next: BTreeMap<Identifier, Identifier>,
}

impl OrderMap {
    /// Creates an order with the given (empty) lists
    pub fn new(heads: impl IntoIterator<Item = Identifier>) -> Self {
        Self {
            heads: heads.into_iter().collect(),
            next: BTreeMap::new(),
        }
    }

    /// Builds an order from raw successor entries and validates it
    pub fn from_entries(
        heads: impl IntoIterator<Item = Identifier>,
        entries: impl IntoIterator<Item = (Identifier, Identifier)>,
    ) -> Result<Self> {
        let order = Self {
            heads: heads.into_iter().collect(),
            next: entries.into_iter().collect(),
        };
        order.validate()?;
        Ok(order)
    }

    /// Builds an order from one item sequence per head
    pub fn from_lists<'a>(
        lists: impl IntoIterator<Item = (Identifier, &'a [Identifier])>,
    ) -> Result<Self> {
        let mut heads = Vec::new();
        let mut entries = Vec::new();
        for (head, items) in lists {
            let mut prev = head.clone();
            for item in items {
                entries.push((prev, item.clone()));
                prev = item.clone();
            }
            heads.push(head);
        }
        Self::from_entries(heads, entries)
    }

    /// Registers a new, empty list
    pub fn add_head(&mut self, head: Identifier) {
        self.heads.insert(head);
    }

    pub fn is_head(&self, id: &Identifier) -> bool {
        self.heads.contains(id)
    }

    pub fn heads(&self) -> impl Iterator<Item = &Identifier> {
        self.heads.iter()
    }

    /// Returns the successor of `id`, if any
    pub fn successor(&self, id: &Identifier) -> Option<&Identifier> {
        self.next.get(id)
    }

    pub fn has_entry(&self, id: &Identifier) -> bool {
        self.next.contains_key(id)
    }

    /// Checks whether `id` appears anywhere in the order, as a head, a key or a value
    pub fn contains(&self, id: &Identifier) -> bool {
        self.heads.contains(id) || self.next.contains_key(id) || self.next.values().any(|v| v == id)
    }

    /// Returns every key whose successor is `id`.
    ///
    /// Only forward pointers are stored, so this is a full scan.
    pub fn predecessors_of(&self, id: &Identifier) -> Vec<&Identifier> {
        self.next
            .iter()
            .filter(|(_, v)| *v == id)
            .map(|(k, _)| k)
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Identifier, &Identifier)> {
        self.next.iter()
    }

    /// Number of successor entries
    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    /// Merges a patch by key overwrite; `None` values delete the key
    pub(crate) fn merge(&mut self, patch: &OrderPatch) {
        for (key, value) in patch.iter() {
            match value {
                Some(value) => {
                    self.next.insert(key.clone(), value.clone());
                }
                None => {
                    self.next.remove(key);
                }
            }
        }
    }

    /// Checks invariants A, B and C
    pub fn validate(&self) -> Result<()> {
        let mut seen_values = HashSet::new();
        for (key, value) in &self.next {
            if key == value {
                return Err(KanbanError::InvariantViolation(format!(
                    "{} points to itself",
                    key
                )));
            }
            if self.heads.contains(value) {
                return Err(KanbanError::InvariantViolation(format!(
                    "head {} is the successor of {}",
                    value, key
                )));
            }
            if !seen_values.insert(value) {
                return Err(KanbanError::InvariantViolation(format!(
                    "{} has more than one predecessor",
                    value
                )));
            }
        }

        // With at most one predecessor per item, any revisit is a cycle.
        let mut visited = HashSet::new();
        for head in &self.heads {
            let mut current = self.next.get(head);
            while let Some(id) = current {
                if !visited.insert(id) {
                    return Err(KanbanError::InvariantViolation(format!(
                        "cycle through {}",
                        id
                    )));
                }
                current = self.next.get(id);
            }
        }

        let orphan = self
            .next
            .iter()
            .flat_map(|(k, v)| [k, v])
            .find(|id| !self.heads.contains(*id) && !visited.contains(*id));
        if let Some(id) = orphan {
            return Err(KanbanError::InvariantViolation(format!(
                "{} is not reachable from any head",
                id
            )));
        }

        Ok(())
    }
}

/// A partial update to an [`OrderMap`].
///
/// Holds only the keys whose successor changes. A `None` value is an
/// explicit deletion and must be applied as one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderPatch(BTreeMap<Identifier, Option<Identifier>>);

impl OrderPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key -> value` unless `order` already holds exactly that
    pub(crate) fn assign(&mut self, order: &OrderMap, key: &Identifier, value: Option<&Identifier>) {
        if order.successor(key) != value {
            self.0.insert(key.clone(), value.cloned());
        }
    }

    pub fn get(&self, key: &Identifier) -> Option<Option<&Identifier>> {
        self.0.get(key).map(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &Option<Identifier>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Identifier, Option<Identifier>)> for OrderPatch {
    fn from_iter<T: IntoIterator<Item = (Identifier, Option<Identifier>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
