//! Insertion-ordered selection queue keyed by item identity
//!
//! Every user selection category (plaintexts, embeddings per slot,
//! alignments) is tracked by a [`SelectionQueue`]. Membership is decided by
//! [`Identifiable::id`] only; two items with the same id are the same
//! selection even if their other fields differ.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Debug;

/// Anything that can live in a selection queue
pub trait Identifiable {
    type Id: PartialEq + Debug;

    fn id(&self) -> &Self::Id;
}

/// Result of [`SelectionQueue::toggle`]
#[derive(Debug, Clone, PartialEq)]
pub enum Toggle<T> {
    /// No item with that id was present, the new one was appended
    Added,
    /// The first item with that id was removed
    Removed(T),
}

/// Result of [`SelectionQueue::bounded_push`]
#[derive(Debug, Clone, PartialEq)]
pub enum BoundedPush<T> {
    /// Appended without eviction
    Inserted,
    /// Oldest item evicted, then the new one appended
    Evicted(T),
    /// An item with that id is already queued; nothing changed
    AlreadyPresent,
}

impl<T> BoundedPush<T> {
    pub fn changed(&self) -> bool {
        !matches!(self, BoundedPush::AlreadyPresent)
    }
}

/// Ordered container of selected items
///
/// `push` does not deduplicate. Uniqueness of ids only holds when callers go
/// through [`toggle`](Self::toggle) and [`bounded_push`](Self::bounded_push).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for SelectionQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T> SelectionQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unconditionally; returns the new length
    pub fn push(&mut self, item: T) -> usize {
        self.items.push_back(item);
        self.items.len()
    }

    /// Remove and return the oldest item, `None` when empty
    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Transform every item in order without touching the queue
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Vec<U> {
        self.items.iter().map(f).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Shrink to `len` items, dropping from the back.
    /// Growing is not supported; a `len` at or above the current length does nothing.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Identifiable> SelectionQueue<T> {
    /// Index of the first item whose id equals `id`
    pub fn position_of(&self, id: &T::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn contains_id(&self, id: &T::Id) -> bool {
        self.position_of(id).is_some()
    }

    /// Remove the first item sharing `item`'s id, or append `item` if none does
    pub fn toggle(&mut self, item: T) -> Toggle<T> {
        let index = self.position_of(item.id());
        match index.and_then(|index| self.items.remove(index)) {
            Some(removed) => Toggle::Removed(removed),
            None => {
                self.items.push_back(item);
                Toggle::Added
            }
        }
    }

    /// Append `item` unless its id is already queued.
    ///
    /// When the queue already holds `threshold` or more items the oldest one is
    /// evicted first, so a queue fed only through this method never exceeds
    /// `max(threshold, 1)` items. An already-present id is neither moved nor
    /// replaced.
    pub fn bounded_push(&mut self, item: T, threshold: usize) -> BoundedPush<T> {
        if self.contains_id(item.id()) {
            return BoundedPush::AlreadyPresent;
        }

        let evicted = if self.items.len() >= threshold {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);

        match evicted {
            Some(oldest) => BoundedPush::Evicted(oldest),
            None => BoundedPush::Inserted,
        }
    }
}

impl<T> From<Vec<T>> for SelectionQueue<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }
}

impl<T> FromIterator<T> for SelectionQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a SelectionQueue<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
