//! Ordered, key-addressable storage shared by both collection types.
//!
//! A `KeyedStore` behaves like an ordered associative array: every item sits
//! in a slot identified by a `CollectionKey`, iteration follows slot order,
//! and appending assigns the next free integer key. Sorting reorders slots
//! but keeps each item paired with its key.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The key of a storage slot.
///
/// A key is a storage location, not a domain identifier. Strings made up of
/// a canonical decimal number (`"0"`, `"17"`, but not `"007"`) are folded to
/// `Index` so `"3"` and `3` address the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKey {
    Index(usize),
    Name(String),
}

impl From<usize> for CollectionKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for CollectionKey {
    fn from(s: &str) -> Self {
        let canonical = !s.is_empty()
            && s.bytes().all(|b| b.is_ascii_digit())
            && (s == "0" || !s.starts_with('0'));
        match s.parse::<usize>() {
            Ok(index) if canonical => Self::Index(index),
            _ => Self::Name(s.to_string()),
        }
    }
}

impl From<String> for CollectionKey {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{}", index),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Ordered `(key, item)` slots with associative-array key semantics.
#[derive(Debug, Clone)]
pub struct KeyedStore<T> {
    slots: Vec<(CollectionKey, T)>,
    /// The key the next `push` will use. Never decreases until `clear`.
    /// `None` once `usize::MAX` has been handed out.
    next_index: Option<usize>,
}

impl<T> Default for KeyedStore<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            next_index: Some(0),
        }
    }
}

impl<T> KeyedStore<T> {
    /// Create an empty store whose first pushed key is `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` under a fresh integer key and return that key.
    ///
    /// Once the integer key space is exhausted, the lowest unused index is
    /// taken instead, so an existing slot is never overwritten.
    pub fn push(&mut self, item: T) -> CollectionKey {
        let index = match self.next_index {
            Some(index) => {
                self.next_index = index.checked_add(1);
                index
            }
            None => self.lowest_free_index(),
        };
        let key = CollectionKey::Index(index);
        self.slots.push((key.clone(), item));
        key
    }

    fn lowest_free_index(&self) -> usize {
        let used: HashSet<usize> = self
            .slots
            .iter()
            .filter_map(|(key, _)| match key {
                CollectionKey::Index(index) => Some(*index),
                CollectionKey::Name(_) => None,
            })
            .collect();
        // Fewer than usize::MAX slots exist, so a gap is always found.
        (0..usize::MAX).find(|index| !used.contains(index)).unwrap_or(usize::MAX)
    }

    /// Store `item` at `key`, overwriting in place if the slot exists or
    /// appending a new slot otherwise.
    pub fn put(&mut self, key: CollectionKey, item: T) {
        match self.position(&key) {
            Some(pos) => self.slots[pos].1 = item,
            None => {
                if let (CollectionKey::Index(index), Some(next)) = (&key, self.next_index) {
                    if *index >= next {
                        self.next_index = index.checked_add(1);
                    }
                }
                self.slots.push((key, item));
            }
        }
    }

    /// The item stored at `key`, if any.
    pub fn get(&self, key: &CollectionKey) -> Option<&T> {
        self.slots.iter().find(|(k, _)| k == key).map(|(_, item)| item)
    }

    /// Slot position of `key` in iteration order.
    pub fn position(&self, key: &CollectionKey) -> Option<usize> {
        self.slots.iter().position(|(k, _)| k == key)
    }

    /// The first key whose item satisfies `pred`.
    pub fn find_key(&self, mut pred: impl FnMut(&T) -> bool) -> Option<CollectionKey> {
        self.slots
            .iter()
            .find(|(_, item)| pred(item))
            .map(|(key, _)| key.clone())
    }

    /// Remove the slot at `key` and return its item.
    pub fn remove_by_key(&mut self, key: &CollectionKey) -> Option<T> {
        let pos = self.position(key)?;
        Some(self.slots.remove(pos).1)
    }

    /// Return true if a slot with `key` exists.
    pub fn key_exists(&self, key: &CollectionKey) -> bool {
        self.position(key).is_some()
    }

    /// Drop every slot and restart integer keys at `0`.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.next_index = Some(0);
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Return true if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `(key, item)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&CollectionKey, &T)> {
        self.slots.iter().map(|(key, item)| (key, item))
    }

    /// Keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = &CollectionKey> {
        self.slots.iter().map(|(key, _)| key)
    }

    /// Items in slot order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().map(|(_, item)| item)
    }

    /// Stable sort of the slots by their items. Keys travel with their items.
    pub fn sort_by(&mut self, mut compare: impl FnMut(&T, &T) -> Ordering) {
        self.slots.sort_by(|a, b| compare(&a.1, &b.1));
    }
}
