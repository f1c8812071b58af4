use crate::entry::StoreEntry;
use crate::key::CacheKey;

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use log::debug;

/// A bounded key-to-entry table with TTL-based expiry and LRU eviction.
///
/// The wrapper owns two independent instances: the pending-call table, keyed
/// by the refresh TTL, and the result table, keyed by the max-age TTL. The
/// table is a plain container; the shared core serializes access to it.
pub(crate) struct Store<V> {
  entries: HashMap<CacheKey, StoreEntry<V>, ahash::RandomState>,
  // A queue of keys ordered by recent use (front is most recent).
  order: VecDeque<CacheKey>,
  ttl: Duration,
  capacity: Option<usize>,
}

impl<V> Store<V> {
  pub(crate) fn new(ttl: Duration, capacity: Option<usize>) -> Self {
    Self {
      entries: HashMap::with_hasher(ahash::RandomState::new()),
      order: VecDeque::new(),
      ttl,
      capacity,
    }
  }

  /// Looks up a live entry, updating recency on a hit.
  ///
  /// An entry whose age has reached the table's TTL reads as absent and is
  /// dropped on the spot, regardless of where it sits in the eviction order.
  pub(crate) fn get(&mut self, key: &CacheKey) -> Option<V>
  where
    V: Clone,
  {
    let hit = match self.entries.get(key) {
      None => return None,
      Some(entry) if entry.is_expired(self.ttl) => None,
      Some(entry) => Some(entry.value().clone()),
    };

    match hit {
      Some(value) => {
        self.touch(key);
        Some(value)
      }
      None => {
        self.purge(key);
        None
      }
    }
  }

  /// Whether a live entry exists for the key. Counts as a read for recency.
  pub(crate) fn contains(&mut self, key: &CacheKey) -> bool {
    let live = match self.entries.get(key) {
      None => return false,
      Some(entry) => !entry.is_expired(self.ttl),
    };

    if live {
      self.touch(key);
    } else {
      self.purge(key);
    }
    live
  }

  /// Inserts or replaces the entry for a key, making it the most recently
  /// used, then enforces the capacity bound by evicting from the tail.
  pub(crate) fn insert(&mut self, key: CacheKey, value: V) {
    if self.entries.insert(key, StoreEntry::new(value)).is_some() {
      self.touch(&key);
    } else {
      self.order.push_front(key);
    }

    if let Some(capacity) = self.capacity {
      while self.entries.len() > capacity {
        match self.order.pop_back() {
          Some(victim) => {
            self.entries.remove(&victim);
            debug!("evicted least-recently-used entry {:?}", victim);
          }
          None => break,
        }
      }
    }
  }

  pub(crate) fn remove(&mut self, key: &CacheKey) -> Option<V> {
    let removed = self.entries.remove(key)?;
    self.order.retain(|k| k != key);
    Some(removed.into_value())
  }

  /// Removes the entry only when the stored value satisfies the predicate.
  /// Used to let a finished dispatch clear its own pending marker without
  /// disturbing a superseding one. Does not count as a read for recency.
  pub(crate) fn remove_if(&mut self, key: &CacheKey, predicate: impl FnOnce(&V) -> bool) -> bool {
    let matched = match self.entries.get(key) {
      Some(entry) => predicate(entry.value()),
      None => false,
    };
    if matched {
      self.purge(key);
    }
    matched
  }

  pub(crate) fn clear(&mut self) {
    self.entries.clear();
    self.order.clear();
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }

  /// Moves the key to the front of the usage queue.
  fn touch(&mut self, key: &CacheKey) {
    if let Some(pos) = self.order.iter().position(|k| k == key) {
      if let Some(key) = self.order.remove(pos) {
        self.order.push_front(key);
      }
    }
  }

  /// Drops the slot and its order entry.
  fn purge(&mut self, key: &CacheKey) {
    self.entries.remove(key);
    self.order.retain(|k| k != key);
  }
}
