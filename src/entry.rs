use std::time::{Duration, Instant};

/// A stored value together with its creation time.
///
/// Entries carry no per-entry TTL; the owning table applies one uniform TTL
/// to every entry it holds.
#[derive(Debug)]
pub(crate) struct StoreEntry<V> {
  value: V,
  created_at: Instant,
}

impl<V> StoreEntry<V> {
  pub(crate) fn new(value: V) -> Self {
    Self {
      value,
      created_at: Instant::now(),
    }
  }

  #[inline]
  pub(crate) fn value(&self) -> &V {
    &self.value
  }

  #[inline]
  pub(crate) fn into_value(self) -> V {
    self.value
  }

  /// Whether the entry's age has reached the table's TTL. An expired entry
  /// is treated as absent on read even while it still occupies a slot.
  #[inline]
  pub(crate) fn is_expired(&self, ttl: Duration) -> bool {
    self.created_at.elapsed() >= ttl
  }
}
