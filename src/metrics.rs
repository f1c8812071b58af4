use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

/// Internal call counters. All fields are atomic to allow for lock-free
/// updates from any task.
#[derive(Debug, Default)]
pub(crate) struct Metrics {
  /// Every invocation of the wrapper.
  total_calls: CachePadded<AtomicU64>,
  /// Invocations that dispatched a producer call instead of reusing or
  /// coalescing.
  passed_through_calls: CachePadded<AtomicU64>,
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub(crate) fn record_call(&self) {
    self.total_calls.fetch_add(1, Ordering::Relaxed);
  }

  #[inline]
  pub(crate) fn record_pass_through(&self) {
    self.passed_through_calls.fetch_add(1, Ordering::Relaxed);
  }

  /// A point-in-time snapshot. Leaves the counters untouched.
  pub(crate) fn snapshot(&self) -> HitRateReport {
    HitRateReport {
      total_calls: self.total_calls.load(Ordering::Relaxed),
      passed_through_calls: self.passed_through_calls.load(Ordering::Relaxed),
    }
  }

  /// Takes the counters accumulated since the previous drain, resetting both
  /// to zero. One reporter tick consumes exactly one accumulation window.
  pub(crate) fn drain(&self) -> HitRateReport {
    HitRateReport {
      total_calls: self.total_calls.swap(0, Ordering::Relaxed),
      passed_through_calls: self.passed_through_calls.swap(0, Ordering::Relaxed),
    }
  }
}

/// A snapshot of the wrapper's call counters, as delivered to the hit-rate
/// report handler on every tick and returned by
/// [`Throttled::statistics`](crate::Throttled::statistics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRateReport {
  /// The number of invocations observed in the window.
  pub total_calls: u64,
  /// The number of invocations that reached the producer, i.e. dispatched a
  /// refresh instead of being served from cache or coalesced.
  pub passed_through_calls: u64,
}

impl HitRateReport {
  /// The fraction of calls shielded from the producer, in `0.0..=1.0`.
  /// Returns `0.0` for an empty window.
  pub fn hit_ratio(&self) -> f64 {
    if self.total_calls == 0 {
      0.0
    } else {
      1.0 - self.passed_through_calls as f64 / self.total_calls as f64
    }
  }
}
