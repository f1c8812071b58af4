use crate::flight::{Flight, Producer};
use crate::key::CacheKey;
use crate::metrics::Metrics;
use crate::reporter::Reporter;
use crate::retry;
use crate::store::Store;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// The two cache tables, guarded together so the dispatch decision and the
/// pending-marker write happen in one critical section.
pub(crate) struct Tables<T, E> {
  /// Pending-call table, keyed by the refresh TTL. An unexpired entry means
  /// "a refresh for this key is outstanding or was issued within the refresh
  /// window".
  pub(crate) pending: Store<Arc<Flight<T, E>>>,
  /// Result table, keyed by the max-age TTL. Holds the last successful value
  /// for each key; written only on producer success.
  pub(crate) results: Store<Arc<T>>,
}

/// The internal core of the wrapper, shared by every handle and every
/// dispatched refresh task.
pub(crate) struct ThrottleShared<A, T, E> {
  pub(crate) producer: Producer<A, T, E>,
  pub(crate) tables: Mutex<Tables<T, E>>,
  pub(crate) metrics: Arc<Metrics>,
  pub(crate) key_hasher: ahash::RandomState,
  pub(crate) retry_count: u32,
  pub(crate) retry_delay: Duration,
  pub(crate) retry_jitter: Option<Duration>,
  pub(crate) reporter: Option<Reporter>,
}

impl<A, T, E> fmt::Debug for ThrottleShared<A, T, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ThrottleShared")
      .field("retry_count", &self.retry_count)
      .field("retry_delay", &self.retry_delay)
      .field("has_reporter", &self.reporter.is_some())
      .finish_non_exhaustive()
  }
}

impl<A, T, E> Drop for ThrottleShared<A, T, E> {
  fn drop(&mut self) {
    if let Some(reporter) = self.reporter.take() {
      reporter.stop();
    }
  }
}

impl<A, T, E> ThrottleShared<A, T, E>
where
  A: Clone + Send + 'static,
  T: Send + Sync + 'static,
  E: Send + Sync + 'static,
{
  /// Dispatches one refresh attempt for a key onto the runtime.
  ///
  /// The caller has already written `flight` into the pending table; the
  /// spawned task runs the retry engine and settles it. The task is never
  /// cancelled: its outcome is written back even when it has long been
  /// superseded.
  pub(crate) fn spawn_refresh(shared: Arc<Self>, key: CacheKey, args: A, flight: Arc<Flight<T, E>>) {
    tokio::spawn(retry::run_refresh(shared, key, args, flight));
  }
}

impl<A, T, E> ThrottleShared<A, T, E> {
  /// The pause before the next retry: the constant delay plus, when
  /// configured, a uniform random jitter.
  pub(crate) fn retry_pause(&self) -> Duration {
    match self.retry_jitter {
      Some(jitter) if !jitter.is_zero() => {
        use rand::Rng;
        self.retry_delay + rand::rng().random_range(Duration::ZERO..=jitter)
      }
      _ => self.retry_delay,
    }
  }
}
