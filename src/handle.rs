use crate::flight::Flight;
use crate::key::CacheKey;
use crate::metrics::HitRateReport;
use crate::shared::ThrottleShared;

use std::fmt;
use std::sync::Arc;

use log::{debug, trace, warn};
use serde::Serialize;

/// A caching, throttling handle around an asynchronous producer function.
///
/// Built with [`ThrottleBuilder`](crate::ThrottleBuilder). Cloning is cheap
/// and every clone shares the same cache state, counters, and reporter; the
/// state is owned by the handles, never by a process-wide singleton.
pub struct Throttled<A, T, E> {
  pub(crate) shared: Arc<ThrottleShared<A, T, E>>,
}

impl<A, T, E> Clone for Throttled<A, T, E> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<A, T, E> fmt::Debug for Throttled<A, T, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Throttled")
      .field("shared", &self.shared)
      .finish()
  }
}

impl<A, T, E> Throttled<A, T, E>
where
  A: Serialize + Clone + Send + 'static,
  T: Send + Sync + 'static,
  E: Send + Sync + 'static,
{
  /// Invokes the wrapped producer through the cache.
  ///
  /// Within the refresh window, calls for structurally equal arguments are
  /// served from cache or coalesced onto the outstanding producer call; an
  /// unexpired cached result is returned immediately even while a refresh is
  /// in flight. Fails with the producer's error only when retries are
  /// exhausted and no unexpired previous result exists.
  ///
  /// Dropping the returned future never cancels a dispatched producer call.
  pub async fn invoke(&self, args: A) -> Result<Arc<T>, Arc<E>> {
    self.shared.metrics.record_call();

    let key = match CacheKey::derive(&self.shared.key_hasher, &args) {
      Some(key) => key,
      None => return self.pass_through(args).await,
    };

    let flight = {
      let mut tables = self.shared.tables.lock();

      let flight = match tables.pending.get(&key) {
        Some(flight) => flight,
        None => {
          // The refresh window elapsed, nothing was ever dispatched, or the
          // prior dispatch failed without a fallback. The new marker lands
          // in the table inside this critical section, so a concurrent
          // invocation observes "already pending" and attaches to this
          // flight instead of dispatching a duplicate call.
          let flight = Arc::new(Flight::new());
          tables.pending.insert(key, Arc::clone(&flight));
          self.shared.metrics.record_pass_through();
          debug!("dispatching producer call for {:?}", key);
          ThrottleShared::spawn_refresh(
            Arc::clone(&self.shared),
            key,
            args,
            Arc::clone(&flight),
          );
          flight
        }
      };

      // Stale-while-revalidate: an unexpired result short-circuits even
      // while a refresh is in flight.
      if let Some(value) = tables.results.get(&key) {
        trace!("serving cached result for {:?}", key);
        return Ok(value);
      }

      flight
    };

    flight.outcome().await
  }

  /// Contract-violation path: the argument value could not be serialized, so
  /// no key exists to cache or coalesce under. The producer is called
  /// directly, once.
  async fn pass_through(&self, args: A) -> Result<Arc<T>, Arc<E>> {
    warn!("argument value is not serializable; bypassing the cache");
    self.shared.metrics.record_pass_through();
    match (self.shared.producer)(args).await {
      Ok(value) => Ok(Arc::new(value)),
      Err(error) => Err(Arc::new(error)),
    }
  }

  /// Atomically empties both cache tables.
  ///
  /// Producer calls already dispatched are not cancelled; each eventual
  /// outcome is still written into the (possibly repopulated) result table.
  pub fn clear_cache(&self) {
    let mut tables = self.shared.tables.lock();
    tables.pending.clear();
    tables.results.clear();
  }

  /// Removes one key's entries from both tables, so the next call for these
  /// arguments re-invokes the producer. Returns whether a result entry was
  /// removed. An in-flight call for the key is not cancelled.
  pub fn invalidate(&self, args: &A) -> bool {
    let key = match CacheKey::derive(&self.shared.key_hasher, args) {
      Some(key) => key,
      None => return false,
    };
    let mut tables = self.shared.tables.lock();
    tables.pending.remove(&key);
    tables.results.remove(&key).is_some()
  }

  /// Whether an unexpired result is cached for these arguments.
  pub fn is_cached(&self, args: &A) -> bool {
    match CacheKey::derive(&self.shared.key_hasher, args) {
      Some(key) => self.shared.tables.lock().results.contains(&key),
      None => false,
    }
  }

  /// A snapshot of the call counters accumulated since construction or since
  /// the last reporter tick. Does not reset them.
  pub fn statistics(&self) -> HitRateReport {
    self.shared.metrics.snapshot()
  }
}
