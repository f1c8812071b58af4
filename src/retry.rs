use crate::flight::Flight;
use crate::key::CacheKey;
use crate::shared::ThrottleShared;

use std::sync::Arc;

use log::{debug, warn};
use tokio::time::sleep;

/// Runs one dispatched refresh to completion and settles its flight.
///
/// The producer is invoked at most `retry_count + 1` times. A failure is
/// suppressed whenever an unexpired previous result exists (stale-while-error
/// fallback) or retries remain; only the final, fallback-less failure reaches
/// the coalesced callers.
pub(crate) async fn run_refresh<A, T, E>(
  shared: Arc<ThrottleShared<A, T, E>>,
  key: CacheKey,
  args: A,
  flight: Arc<Flight<T, E>>,
) where
  A: Clone + Send + 'static,
  T: Send + Sync + 'static,
  E: Send + Sync + 'static,
{
  let mut retries_remaining = shared.retry_count;

  let outcome = loop {
    match (shared.producer)(args.clone()).await {
      Ok(value) => {
        let value = Arc::new(value);
        shared
          .tables
          .lock()
          .results
          .insert(key, Arc::clone(&value));
        break Ok(value);
      }
      Err(error) => {
        // An unexpired previous result wins over the failure; every
        // coalesced caller receives it instead of the rejection.
        if let Some(previous) = shared.tables.lock().results.get(&key) {
          warn!("producer failed for {:?}; serving last-known-good result", key);
          break Ok(previous);
        }

        if retries_remaining > 0 {
          retries_remaining -= 1;
          let pause = shared.retry_pause();
          debug!(
            "producer failed for {:?}; retrying in {:?} ({} retries left)",
            key, pause, retries_remaining
          );
          if !pause.is_zero() {
            sleep(pause).await;
          }
          continue;
        }

        break Err(Arc::new(error));
      }
    }
  };

  if outcome.is_err() {
    // A failed dispatch must not sit on the refresh window: drop the pending
    // marker so the next invocation re-dispatches. The identity check spares
    // the marker of a dispatch that already superseded this one.
    let mut tables = shared.tables.lock();
    tables
      .pending
      .remove_if(&key, |entry| Arc::ptr_eq(entry, &flight));
  }

  flight.settle(outcome);
}
