use crate::error::BuildError;
use crate::flight::Producer;
use crate::handle::Throttled;
use crate::metrics::{HitRateReport, Metrics};
use crate::reporter::{ReportHandler, Reporter};
use crate::shared::{Tables, ThrottleShared};
use crate::store::Store;

use core::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tokio::runtime::Handle;

const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(60);
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(300);
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// A builder for [`Throttled`] wrappers.
///
/// Every option has a default; only the producer is mandatory.
pub struct ThrottleBuilder<A, T, E> {
  producer: Producer<A, T, E>,
  cache_refresh_period: Duration,
  cache_max_age: Duration,
  max_cached_items: Option<usize>,
  retry_count: u32,
  retry_delay: Duration,
  retry_jitter: Option<Duration>,
  hit_rate_report_period: Option<Duration>,
  hit_rate_report_handler: Option<ReportHandler>,
}

// Manual Debug implementation; the producer closure has none.
impl<A, T, E> fmt::Debug for ThrottleBuilder<A, T, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ThrottleBuilder")
      .field("cache_refresh_period", &self.cache_refresh_period)
      .field("cache_max_age", &self.cache_max_age)
      .field("max_cached_items", &self.max_cached_items)
      .field("retry_count", &self.retry_count)
      .field("retry_delay", &self.retry_delay)
      .field("retry_jitter", &self.retry_jitter)
      .field("hit_rate_report_period", &self.hit_rate_report_period)
      .finish_non_exhaustive()
  }
}

impl<A, T, E> ThrottleBuilder<A, T, E> {
  /// Creates a builder around the producer function with default settings.
  ///
  /// The producer may be called with any arguments passed to
  /// [`Throttled::invoke`]; arguments must be structurally serializable for
  /// key derivation.
  pub fn new<F, Fut>(producer: F) -> Self
  where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    let producer: Producer<A, T, E> =
      Arc::new(move |args| Box::pin(producer(args)) as BoxFuture<'static, Result<T, E>>);

    Self {
      producer,
      cache_refresh_period: DEFAULT_REFRESH_PERIOD,
      cache_max_age: DEFAULT_MAX_AGE,
      max_cached_items: None,
      retry_count: 0,
      retry_delay: DEFAULT_RETRY_DELAY,
      retry_jitter: None,
      hit_rate_report_period: None,
      hit_rate_report_handler: None,
    }
  }

  /// Sets the time before a fresh refresh attempt is triggered for a key.
  pub fn cache_refresh_period(mut self, period: Duration) -> Self {
    self.cache_refresh_period = period;
    self
  }

  /// Sets the time before a stored result is treated as expired.
  pub fn cache_max_age(mut self, max_age: Duration) -> Self {
    self.cache_max_age = max_age;
    self
  }

  /// Bounds each cache table to `items` entries; the least-recently-used
  /// entry is evicted above the bound.
  pub fn max_cached_items(mut self, items: usize) -> Self {
    self.max_cached_items = Some(items);
    self
  }

  /// Removes the capacity bound. This is the default.
  pub fn unbounded(mut self) -> Self {
    self.max_cached_items = None;
    self
  }

  /// Sets the number of additional attempts after the first failure.
  pub fn retry_count(mut self, count: u32) -> Self {
    self.retry_count = count;
    self
  }

  /// Sets the constant pause between successive retries. A zero delay (with
  /// no jitter) skips the pause entirely.
  pub fn retry_delay(mut self, delay: Duration) -> Self {
    self.retry_delay = delay;
    self
  }

  /// Adds a uniform random pause in `0..=jitter` on top of the retry delay,
  /// de-synchronizing retry storms across keys.
  pub fn retry_jitter(mut self, jitter: Duration) -> Self {
    self.retry_jitter = Some(jitter);
    self
  }

  /// Enables periodic hit-rate reporting at the given interval.
  pub fn hit_rate_report_period(mut self, period: Duration) -> Self {
    self.hit_rate_report_period = Some(period);
    self
  }

  /// Sets the handler receiving one [`HitRateReport`] per report tick. The
  /// counters reset to zero after each delivery. No-op unless a report
  /// period is configured.
  pub fn hit_rate_report_handler(
    mut self,
    handler: impl Fn(HitRateReport) + Send + Sync + 'static,
  ) -> Self {
    self.hit_rate_report_handler = Some(Arc::new(handler));
    self
  }

  /// Builds the wrapper.
  ///
  /// Must be called inside a Tokio runtime when hit-rate reporting is
  /// enabled; the reporter task is spawned here.
  pub fn build(self) -> Result<Throttled<A, T, E>, BuildError> {
    self.validate()?;

    let metrics = Arc::new(Metrics::new());

    let reporter = match self.hit_rate_report_period {
      Some(period) => {
        let runtime = Handle::try_current().map_err(|_| BuildError::NoRuntime)?;
        let handler = self
          .hit_rate_report_handler
          .unwrap_or_else(|| Arc::new(|_| {}));
        Some(Reporter::spawn(&runtime, Arc::clone(&metrics), period, handler))
      }
      None => None,
    };

    let shared = ThrottleShared {
      producer: self.producer,
      tables: Mutex::new(Tables {
        pending: Store::new(self.cache_refresh_period, self.max_cached_items),
        results: Store::new(self.cache_max_age, self.max_cached_items),
      }),
      metrics,
      key_hasher: ahash::RandomState::new(),
      retry_count: self.retry_count,
      retry_delay: self.retry_delay,
      retry_jitter: self.retry_jitter,
      reporter,
    };

    Ok(Throttled {
      shared: Arc::new(shared),
    })
  }

  /// Validates the builder configuration.
  fn validate(&self) -> Result<(), BuildError> {
    if self.max_cached_items == Some(0) {
      return Err(BuildError::ZeroCapacity);
    }
    if self.hit_rate_report_period == Some(Duration::ZERO) {
      return Err(BuildError::ZeroReportPeriod);
    }
    Ok(())
  }
}
