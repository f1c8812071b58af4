use crate::metrics::{HitRateReport, Metrics};

use std::sync::Arc;
use std::time::Duration;

use log::trace;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// The callback receiving one [`HitRateReport`] per tick.
pub(crate) type ReportHandler = Arc<dyn Fn(HitRateReport) + Send + Sync>;

/// The background task emitting periodic hit-rate telemetry.
///
/// The task owns only the counters and the handler, never the shared core, so
/// dropping the last wrapper handle is what ends its life (via `stop`), not
/// the other way around.
pub(crate) struct Reporter {
  handle: JoinHandle<()>,
}

impl Reporter {
  /// Spawns the reporter onto the given runtime. The first report fires one
  /// full period after construction, each carrying the counters accumulated
  /// since the previous tick.
  pub(crate) fn spawn(
    runtime: &Handle,
    metrics: Arc<Metrics>,
    period: Duration,
    handler: ReportHandler,
  ) -> Self {
    let handle = runtime.spawn(async move {
      let mut ticker = time::interval_at(time::Instant::now() + period, period);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        ticker.tick().await;
        handler(metrics.drain());
      }
    });

    Self { handle }
  }

  /// Stops the reporter task. Counters accumulated since the last tick are
  /// discarded with the wrapper.
  pub(crate) fn stop(self) {
    trace!("stopping hit-rate reporter");
    self.handle.abort();
  }
}
