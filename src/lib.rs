//! A caching and throttling wrapper for asynchronous producer functions,
//! shielding callers from repeated expensive invocations and from transient
//! failures while bounding memory.
//!
//! # Features
//! - **Stale-While-Revalidate**: serves the cached value immediately while a
//!   background refresh runs for the same key.
//! - **Request Coalescing**: any number of concurrent calls for one key
//!   resolve from a single underlying producer call.
//! - **Retry With Backoff**: bounded retries with a constant delay and
//!   optional uniform jitter, falling back to the last-known-good result.
//! - **Bounded Memory**: per-table capacity with LRU eviction and TTL-based
//!   expiry.
//! - **Observability**: optional periodic hit-rate reporting.
//!
//! # Example
//! ```no_run
//! use throttle_cache::ThrottleBuilder;
//! use std::time::Duration;
//!
//! # async fn run() {
//! let lookup = ThrottleBuilder::new(|host: String| async move {
//!     Ok::<_, std::io::Error>(format!("resolved {host}"))
//!   })
//!   .cache_refresh_period(Duration::from_secs(30))
//!   .retry_count(2)
//!   .build()
//!   .unwrap();
//!
//! let addr = lookup.invoke("example.com".to_string()).await.unwrap();
//! # }
//! ```

// Public modules that form the API
pub mod builder;
pub mod error;
pub mod handle;
pub mod metrics;

// Internal, crate-only modules
mod entry;
mod flight;
mod key;
mod reporter;
mod retry;
mod shared;
mod store;

// Re-export the primary user-facing types for convenience
pub use builder::ThrottleBuilder;
pub use error::BuildError;
pub use handle::Throttled;
pub use metrics::HitRateReport;
