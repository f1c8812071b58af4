use std::fmt;

/// Errors that can occur when building a wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// The wrapper was configured with a capacity of zero, which is not
  /// allowed for a bounded cache. Use `unbounded()` instead.
  ZeroCapacity,
  /// A hit-rate report period of zero was configured.
  ZeroReportPeriod,
  /// Hit-rate reporting was requested, but `build` was called outside of a
  /// Tokio runtime, so the reporter task has nothing to run on.
  NoRuntime,
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ZeroCapacity => write!(f, "bounded cache capacity cannot be zero"),
      BuildError::ZeroReportPeriod => write!(f, "hit-rate report period cannot be zero"),
      BuildError::NoRuntime => write!(
        f,
        "hit-rate reporting requires building inside a Tokio runtime"
      ),
    }
  }
}

impl std::error::Error for BuildError {}
