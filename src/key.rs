use std::hash::{BuildHasher, Hash, Hasher};

use serde::Serialize;

/// A fixed-size digest of a call's argument value.
///
/// Two argument values map to the same key iff their canonical serializations
/// are equal, i.e. they are deeply, order-independently (with respect to
/// object-field order) structurally equal. Collisions of the digest are an
/// accepted, undetected risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey(u64);

impl CacheKey {
  /// Derives the key for an argument value.
  ///
  /// The value is serialized through `serde_json::Value`, whose object
  /// representation keeps fields sorted, so field declaration order never
  /// influences the key. Arrays keep their order. Returns `None` when the
  /// value cannot be serialized, which is a violation of the producer
  /// contract; the caller degrades to a direct pass-through call.
  pub(crate) fn derive<A, H>(hasher: &H, args: &A) -> Option<Self>
  where
    A: Serialize,
    H: BuildHasher,
  {
    let canonical = serde_json::to_value(args).ok()?.to_string();
    let mut state = hasher.build_hasher();
    canonical.hash(&mut state);
    Some(CacheKey(state.finish()))
  }
}
