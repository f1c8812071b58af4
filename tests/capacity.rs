use throttle_cache::ThrottleBuilder;

use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

#[tokio::test]
async fn the_least_recently_used_key_is_evicted_over_capacity() {
  let calls = Arc::new(AtomicUsize::new(0));

  let wrapper = ThrottleBuilder::new({
    let calls = calls.clone();
    move |key: i32| {
      let calls = calls.clone();
      async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(key * 10)
      }
    }
  })
  .max_cached_items(2)
  .build()
  .unwrap();

  wrapper.invoke(1).await.unwrap();
  wrapper.invoke(2).await.unwrap();
  wrapper.invoke(3).await.unwrap();

  // Adding key 3 pushed key 1 out of both tables.
  assert!(!wrapper.is_cached(&1));
  assert!(wrapper.is_cached(&2));
  assert!(wrapper.is_cached(&3));

  assert_eq!(*wrapper.invoke(1).await.unwrap(), 10);
  assert_eq!(
    calls.load(Ordering::SeqCst),
    4,
    "the evicted key must re-invoke the producer"
  );

  // Key 3 survived the re-insertion of key 1 (key 2 was the LRU).
  assert!(wrapper.is_cached(&3));
  wrapper.invoke(3).await.unwrap();
  assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn reads_protect_an_entry_from_eviction() {
  let calls = Arc::new(AtomicUsize::new(0));

  let wrapper = ThrottleBuilder::new({
    let calls = calls.clone();
    move |key: i32| {
      let calls = calls.clone();
      async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(key)
      }
    }
  })
  .max_cached_items(2)
  .build()
  .unwrap();

  wrapper.invoke(1).await.unwrap();
  wrapper.invoke(2).await.unwrap();

  // Re-reading key 1 makes key 2 the least recently used.
  wrapper.invoke(1).await.unwrap();
  wrapper.invoke(3).await.unwrap();

  assert!(wrapper.is_cached(&1), "recently read entry must survive");
  assert!(!wrapper.is_cached(&2));
  assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn an_unbounded_wrapper_keeps_every_key() {
  let calls = Arc::new(AtomicUsize::new(0));

  let wrapper = ThrottleBuilder::new({
    let calls = calls.clone();
    move |key: i32| {
      let calls = calls.clone();
      async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(key)
      }
    }
  })
  .build()
  .unwrap();

  for key in 0..32 {
    wrapper.invoke(key).await.unwrap();
  }
  for key in 0..32 {
    wrapper.invoke(key).await.unwrap();
  }

  assert_eq!(calls.load(Ordering::SeqCst), 32);
}
