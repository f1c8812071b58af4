use throttle_cache::ThrottleBuilder;

use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tokio::time::{sleep, Duration};

#[tokio::test]
async fn clearing_forces_the_next_call_through() {
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

  wrapper.invoke(1).await.unwrap();
  wrapper.invoke(2).await.unwrap();
  wrapper.invoke(1).await.unwrap();
  assert_eq!(calls.load(Ordering::SeqCst), 2);

  wrapper.clear_cache();
  assert!(!wrapper.is_cached(&1));
  assert!(!wrapper.is_cached(&2));

  wrapper.invoke(1).await.unwrap();
  wrapper.invoke(2).await.unwrap();
  assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn clearing_does_not_cancel_a_dispatched_call() {
  let calls = Arc::new(AtomicUsize::new(0));

  let wrapper = ThrottleBuilder::new({
    let calls = calls.clone();
    move |_key: u32| {
      let calls = calls.clone();
      async move {
        sleep(Duration::from_millis(80)).await;
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(11u32)
      }
    }
  })
  .build()
  .unwrap();

  let waiter = tokio::spawn({
    let wrapper = wrapper.clone();
    async move { wrapper.invoke(1).await }
  });

  sleep(Duration::from_millis(20)).await;
  wrapper.clear_cache();

  // The dispatched call runs to completion and its outcome still reaches the
  // waiter, and still lands in the (repopulated) result table.
  assert_eq!(*waiter.await.unwrap().unwrap(), 11);
  assert_eq!(calls.load(Ordering::SeqCst), 1);
  assert!(wrapper.is_cached(&1));
}

#[tokio::test]
async fn dropping_an_invoke_future_does_not_cancel_the_call() {
  let calls = Arc::new(AtomicUsize::new(0));

  let wrapper = ThrottleBuilder::new({
    let calls = calls.clone();
    move |_key: u32| {
      let calls = calls.clone();
      async move {
        sleep(Duration::from_millis(50)).await;
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(3u32)
      }
    }
  })
  .build()
  .unwrap();

  let abandoned = tokio::spawn({
    let wrapper = wrapper.clone();
    async move { wrapper.invoke(1).await }
  });
  sleep(Duration::from_millis(10)).await;
  abandoned.abort();

  sleep(Duration::from_millis(80)).await;
  assert!(wrapper.is_cached(&1), "the abandoned call's result must land");

  // Served from cache; the producer is not called again.
  assert_eq!(*wrapper.invoke(1).await.unwrap(), 3);
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalidating_one_key_leaves_the_others_cached() {
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

  wrapper.invoke(1).await.unwrap();
  wrapper.invoke(2).await.unwrap();

  assert!(wrapper.invalidate(&1));
  assert!(!wrapper.invalidate(&1), "already removed");
  assert!(!wrapper.is_cached(&1));
  assert!(wrapper.is_cached(&2));

  wrapper.invoke(1).await.unwrap();
  wrapper.invoke(2).await.unwrap();
  assert_eq!(calls.load(Ordering::SeqCst), 3, "only key 1 may pass through again");
}
