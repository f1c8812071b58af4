use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use futures_util::future::BoxFuture;
use parking_lot::Mutex;

/// The settled result of one dispatched producer call, shared by every
/// coalesced caller. The value and the error both live behind an `Arc` so
/// neither `T: Clone` nor `E: Clone` is required.
pub(crate) type Outcome<T, E> = Result<Arc<T>, Arc<E>>;

/// The type-erased producer function the wrapper shields.
pub(crate) type Producer<A, T, E> =
  Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// The internal state of a dispatched producer call.
enum State<T, E> {
  InFlight,
  Settled(Outcome<T, E>),
}

struct Inner<T, E> {
  state: State<T, E>,
  waiters: VecDeque<Waker>,
}

/// One dispatched producer call that multiple invocations can await
/// simultaneously. Settles exactly once; every waiter observes the identical
/// outcome.
pub(crate) struct Flight<T, E> {
  inner: Mutex<Inner<T, E>>,
}

impl<T, E> Flight<T, E> {
  /// Creates a new `Flight` in the in-flight state.
  pub(crate) fn new() -> Self {
    Self {
      inner: Mutex::new(Inner {
        state: State::InFlight,
        waiters: VecDeque::new(),
      }),
    }
  }

  /// Settles the flight with an outcome, waking all waiters.
  pub(crate) fn settle(&self, outcome: Outcome<T, E>) {
    let mut inner = self.inner.lock();
    inner.state = State::Settled(outcome);
    for waiter in inner.waiters.drain(..) {
      waiter.wake();
    }
  }

  /// Waits for the flight to settle.
  pub(crate) async fn outcome(&self) -> Outcome<T, E> {
    self.await
  }
}

impl<T, E> Future for &Flight<T, E> {
  type Output = Outcome<T, E>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let mut inner = self.inner.lock();
    match &inner.state {
      State::Settled(outcome) => Poll::Ready(outcome.clone()),
      State::InFlight => {
        inner.waiters.push_back(cx.waker().clone());
        Poll::Pending
      }
    }
  }
}
