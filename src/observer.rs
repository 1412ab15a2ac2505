//! The Observer side of the push contract.
//!
//! An observer receives zero or more `next` values followed by at most one
//! terminal notification. Terminal calls take `self` by value, so an owned
//! observer cannot be used after `error` or `complete`: the terminal-once
//! rule is enforced by the type system wherever ownership is direct, and by
//! [`SharedObserver`] wherever the observer is shared between scheduled
//! actions.

use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use crate::rc::MutArc;

pub trait Observer<Item, Err> {
  /// Receive the next value of the sequence.
  fn next(&mut self, value: Item);

  /// Terminal failure. Consumes the observer; no calls may follow.
  fn error(self, err: Err);

  /// Terminal completion. Consumes the observer; no calls may follow.
  fn complete(self);

  /// `true` once the observer can no longer accept notifications. Producers
  /// consult this between emissions to stop early when the subscription is
  /// gone.
  fn is_closed(&self) -> bool;
}

/// Object-safe mirror of [`Observer`].
///
/// `Observer` itself is not object safe because terminal methods take `self`
/// by value; this trait adapts them for vtable dispatch through a `Box`.
pub trait DynObserver<Item, Err> {
  fn dyn_next(&mut self, value: Item);
  fn dyn_error(self: Box<Self>, err: Err);
  fn dyn_complete(self: Box<Self>);
  fn dyn_is_closed(&self) -> bool;
}

impl<T, Item, Err> DynObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  fn dyn_next(&mut self, value: Item) { self.next(value); }
  fn dyn_error(self: Box<Self>, err: Err) { (*self).error(err); }
  fn dyn_complete(self: Box<Self>) { (*self).complete(); }
  fn dyn_is_closed(&self) -> bool { self.is_closed() }
}

/// The boxed observer every `subscribe_core` implementation receives.
pub type BoxObserver<Item, Err> = Box<dyn DynObserver<Item, Err> + Send>;

impl<Item, Err> Observer<Item, Err> for BoxObserver<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).dyn_next(value) }

  #[inline]
  fn error(self, err: Err) { self.dyn_error(err) }

  #[inline]
  fn complete(self) { self.dyn_complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).dyn_is_closed() }
}

/// Observer assembled from three callbacks. `subscribe` and friends build
/// one of these; unsupplied callbacks default to no-ops.
pub struct ObserverFns<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverFns<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self { Self { next, error, complete } }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverFns<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(self) { (self.complete)() }

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// The shared observer gate: a closed flag plus the observer cell. The
/// first terminal call flips the flag and takes the inner observer out of
/// the cell, so a late notification from a cancelled producer is dropped
/// instead of faulting.
///
/// [`close`](Self::close) is safe to call re-entrantly from the very
/// callback the gate is delivering to: it flips the flag without waiting
/// for the cell lock, and the in-flight delivery releases the observer once
/// its callback returns.
pub struct SharedObserver<O> {
  closed: Arc<AtomicBool>,
  cell: MutArc<Option<O>>,
}

impl<O> SharedObserver<O> {
  pub fn new(observer: O) -> Self {
    Self {
      closed: Arc::new(AtomicBool::new(false)),
      cell: MutArc::own(Some(observer)),
    }
  }

  /// Stop all further delivery and release the inner observer. Idempotent.
  pub fn close(&self) {
    self.closed.store(true, Ordering::SeqCst);
    // A delivery in flight on the cell observes the flag and releases the
    // observer itself.
    if let Some(mut cell) = self.cell.rc_try_deref_mut() {
      cell.take();
    }
  }
}

impl<O> Clone for SharedObserver<O> {
  fn clone(&self) -> Self {
    Self { closed: self.closed.clone(), cell: self.cell.clone() }
  }
}

impl<O, Item, Err> Observer<Item, Err> for SharedObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.closed.load(Ordering::SeqCst) {
      return;
    }
    if let Some(inner) = self.cell.rc_deref_mut().as_mut() {
      inner.next(value);
    }
    // The callback may have closed the gate; finish the release it could
    // not perform while this delivery held the cell.
    if self.closed.load(Ordering::SeqCst) {
      self.cell.rc_deref_mut().take();
    }
  }

  fn error(self, err: Err) {
    self.closed.store(true, Ordering::SeqCst);
    let inner = self.cell.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.error(err);
    }
  }

  fn complete(self) {
    self.closed.store(true, Ordering::SeqCst);
    let inner = self.cell.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.closed.load(Ordering::SeqCst) }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Collect {
    values: Vec<i32>,
    terminals: MutArc<Vec<&'static str>>,
  }

  impl Observer<i32, &'static str> for Collect {
    fn next(&mut self, value: i32) { self.values.push(value); }
    fn error(self, err: &'static str) { self.terminals.rc_deref_mut().push(err); }
    fn complete(self) { self.terminals.rc_deref_mut().push("complete"); }
    fn is_closed(&self) -> bool { false }
  }

  #[test]
  fn closure_observer() {
    let seen = MutArc::own(Vec::new());
    let sink = seen.clone();
    let done = MutArc::own(false);
    let flag = done.clone();
    let mut observer =
      ObserverFns::new(move |v: i32| sink.rc_deref_mut().push(v), |_: &str| {}, move || {
        *flag.rc_deref_mut() = true
      });
    observer.next(1);
    observer.next(2);
    observer.complete();
    assert_eq!(*seen.rc_deref(), vec![1, 2]);
    assert!(*done.rc_deref());
  }

  #[test]
  fn boxed_observer_round_trip() {
    let terminals = MutArc::own(Vec::new());
    let mut boxed: BoxObserver<i32, &'static str> =
      Box::new(Collect { values: vec![], terminals: terminals.clone() });
    boxed.next(7);
    boxed.error("boom");
    assert_eq!(*terminals.rc_deref(), vec!["boom"]);
  }

  #[test]
  fn gate_is_terminal_once() {
    let terminals = MutArc::own(Vec::new());
    let gate = SharedObserver::new(Collect { values: vec![], terminals: terminals.clone() });
    let mut a = gate.clone();
    let b = gate.clone();
    let c = gate.clone();

    a.next(1);
    b.complete();
    assert!(gate.is_closed());

    // Late notifications through surviving handles are dropped.
    a.next(2);
    c.error("late");
    assert_eq!(*terminals.rc_deref(), vec!["complete"]);
  }

  #[test]
  fn closing_the_gate_from_inside_a_delivery_sticks() {
    // The callback itself closes the gate it is being delivered through;
    // the call must return instead of blocking on the cell.
    let seen = MutArc::own(Vec::new());
    let slot: MutArc<Option<SharedObserver<BoxObserver<i32, &'static str>>>> =
      MutArc::own(None);

    let sink = seen.clone();
    let closer = slot.clone();
    let gate = SharedObserver::new(Box::new(ObserverFns::new(
      move |v: i32| {
        sink.rc_deref_mut().push(v);
        if let Some(gate) = closer.rc_deref().as_ref() {
          gate.close();
        }
      },
      |_: &'static str| {},
      || {},
    )) as BoxObserver<i32, &'static str>);
    *slot.rc_deref_mut() = Some(gate.clone());

    let mut handle = gate.clone();
    handle.next(1);
    handle.next(2);
    assert!(gate.is_closed());
    assert_eq!(*seen.rc_deref(), vec![1]);
  }
}
