//! Source factories.
//!
//! All of them defer their emissions through the subscription's scheduler
//! (the current-thread trampoline when none is supplied). `from_iter` emits
//! one element per recursively scheduled step, so arbitrarily long inputs
//! replay without growing the call stack.

use crate::{
  disposable::{BooleanDisposable, BoxDisposable, Disposable, SerialDisposable},
  observable::{create, AnonymousObservable, Observable},
  observer::{BoxObserver, Observer, SharedObserver},
  rc::MutArc,
  scheduler::{default_scheduler, ArcScheduler, ScheduleAction},
};

/// Emits `value` once, then completes.
pub fn of<Item, Err>(
  value: Item,
) -> impl Observable<Item = Item, Err = Err> + Send + Sync
where
  Item: Clone + Send + Sync + 'static,
  Err: 'static,
{
  create(move |observer: BoxObserver<Item, Err>, scheduler: Option<ArcScheduler>| {
    let value = value.clone();
    scheduler.unwrap_or_else(default_scheduler).schedule(Box::new(move |_| {
      let mut observer = observer;
      observer.next(value);
      observer.complete();
    }))
  })
}

/// Completes immediately without emitting.
pub fn empty<Item, Err>() -> impl Observable<Item = Item, Err = Err> + Send + Sync
where
  Item: 'static,
  Err: 'static,
{
  create(|observer: BoxObserver<Item, Err>, scheduler: Option<ArcScheduler>| {
    scheduler
      .unwrap_or_else(default_scheduler)
      .schedule(Box::new(move |_| observer.complete()))
  })
}

/// Emits `err` immediately.
pub fn throw<Item, Err>(err: Err) -> impl Observable<Item = Item, Err = Err> + Send + Sync
where
  Item: 'static,
  Err: Clone + Send + Sync + 'static,
{
  create(move |observer: BoxObserver<Item, Err>, scheduler: Option<ArcScheduler>| {
    let err = err.clone();
    scheduler
      .unwrap_or_else(default_scheduler)
      .schedule(Box::new(move |_| observer.error(err)))
  })
}

/// Never emits and never terminates; the subscription lives until disposed.
pub fn never<Item, Err>() -> impl Observable<Item = Item, Err = Err> + Send + Sync
where
  Item: 'static,
  Err: 'static,
{
  create(|_observer: BoxObserver<Item, Err>, _scheduler: Option<ArcScheduler>| {
    Box::new(BooleanDisposable::new()) as BoxDisposable
  })
}

/// Replays an iterable, one element per scheduled step.
pub fn from_iter<I, Err>(
  source: I,
) -> AnonymousObservable<
  impl Fn(BoxObserver<I::Item, Err>, Option<ArcScheduler>) -> BoxDisposable,
  I::Item,
  Err,
>
where
  I: IntoIterator + Clone + Send + Sync + 'static,
  I::IntoIter: Send + 'static,
  I::Item: 'static,
  Err: 'static,
{
  create(move |observer: BoxObserver<I::Item, Err>, scheduler: Option<ArcScheduler>| {
    let scheduler = scheduler.unwrap_or_else(default_scheduler);
    let cursor = MutArc::own(source.clone().into_iter());
    let observer = SharedObserver::new(observer);
    let pending = SerialDisposable::new();
    pending.set(scheduler.schedule(iter_step(cursor, observer, pending.clone())));
    Box::new(pending)
  })
}

fn iter_step<It, Item, Err>(
  cursor: MutArc<It>,
  observer: SharedObserver<BoxObserver<Item, Err>>,
  pending: SerialDisposable,
) -> ScheduleAction
where
  It: Iterator<Item = Item> + Send + 'static,
  Item: 'static,
  Err: 'static,
{
  Box::new(move |scheduler: &ArcScheduler| {
    if pending.is_disposed() || observer.is_closed() {
      return;
    }
    let item = cursor.rc_deref_mut().next();
    match item {
      Some(value) => {
        observer.clone().next(value);
        pending.set(
          scheduler
            .clone()
            .schedule(iter_step(cursor.clone(), observer.clone(), pending.clone())),
        );
      }
      None => observer.clone().complete(),
    }
  })
}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use super::*;
  use crate::scheduler::VirtualTimeScheduler;

  #[test]
  fn of_emits_once_then_completes() {
    let seen = MutArc::own(Vec::new());
    let outcome = MutArc::own(Vec::new());
    let sink = seen.clone();
    let done = outcome.clone();
    of::<_, Infallible>(42).subscribe_all(
      move |v| sink.rc_deref_mut().push(v),
      |_| {},
      move || done.rc_deref_mut().push("complete"),
    );
    assert_eq!(*seen.rc_deref(), vec![42]);
    assert_eq!(*outcome.rc_deref(), vec!["complete"]);
  }

  #[test]
  fn empty_completes_without_values() {
    let seen: MutArc<Vec<i32>> = MutArc::own(Vec::new());
    let outcome = MutArc::own(Vec::new());
    let sink = seen.clone();
    let done = outcome.clone();
    empty::<i32, Infallible>().subscribe_all(
      move |v| sink.rc_deref_mut().push(v),
      |_| {},
      move || done.rc_deref_mut().push("complete"),
    );
    assert!(seen.rc_deref().is_empty());
    assert_eq!(*outcome.rc_deref(), vec!["complete"]);
  }

  #[test]
  fn throw_emits_the_error() {
    let outcome = MutArc::own(Vec::new());
    let done = outcome.clone();
    throw::<i32, _>("boom").subscribe_all(
      |_| {},
      move |e| done.rc_deref_mut().push(e),
      || {},
    );
    assert_eq!(*outcome.rc_deref(), vec!["boom"]);
  }

  #[test]
  fn never_stays_silent_until_disposed() {
    let vt = VirtualTimeScheduler::new();
    let seen: MutArc<Vec<i32>> = MutArc::own(Vec::new());
    let sink = seen.clone();
    let handle = never::<i32, Infallible>().subscribe_with(
      crate::observer::ObserverFns::new(
        move |v| sink.rc_deref_mut().push(v),
        |_: Infallible| {},
        || {},
      ),
      Some(vt.handle()),
    );
    vt.start();
    assert!(seen.rc_deref().is_empty());
    assert!(!handle.is_disposed());
    handle.dispose();
    assert!(handle.is_disposed());
  }

  #[test]
  fn from_iter_replays_in_order() {
    let seen = MutArc::own(Vec::new());
    let sink = seen.clone();
    from_iter::<_, Infallible>(vec![1, 2, 3]).subscribe(move |v| sink.rc_deref_mut().push(v));
    assert_eq!(*seen.rc_deref(), vec![1, 2, 3]);
  }

  #[test]
  fn from_iter_is_stack_safe_for_long_inputs() {
    let count = MutArc::own(0u32);
    let sink = count.clone();
    from_iter::<_, Infallible>(0..100_000u32).subscribe(move |_| *sink.rc_deref_mut() += 1);
    assert_eq!(*count.rc_deref(), 100_000);
  }
}
