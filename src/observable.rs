//! The Observable side of the push contract.
//!
//! An observable is an immutable description of how to produce a sequence;
//! every subscription is an independent run of that description. The sole
//! core operation is [`Observable::subscribe_core`]: bind an observer to the
//! producer under an optional scheduler and get back the disposable that
//! tears the run down.
//!
//! Each subscription moves through `Subscribed → {Completed, Errored,
//! Disposed}`; the terminal states are mutually exclusive and entered at
//! most once, which [`Observable::subscribe_with`] enforces with a shared
//! observer gate.

use crate::{
  disposable::{ActionDisposable, BoxDisposable, CompositeDisposable},
  observer::{BoxObserver, Observer, ObserverFns, SharedObserver},
  scheduler::ArcScheduler,
};

mod create;
mod from;
pub use create::{create, AnonymousObservable};
pub use from::{empty, from_iter, never, of, throw};

pub trait Observable {
  type Item;
  type Err;

  /// Run this observable's subscription logic for one observer.
  ///
  /// Implementations deliver notifications straight to `observer`; callers
  /// that need the terminal-once/detach guarantee go through
  /// [`subscribe_with`](Observable::subscribe_with), which is how operators
  /// and user code normally subscribe.
  fn subscribe_core(
    &self,
    observer: BoxObserver<Self::Item, Self::Err>,
    scheduler: Option<ArcScheduler>,
  ) -> BoxDisposable;

  /// Subscribe `observer`, routing it through a shared gate so that no
  /// notification is delivered after the first terminal one nor after the
  /// returned disposable fires.
  fn subscribe_with<O>(&self, observer: O, scheduler: Option<ArcScheduler>) -> BoxDisposable
  where
    Self: Sized,
    Self::Item: 'static,
    Self::Err: 'static,
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let gate = SharedObserver::new(observer);
    let detach = gate.clone();
    let inner = self.subscribe_core(Box::new(gate), scheduler);
    let parts = CompositeDisposable::new();
    parts.add(inner);
    parts.add(ActionDisposable::new(move || detach.close()));
    Box::new(parts)
  }

  /// Subscribe with a value callback only; errors and completion are
  /// ignored.
  fn subscribe(&self, next: impl FnMut(Self::Item) + Send + 'static) -> BoxDisposable
  where
    Self: Sized,
    Self::Item: 'static,
    Self::Err: 'static,
  {
    self.subscribe_with(ObserverFns::new(next, drop_err, || {}), None)
  }

  /// Subscribe with the full callback set.
  fn subscribe_all(
    &self,
    next: impl FnMut(Self::Item) + Send + 'static,
    error: impl FnOnce(Self::Err) + Send + 'static,
    complete: impl FnOnce() + Send + 'static,
  ) -> BoxDisposable
  where
    Self: Sized,
    Self::Item: 'static,
    Self::Err: 'static,
  {
    self.subscribe_with(ObserverFns::new(next, error, complete), None)
  }

  /// Erase the concrete observable type, e.g. to build heterogeneous source
  /// lists for `concat`.
  fn box_it(self) -> BoxObservable<Self::Item, Self::Err>
  where
    Self: Sized + Send + Sync + 'static,
  {
    Box::new(self)
  }
}

fn drop_err<Err>(_: Err) {}

/// A type-erased observable.
pub type BoxObservable<Item, Err> = Box<dyn Observable<Item = Item, Err = Err> + Send + Sync>;

impl<T: Observable + ?Sized> Observable for Box<T> {
  type Item = T::Item;
  type Err = T::Err;

  #[inline]
  fn subscribe_core(
    &self,
    observer: BoxObserver<Self::Item, Self::Err>,
    scheduler: Option<ArcScheduler>,
  ) -> BoxDisposable {
    (**self).subscribe_core(observer, scheduler)
  }
}
