//! Build an observable straight from a subscription closure.
//!
//! This is the substrate of the operator-construction protocol: an operator
//! is a factory whose subscription closure wires source subscriptions to the
//! output observer and composes its teardown into one disposable.

use std::marker::PhantomData;

use crate::{
  disposable::BoxDisposable,
  observable::Observable,
  observer::BoxObserver,
  scheduler::ArcScheduler,
};

pub struct AnonymousObservable<F, Item, Err> {
  subscribe: F,
  // fn pointer keeps the phantom Send + Sync regardless of Item/Err.
  _hint: PhantomData<fn() -> (Item, Err)>,
}

/// Create an observable from the function run on every subscription.
pub fn create<F, Item, Err>(subscribe: F) -> AnonymousObservable<F, Item, Err>
where
  F: Fn(BoxObserver<Item, Err>, Option<ArcScheduler>) -> BoxDisposable,
{
  AnonymousObservable { subscribe, _hint: PhantomData }
}

impl<F, Item, Err> Observable for AnonymousObservable<F, Item, Err>
where
  F: Fn(BoxObserver<Item, Err>, Option<ArcScheduler>) -> BoxDisposable,
{
  type Item = Item;
  type Err = Err;

  fn subscribe_core(
    &self,
    observer: BoxObserver<Item, Err>,
    scheduler: Option<ArcScheduler>,
  ) -> BoxDisposable {
    (self.subscribe)(observer, scheduler)
  }
}
