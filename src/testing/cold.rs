use crate::{
  disposable::{ActionDisposable, BoxDisposable, CompositeDisposable, Disposable},
  observable::Observable,
  observer::{BoxObserver, SharedObserver},
  rc::MutArc,
  scheduler::{ArcScheduler, VirtualTimeScheduler},
  testing::{Recorded, Subscription},
};

/// A scripted source that replays its records relative to each
/// subscription's start time, as a cold observable does: two subscribers at
/// different virtual times each get the full script on their own timeline.
///
/// Every subscription is logged in [`subscriptions`](Self::subscriptions),
/// including the virtual time it was disposed at, so tests can assert when
/// an operator attached to and detached from a source.
pub struct ColdObservable<Item, Err> {
  scheduler: VirtualTimeScheduler,
  records: Vec<Recorded<Item, Err>>,
  subscriptions: MutArc<Vec<Subscription>>,
}

impl<Item, Err> Clone for ColdObservable<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn clone(&self) -> Self {
    Self {
      scheduler: self.scheduler.clone(),
      records: self.records.clone(),
      subscriptions: self.subscriptions.clone(),
    }
  }
}

impl<Item, Err> ColdObservable<Item, Err> {
  pub fn new(scheduler: VirtualTimeScheduler, records: Vec<Recorded<Item, Err>>) -> Self {
    Self { scheduler, records, subscriptions: MutArc::own(Vec::new()) }
  }

  /// Every subscription interval seen so far, in subscription order.
  pub fn subscriptions(&self) -> Vec<Subscription> {
    self.subscriptions.rc_deref().clone()
  }
}

impl<Item, Err> Observable for ColdObservable<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  // The script replays on the cold source's own virtual clock; the
  // subscription-supplied scheduler is deliberately ignored.
  fn subscribe_core(
    &self,
    observer: BoxObserver<Item, Err>,
    _scheduler: Option<ArcScheduler>,
  ) -> BoxDisposable {
    let index = {
      let mut log = self.subscriptions.rc_deref_mut();
      log.push(Subscription { subscribe: self.scheduler.now(), unsubscribe: None });
      log.len() - 1
    };

    let gate = SharedObserver::new(observer);
    let pending = CompositeDisposable::new();
    for record in &self.records {
      let notification = record.value.clone();
      let gate = gate.clone();
      pending.add(self.scheduler.handle().schedule_relative(
        record.time,
        Box::new(move |_| notification.accept(gate.clone())),
      ));
    }

    let scheduler = self.scheduler.clone();
    let subscriptions = self.subscriptions.clone();
    Box::new(ActionDisposable::new(move || {
      subscriptions.rc_deref_mut()[index].unsubscribe = Some(scheduler.now());
      pending.dispose();
      gate.close();
    }))
  }
}
