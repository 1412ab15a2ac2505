//! Sequential concatenation.
//!
//! `concat` subscribes to one source at a time: all elements of the first,
//! in order, then on its completion the next source, until the cursor is
//! exhausted and the output completes. An error from any source,
//! or from the cursor itself, terminates the whole composition and no
//! further source is touched.
//!
//! Each step is *scheduled*, never called recursively: a source's
//! completion re-enters through the scheduler, so unbounded source
//! sequences stay stack-safe on the current-thread trampoline.

use std::sync::Arc;

use crate::{
  disposable::{
    BooleanDisposable, BoxDisposable, CompositeDisposable, Disposable, SerialDisposable,
    SingleAssignmentDisposable,
  },
  observable::{BoxObservable, Observable},
  observer::{BoxObserver, Observer, SharedObserver},
  rc::MutArc,
  scheduler::{default_scheduler, ArcScheduler, ScheduleAction},
};

/// The lazy, single-pass cursor over the source sequence. Exhaustion
/// (`None`) and sequence failure (`Some(Err(_))`) are ordinary outcomes of
/// pulling the next source, not exceptional control flow.
pub type ConcatSources<Item, Err> =
  Box<dyn Iterator<Item = Result<BoxObservable<Item, Err>, Err>> + Send>;

pub struct ConcatOp<Item, Err> {
  cursor: MutArc<ConcatSources<Item, Err>>,
}

/// Concatenate an ordered sequence of like-typed sources. Heterogeneous
/// mixes can be erased with [`Observable::box_it`] first. The sequence may
/// be unbounded; it is only pulled one source at a time.
pub fn concat<I>(
  sources: I,
) -> ConcatOp<<I::Item as Observable>::Item, <I::Item as Observable>::Err>
where
  I: IntoIterator,
  I::IntoIter: Send + 'static,
  I::Item: Observable + Send + Sync + 'static,
  <I::Item as Observable>::Item: 'static,
  <I::Item as Observable>::Err: 'static,
{
  let cursor: ConcatSources<_, _> =
    Box::new(sources.into_iter().map(|source| Ok(source.box_it())));
  ConcatOp { cursor: MutArc::own(cursor) }
}

/// Like [`concat`], for cursors that can themselves fail while producing
/// the next source: the first `Err` item is forwarded to the output
/// observer and iteration stops.
pub fn concat_fallible<I, S>(sources: I) -> ConcatOp<S::Item, S::Err>
where
  I: IntoIterator<Item = Result<S, S::Err>>,
  I::IntoIter: Send + 'static,
  S: Observable + Send + Sync + 'static,
  S::Item: 'static,
  S::Err: 'static,
{
  let cursor: ConcatSources<_, _> =
    Box::new(sources.into_iter().map(|result| result.map(Observable::box_it)));
  ConcatOp { cursor: MutArc::own(cursor) }
}

struct ConcatState<Item, Err> {
  cursor: MutArc<ConcatSources<Item, Err>>,
  observer: SharedObserver<BoxObserver<Item, Err>>,
  /// The currently active inner subscription; replacing it tears the
  /// previous source down.
  active: SerialDisposable,
  /// The pending scheduled step, so disposal can cancel a step that has
  /// not fired yet.
  pending: SerialDisposable,
  stopped: BooleanDisposable,
}

fn step<Item, Err>(state: Arc<ConcatState<Item, Err>>) -> ScheduleAction
where
  Item: 'static,
  Err: 'static,
{
  Box::new(move |scheduler: &ArcScheduler| {
    if state.stopped.is_disposed() {
      return;
    }
    let pulled = state.cursor.rc_deref_mut().next();
    match pulled {
      None => state.observer.clone().complete(),
      Some(Err(err)) => state.observer.clone().error(err),
      Some(Ok(source)) => {
        let inner = SingleAssignmentDisposable::new();
        state.active.set(Box::new(inner.clone()));
        let relay = ConcatRelay { state: state.clone(), scheduler: scheduler.clone() };
        inner.set(source.subscribe_core(Box::new(relay), Some(scheduler.clone())));
      }
    }
  })
}

/// Forwards a source's values and error to the output; completion instead
/// schedules the step that moves on to the next source.
struct ConcatRelay<Item, Err> {
  state: Arc<ConcatState<Item, Err>>,
  scheduler: ArcScheduler,
}

impl<Item, Err> Observer<Item, Err> for ConcatRelay<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  fn next(&mut self, value: Item) { self.state.observer.clone().next(value); }

  fn error(self, err: Err) { self.state.observer.clone().error(err); }

  fn complete(self) {
    let next = step(self.state.clone());
    self.state.pending.set(self.scheduler.schedule(next));
  }

  fn is_closed(&self) -> bool {
    self.state.stopped.is_disposed() || self.state.observer.is_closed()
  }
}

impl<Item, Err> Observable for ConcatOp<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  type Item = Item;
  type Err = Err;

  fn subscribe_core(
    &self,
    observer: BoxObserver<Item, Err>,
    scheduler: Option<ArcScheduler>,
  ) -> BoxDisposable {
    let scheduler = scheduler.unwrap_or_else(default_scheduler);
    let state = Arc::new(ConcatState {
      cursor: self.cursor.clone(),
      observer: SharedObserver::new(observer),
      active: SerialDisposable::new(),
      pending: SerialDisposable::new(),
      stopped: BooleanDisposable::new(),
    });

    state.pending.set(scheduler.schedule(step(state.clone())));

    let parts = CompositeDisposable::new();
    parts.add(state.active.clone());
    parts.add(state.pending.clone());
    parts.add(state.stopped.clone());
    Box::new(parts)
  }
}
