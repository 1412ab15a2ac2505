pub use crate::disposable::{
  ActionDisposable, BooleanDisposable, BoxDisposable, CompositeDisposable, Disposable,
  NopDisposable, SerialDisposable, SingleAssignmentDisposable,
};
pub use crate::observable::{
  self, create, empty, from_iter, never, of, throw, BoxObservable, Observable,
};
pub use crate::observer::{BoxObserver, DynObserver, Observer, ObserverFns, SharedObserver};
pub use crate::ops::{self, concat, concat_fallible};
pub use crate::rc::MutArc;
pub use crate::scheduler::{
  default_scheduler, ArcScheduler, CurrentThreadScheduler, Duration, ImmediateScheduler,
  ScheduleAction, Scheduler, VirtualTimeScheduler,
};
