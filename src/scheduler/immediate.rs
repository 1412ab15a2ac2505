//! Synchronous execution on the calling context.
//!
//! Recursive `schedule` calls made from inside an action run as direct
//! calls, so the call stack grows with them. Operators that recurse once per
//! element must use [`CurrentThreadScheduler`](super::CurrentThreadScheduler)
//! instead.

use std::{sync::Arc, thread};

use super::{clock_now, ArcScheduler, Duration, ScheduleAction, Scheduler};
use crate::disposable::{BoxDisposable, NopDisposable};

#[derive(Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn now(&self) -> Duration { clock_now() }

  fn schedule_relative(self: Arc<Self>, delay: Duration, action: ScheduleAction) -> BoxDisposable {
    if delay > Duration::ZERO {
      thread::sleep(delay);
    }
    let this: ArcScheduler = self;
    action(&this);
    // The action already ran to completion; there is nothing left to cancel.
    Box::new(NopDisposable)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use super::*;

  #[test]
  fn runs_synchronously() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    let scheduler: ArcScheduler = Arc::new(ImmediateScheduler);
    scheduler.schedule(Box::new(move |_| {
      c.fetch_add(1, Ordering::SeqCst);
    }));
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn recursive_schedule_runs_inline() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    let o = order.clone();
    let scheduler: ArcScheduler = Arc::new(ImmediateScheduler);
    scheduler.schedule(Box::new(move |scheduler| {
      o.lock().unwrap().push("outer");
      let o2 = o.clone();
      scheduler.clone().schedule(Box::new(move |_| {
        o2.lock().unwrap().push("inner");
      }));
      o.lock().unwrap().push("after");
    }));
    assert_eq!(*order.lock().unwrap(), vec!["outer", "inner", "after"]);
  }
}
