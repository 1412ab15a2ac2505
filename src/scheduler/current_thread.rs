//! The per-thread trampoline.
//!
//! The first `schedule` call on a thread becomes the dispatch loop: it runs
//! its own action and then keeps draining the thread's queue until it is
//! empty. A `schedule` call made while the loop is running (the recursive
//! case) only enqueues and returns, so a chain of "run one step, schedule
//! the next" of any length executes iteratively instead of growing the call
//! stack.

use std::{
  cell::{Cell, RefCell},
  cmp::Ordering,
  collections::BinaryHeap,
  sync::Arc,
  thread,
};

use super::{clock_now, ArcScheduler, Duration, ScheduleAction, Scheduler};
use crate::disposable::{BooleanDisposable, BoxDisposable, Disposable};

struct Entry {
  due: Duration,
  seq: u64,
  action: ScheduleAction,
  cancel: BooleanDisposable,
}

impl PartialEq for Entry {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Entry {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earliest due time first, enqueue order as the tie-break.
    other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
  }
}

thread_local! {
  static QUEUE: RefCell<BinaryHeap<Entry>> = RefCell::new(BinaryHeap::new());
  static DRAINING: Cell<bool> = const { Cell::new(false) };
  static NEXT_SEQ: Cell<u64> = const { Cell::new(0) };
}

#[derive(Clone, Copy, Default)]
pub struct CurrentThreadScheduler;

impl CurrentThreadScheduler {
  fn drain(this: &ArcScheduler) {
    loop {
      let entry = QUEUE.with(|q| q.borrow_mut().pop());
      let Some(entry) = entry else { break };
      if entry.cancel.is_disposed() {
        continue;
      }
      let now = clock_now();
      if entry.due > now {
        thread::sleep(entry.due - now);
      }
      (entry.action)(this);
    }
  }
}

/// Resets the draining flag even when an action panics, so the trampoline
/// stays usable on this thread afterwards.
struct DrainGuard;

impl Drop for DrainGuard {
  fn drop(&mut self) { DRAINING.with(|d| d.set(false)); }
}

impl Scheduler for CurrentThreadScheduler {
  fn now(&self) -> Duration { clock_now() }

  fn schedule_relative(self: Arc<Self>, delay: Duration, action: ScheduleAction) -> BoxDisposable {
    let cancel = BooleanDisposable::new();
    let seq = NEXT_SEQ.with(|s| {
      let seq = s.get();
      s.set(seq + 1);
      seq
    });
    QUEUE.with(|q| {
      q.borrow_mut().push(Entry {
        due: clock_now() + delay,
        seq,
        action,
        cancel: cancel.clone(),
      })
    });

    if !DRAINING.with(|d| d.replace(true)) {
      let _guard = DrainGuard;
      let this: ArcScheduler = self;
      Self::drain(&this);
    }
    Box::new(cancel)
  }
}
