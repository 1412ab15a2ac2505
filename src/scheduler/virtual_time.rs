//! Virtual time: a clock that advances only under test control.
//!
//! Scheduling never runs anything; actions fire when the clock is advanced
//! past their due time, in non-decreasing due-time order with enqueue order
//! as the tie-break. Actions run with the queue lock released, so they are
//! free to schedule follow-up work, including work due at the very tick
//! being processed.

use std::{cmp::Ordering, collections::BinaryHeap, mem, sync::Arc};

use super::{ArcScheduler, Duration, ScheduleAction, Scheduler};
use crate::{
  disposable::{BooleanDisposable, BoxDisposable, Disposable, NopDisposable},
  rc::MutArc,
};

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
    other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
  }
}

#[derive(Default)]
struct Core {
  clock: Duration,
  next_seq: u64,
  shut_down: bool,
  queue: BinaryHeap<Entry>,
}

#[derive(Clone, Default)]
pub struct VirtualTimeScheduler(MutArc<Core>);

impl VirtualTimeScheduler {
  pub fn new() -> Self { Self::default() }

  /// A shareable handle onto the same virtual clock and queue.
  pub fn handle(&self) -> ArcScheduler { Arc::new(self.clone()) }

  pub fn now(&self) -> Duration { self.0.rc_deref().clock }

  pub fn pending_count(&self) -> usize { self.0.rc_deref().queue.len() }

  /// Advance the clock to `due`, running every action due on the way in
  /// timestamp order.
  pub fn advance_to(&self, due: Duration) {
    self.run_until(Some(due));
    let mut core = self.0.rc_deref_mut();
    core.clock = core.clock.max(due);
  }

  pub fn advance_by(&self, step: Duration) {
    let due = self.now() + step;
    self.advance_to(due);
  }

  /// Run the queue to exhaustion, advancing the clock to each action's due
  /// time.
  pub fn start(&self) { self.run_until(None); }

  /// Shut the scheduler down: cancel everything still queued and refuse new
  /// work. Operators observe this exactly as a subscriber-initiated
  /// disposal; pending steps simply never fire.
  pub fn shutdown(&self) {
    let drained = {
      let mut core = self.0.rc_deref_mut();
      core.shut_down = true;
      mem::take(&mut core.queue)
    };
    for entry in drained {
      entry.cancel.dispose();
    }
  }

  fn run_until(&self, limit: Option<Duration>) {
    let this: ArcScheduler = self.handle();
    loop {
      let entry = {
        let mut core = self.0.rc_deref_mut();
        let due_now = core
          .queue
          .peek()
          .is_some_and(|peek| limit.is_none_or(|limit| peek.due <= limit));
        if !due_now {
          break;
        }
        let entry = core.queue.pop().unwrap();
        core.clock = core.clock.max(entry.due);
        entry
      };
      if entry.cancel.is_disposed() {
        continue;
      }
      (entry.action)(&this);
    }
  }
}

impl Scheduler for VirtualTimeScheduler {
  fn now(&self) -> Duration { VirtualTimeScheduler::now(self) }

  fn schedule(self: Arc<Self>, action: ScheduleAction) -> BoxDisposable {
    let due = VirtualTimeScheduler::now(&self);
    self.schedule_absolute(due, action)
  }

  fn schedule_relative(self: Arc<Self>, delay: Duration, action: ScheduleAction) -> BoxDisposable {
    let due = VirtualTimeScheduler::now(&self) + delay;
    self.schedule_absolute(due, action)
  }

  fn schedule_absolute(self: Arc<Self>, due: Duration, action: ScheduleAction) -> BoxDisposable {
    let mut core = self.0.rc_deref_mut();
    if core.shut_down {
      return Box::new(NopDisposable);
    }
    let cancel = BooleanDisposable::new();
    let seq = core.next_seq;
    core.next_seq += 1;
    core.queue.push(Entry { due, seq, action, cancel: cancel.clone() });
    Box::new(cancel)
  }
}
