//! Schedulers decouple *when and where* work runs from the operators that
//! need to run it.
//!
//! An action is a one-shot closure that receives the scheduler handle it was
//! scheduled on, so it can reschedule follow-up work. This is the
//! continuation-passing style every operator with unbounded recursion (such
//! as `concat`) relies on. Every `schedule` call returns a [`Disposable`]
//! that cancels the action if it has not run yet; cancellation of an action
//! that already started only suppresses further rescheduling, it never
//! interrupts running code.
//!
//! Time is a [`Duration`] offset from the scheduler's epoch: process start
//! for the wall-clock schedulers, tick zero for virtual time.

use std::{sync::Arc, time::Instant};

pub use std::time::Duration;

use once_cell::sync::Lazy;

use crate::disposable::BoxDisposable;

mod current_thread;
mod immediate;
mod virtual_time;
pub use current_thread::CurrentThreadScheduler;
pub use immediate::ImmediateScheduler;
pub use virtual_time::VirtualTimeScheduler;

pub type ArcScheduler = Arc<dyn Scheduler + Send + Sync>;

/// A unit of schedulable work.
pub type ScheduleAction = Box<dyn FnOnce(&ArcScheduler) + Send>;

pub trait Scheduler {
  /// The scheduler's notion of the current time.
  fn now(&self) -> Duration;

  /// Run `action` as soon as this scheduler's discipline allows.
  fn schedule(self: Arc<Self>, action: ScheduleAction) -> BoxDisposable {
    self.schedule_relative(Duration::ZERO, action)
  }

  /// Run `action` after `delay` has elapsed on this scheduler's clock.
  fn schedule_relative(self: Arc<Self>, delay: Duration, action: ScheduleAction) -> BoxDisposable;

  /// Run `action` once the clock reaches `due`. A `due` already in the past
  /// schedules the action immediately.
  fn schedule_absolute(self: Arc<Self>, due: Duration, action: ScheduleAction) -> BoxDisposable {
    let delay = due.saturating_sub(self.now());
    self.schedule_relative(delay, action)
  }
}

/// Epoch shared by the wall-clock schedulers, fixed at first use.
static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

pub(crate) fn clock_now() -> Duration { EPOCH.elapsed() }

static DEFAULT_SCHEDULER: Lazy<ArcScheduler> =
  Lazy::new(|| Arc::new(CurrentThreadScheduler::default()));

/// The scheduler substituted when `subscribe` is called without one: the
/// current-thread trampoline.
pub fn default_scheduler() -> ArcScheduler { DEFAULT_SCHEDULER.clone() }
