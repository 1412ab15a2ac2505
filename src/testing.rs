//! Deterministic testing of timing-dependent composition.
//!
//! The harness replays scripted, timestamped notifications on a
//! [`VirtualTimeScheduler`](crate::scheduler::VirtualTimeScheduler) and
//! records exactly when each subscriber was attached, so assertions about
//! ordering, cancellation windows and subscription lifetimes need no real
//! clocks or threads. Script and record times are integer ticks
//! (milliseconds of virtual time).

use crate::scheduler::Duration;

mod cold;
mod notification;
mod test_scheduler;
pub use cold::ColdObservable;
pub use notification::{complete, error, next, Notification, Recorded};
pub use test_scheduler::{TestObserver, TestScheduler};

/// The interval during which one subscriber was attached to a scripted
/// source; `unsubscribe` stays `None` while the subscription is live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription {
  pub subscribe: Duration,
  pub unsubscribe: Option<Duration>,
}

impl Subscription {
  /// A subscription opened at `start` ticks and not yet disposed.
  pub fn open(start: u64) -> Self {
    Self { subscribe: Duration::from_millis(start), unsubscribe: None }
  }

  /// A subscription opened at `start` ticks and disposed at `end` ticks.
  pub fn closed(start: u64, end: u64) -> Self {
    Self {
      subscribe: Duration::from_millis(start),
      unsubscribe: Some(Duration::from_millis(end)),
    }
  }
}
