use crate::{observer::Observer, scheduler::Duration};

/// One materialized observer callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

impl<Item, Err> Notification<Item, Err> {
  pub fn is_terminal(&self) -> bool {
    !matches!(self, Notification::Next(_))
  }
}

impl<Item, Err> Notification<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  /// Replays this notification into `observer`. Terminal notifications
  /// consume the observer; `Next` leaves it usable for the rest of the
  /// script.
  pub fn accept<O>(&self, mut observer: O)
  where
    O: Observer<Item, Err>,
  {
    match self {
      Notification::Next(value) => observer.next(value.clone()),
      Notification::Error(err) => observer.error(err.clone()),
      Notification::Complete => observer.complete(),
    }
  }
}

/// A notification stamped with the virtual time it occurred at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recorded<Item, Err> {
  pub time: Duration,
  pub value: Notification<Item, Err>,
}

impl<Item, Err> Recorded<Item, Err> {
  pub fn new(time: Duration, value: Notification<Item, Err>) -> Self {
    Self { time, value }
  }
}

/// `Next(value)` at `tick` milliseconds of virtual time.
pub fn next<Item, Err>(tick: u64, value: Item) -> Recorded<Item, Err> {
  Recorded::new(Duration::from_millis(tick), Notification::Next(value))
}

/// `Error(err)` at `tick` milliseconds of virtual time.
pub fn error<Item, Err>(tick: u64, err: Err) -> Recorded<Item, Err> {
  Recorded::new(Duration::from_millis(tick), Notification::Error(err))
}

/// `Complete` at `tick` milliseconds of virtual time.
pub fn complete<Item, Err>(tick: u64) -> Recorded<Item, Err> {
  Recorded::new(Duration::from_millis(tick), Notification::Complete)
}
