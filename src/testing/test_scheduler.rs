use crate::{
  observer::Observer,
  rc::MutArc,
  scheduler::{ArcScheduler, Duration, VirtualTimeScheduler},
  testing::{ColdObservable, Notification, Recorded},
};

/// Front door of the harness: one virtual clock shared by the scripted
/// sources, the observers and the subscription under test.
#[derive(Clone, Default)]
pub struct TestScheduler {
  clock: VirtualTimeScheduler,
}

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// The scheduler to hand to `subscribe_with` so the composition under
  /// test runs entirely on virtual time.
  pub fn handle(&self) -> ArcScheduler { self.clock.handle() }

  pub fn now(&self) -> Duration { self.clock.now() }

  /// Advance the virtual clock to `tick` milliseconds.
  pub fn advance_to(&self, tick: u64) {
    self.clock.advance_to(Duration::from_millis(tick));
  }

  /// Advance the virtual clock by `ticks` milliseconds.
  pub fn advance_by(&self, ticks: u64) {
    self.clock.advance_by(Duration::from_millis(ticks));
  }

  /// Run every queued action, advancing the clock to each one's due time.
  pub fn start(&self) { self.clock.start(); }

  /// A scripted cold source on this scheduler's clock.
  pub fn create_cold<Item, Err>(
    &self,
    records: Vec<Recorded<Item, Err>>,
  ) -> ColdObservable<Item, Err> {
    ColdObservable::new(self.clock.clone(), records)
  }

  /// An observer that timestamps everything it receives with this
  /// scheduler's clock.
  pub fn create_observer<Item, Err>(&self) -> TestObserver<Item, Err> {
    TestObserver { clock: self.clock.clone(), messages: MutArc::own(Vec::new()) }
  }
}

/// Records each notification with the virtual time it arrived at. Clones of
/// one observer share the same message log, so a test can keep one clone for
/// assertions while another is consumed by the subscription.
pub struct TestObserver<Item, Err> {
  clock: VirtualTimeScheduler,
  messages: MutArc<Vec<Recorded<Item, Err>>>,
}

impl<Item, Err> Clone for TestObserver<Item, Err> {
  fn clone(&self) -> Self {
    Self { clock: self.clock.clone(), messages: self.messages.clone() }
  }
}

impl<Item, Err> TestObserver<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  pub fn messages(&self) -> Vec<Recorded<Item, Err>> {
    self.messages.rc_deref().clone()
  }
}

impl<Item, Err> Observer<Item, Err> for TestObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    let time = self.clock.now();
    self.messages.rc_deref_mut().push(Recorded::new(time, Notification::Next(value)));
  }

  fn error(self, err: Err) {
    let time = self.clock.now();
    self.messages.rc_deref_mut().push(Recorded::new(time, Notification::Error(err)));
  }

  fn complete(self) {
    let time = self.clock.now();
    self.messages.rc_deref_mut().push(Recorded::new(time, Notification::Complete));
  }

  fn is_closed(&self) -> bool {
    self.messages.rc_deref().last().is_some_and(|last| last.value.is_terminal())
  }
}
