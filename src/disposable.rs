//! Disposables: the capability to release a resource or cancel pending work
//! exactly once.
//!
//! `dispose` is idempotent for every variant, and the container variants
//! stay correct when `set`/`add` races with `dispose` from another thread:
//! whichever call loses the race still sees the inner disposable released
//! exactly once. Inner disposals always run with the container lock
//! released, so re-entrant teardown cannot deadlock.

use std::{
  mem,
  panic::{catch_unwind, AssertUnwindSafe},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
  },
};

use smallvec::SmallVec;

pub trait Disposable {
  /// Release the resource. Calling this more than once has no further
  /// effect.
  fn dispose(&self);

  fn is_disposed(&self) -> bool;
}

pub type BoxDisposable = Box<dyn Disposable + Send>;

impl<T: Disposable + ?Sized> Disposable for Box<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

/// A disposable with nothing to release.
#[derive(Clone, Copy, Default)]
pub struct NopDisposable;

impl Disposable for NopDisposable {
  fn dispose(&self) {}

  fn is_disposed(&self) -> bool { true }
}

/// Runs a teardown closure on the first `dispose`.
#[derive(Clone)]
pub struct ActionDisposable(Arc<Mutex<Option<Box<dyn FnOnce() + Send>>>>);

impl ActionDisposable {
  pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
    Self(Arc::new(Mutex::new(Some(Box::new(teardown)))))
  }
}

impl Disposable for ActionDisposable {
  fn dispose(&self) {
    let teardown = self.0.lock().unwrap().take();
    if let Some(teardown) = teardown {
      teardown();
    }
  }

  fn is_disposed(&self) -> bool { self.0.lock().unwrap().is_none() }
}

/// A shared cancellation flag. Scheduled work checks the flag before it
/// runs; operators use it as the per-subscription "stop" bit.
#[derive(Clone, Default)]
pub struct BooleanDisposable(Arc<AtomicBool>);

impl BooleanDisposable {
  pub fn new() -> Self { Self::default() }
}

impl Disposable for BooleanDisposable {
  fn dispose(&self) { self.0.store(true, Ordering::SeqCst); }

  fn is_disposed(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

struct SingleInner {
  disposed: bool,
  assigned: bool,
  current: Option<BoxDisposable>,
}

/// Holds at most one inner disposable, assigned exactly once.
///
/// Disposing before assignment disposes the eventual assignee the moment it
/// arrives; disposing after assignment disposes the inner one. Assigning
/// twice is a programming error and panics.
#[derive(Clone)]
pub struct SingleAssignmentDisposable(Arc<Mutex<SingleInner>>);

impl SingleAssignmentDisposable {
  pub fn new() -> Self {
    Self(Arc::new(Mutex::new(SingleInner {
      disposed: false,
      assigned: false,
      current: None,
    })))
  }

  pub fn set(&self, disposable: BoxDisposable) {
    let mut inner = self.0.lock().unwrap();
    assert!(!inner.assigned, "single-assignment disposable assigned twice");
    inner.assigned = true;
    if inner.disposed {
      drop(inner);
      disposable.dispose();
      return;
    }
    inner.current = Some(disposable);
  }
}

impl Default for SingleAssignmentDisposable {
  fn default() -> Self { Self::new() }
}

impl Disposable for SingleAssignmentDisposable {
  fn dispose(&self) {
    let current = {
      let mut inner = self.0.lock().unwrap();
      if inner.disposed {
        return;
      }
      inner.disposed = true;
      inner.current.take()
    };
    if let Some(current) = current {
      current.dispose();
    }
  }

  fn is_disposed(&self) -> bool { self.0.lock().unwrap().disposed }
}

struct SerialInner {
  disposed: bool,
  current: Option<BoxDisposable>,
}

/// Like [`SingleAssignmentDisposable`] but reassignable: installing a new
/// inner disposable disposes the previous one. Once the serial itself is
/// disposed, every later assignment is disposed on arrival instead of
/// installed.
#[derive(Clone)]
pub struct SerialDisposable(Arc<Mutex<SerialInner>>);

impl SerialDisposable {
  pub fn new() -> Self {
    Self(Arc::new(Mutex::new(SerialInner { disposed: false, current: None })))
  }

  pub fn set(&self, disposable: BoxDisposable) {
    let mut inner = self.0.lock().unwrap();
    if inner.disposed {
      drop(inner);
      disposable.dispose();
      return;
    }
    let previous = inner.current.replace(disposable);
    drop(inner);
    if let Some(previous) = previous {
      previous.dispose();
    }
  }
}

impl Default for SerialDisposable {
  fn default() -> Self { Self::new() }
}

impl Disposable for SerialDisposable {
  fn dispose(&self) {
    let current = {
      let mut inner = self.0.lock().unwrap();
      if inner.disposed {
        return;
      }
      inner.disposed = true;
      inner.current.take()
    };
    if let Some(current) = current {
      current.dispose();
    }
  }

  fn is_disposed(&self) -> bool { self.0.lock().unwrap().disposed }
}

struct CompositeInner {
  disposed: bool,
  parts: SmallVec<[BoxDisposable; 2]>,
}

/// Owns a group of disposables that are released together. Additions after
/// the composite is disposed are disposed immediately instead of stored.
#[derive(Clone)]
pub struct CompositeDisposable(Arc<Mutex<CompositeInner>>);

impl CompositeDisposable {
  pub fn new() -> Self {
    Self(Arc::new(Mutex::new(CompositeInner {
      disposed: false,
      parts: SmallVec::new(),
    })))
  }

  pub fn add(&self, disposable: impl Disposable + Send + 'static) {
    let mut inner = self.0.lock().unwrap();
    if inner.disposed {
      drop(inner);
      disposable.dispose();
      return;
    }
    inner.parts.push(Box::new(disposable));
  }

  pub fn len(&self) -> usize { self.0.lock().unwrap().parts.len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Default for CompositeDisposable {
  fn default() -> Self { Self::new() }
}

impl Disposable for CompositeDisposable {
  fn dispose(&self) {
    let parts = {
      let mut inner = self.0.lock().unwrap();
      if inner.disposed {
        return;
      }
      inner.disposed = true;
      mem::take(&mut inner.parts)
    };
    for part in parts {
      // A faulting teardown must not keep the remaining resources alive.
      if catch_unwind(AssertUnwindSafe(|| part.dispose())).is_err() {
        log::error!("disposable panicked during dispose; releasing the remaining resources");
      }
    }
  }

  fn is_disposed(&self) -> bool { self.0.lock().unwrap().disposed }
}

#[cfg(test)]
mod tests {
  use std::{sync::atomic::AtomicUsize, thread};

  use super::*;

  fn counting(count: Arc<AtomicUsize>) -> ActionDisposable {
    ActionDisposable::new(move || {
      count.fetch_add(1, Ordering::SeqCst);
    })
  }

  #[test]
  fn dispose_is_idempotent() {
    let count = Arc::new(AtomicUsize::new(0));
    let d = counting(count.clone());
    assert!(!d.is_disposed());
    d.dispose();
    d.dispose();
    d.dispose();
    assert!(d.is_disposed());
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn dispose_is_idempotent_across_threads() {
    let count = Arc::new(AtomicUsize::new(0));
    let d = counting(count.clone());
    let handles: Vec<_> = (0..8)
      .map(|_| {
        let d = d.clone();
        thread::spawn(move || d.dispose())
      })
      .collect();
    for h in handles {
      h.join().unwrap();
    }
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn single_assignment_disposes_after_set() {
    let count = Arc::new(AtomicUsize::new(0));
    let sad = SingleAssignmentDisposable::new();
    sad.set(Box::new(counting(count.clone())));
    assert_eq!(count.load(Ordering::SeqCst), 0);
    sad.dispose();
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn single_assignment_disposes_late_assignee() {
    let count = Arc::new(AtomicUsize::new(0));
    let sad = SingleAssignmentDisposable::new();
    sad.dispose();
    sad.set(Box::new(counting(count.clone())));
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[test]
  #[should_panic(expected = "assigned twice")]
  fn single_assignment_panics_on_double_set() {
    let sad = SingleAssignmentDisposable::new();
    sad.set(Box::new(NopDisposable));
    sad.set(Box::new(NopDisposable));
  }

  #[test]
  fn serial_disposes_previous_on_set() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let serial = SerialDisposable::new();
    serial.set(Box::new(counting(first.clone())));
    serial.set(Box::new(counting(second.clone())));
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
    serial.dispose();
    assert_eq!(second.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn serial_disposes_assignment_after_dispose() {
    let count = Arc::new(AtomicUsize::new(0));
    let serial = SerialDisposable::new();
    serial.dispose();
    serial.set(Box::new(counting(count.clone())));
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn serial_races_set_against_dispose() {
    // Whatever the interleaving, every inner disposable ends up disposed
    // exactly once.
    for _ in 0..64 {
      let count = Arc::new(AtomicUsize::new(0));
      let serial = SerialDisposable::new();
      let setter = {
        let serial = serial.clone();
        let count = count.clone();
        thread::spawn(move || serial.set(Box::new(counting(count))))
      };
      let disposer = {
        let serial = serial.clone();
        thread::spawn(move || serial.dispose())
      };
      setter.join().unwrap();
      disposer.join().unwrap();
      assert_eq!(count.load(Ordering::SeqCst), 1);
    }
  }

  #[test]
  fn composite_disposes_every_part_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let parts = CompositeDisposable::new();
    for _ in 0..3 {
      parts.add(counting(count.clone()));
    }
    assert_eq!(parts.len(), 3);
    parts.dispose();
    parts.dispose();
    assert_eq!(count.load(Ordering::SeqCst), 3);
    assert!(parts.is_empty());
  }

  #[test]
  fn composite_disposes_additions_after_dispose() {
    let count = Arc::new(AtomicUsize::new(0));
    let parts = CompositeDisposable::new();
    parts.dispose();
    parts.add(counting(count.clone()));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(parts.is_empty());
  }

  #[test]
  fn composite_survives_a_faulting_teardown() {
    let count = Arc::new(AtomicUsize::new(0));
    let parts = CompositeDisposable::new();
    parts.add(counting(count.clone()));
    parts.add(ActionDisposable::new(|| panic!("teardown fault")));
    parts.add(counting(count.clone()));
    parts.dispose();
    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert!(parts.is_disposed());
  }

  #[test]
  fn boolean_flag_round_trip() {
    let flag = BooleanDisposable::new();
    let other_handle = flag.clone();
    assert!(!other_handle.is_disposed());
    flag.dispose();
    assert!(other_handle.is_disposed());
  }
}
