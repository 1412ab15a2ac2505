//! Shared-ownership cell used across subscriptions.
//!
//! Subscription state (observers, teardown lists, cursors) is owned jointly
//! by the subscriber's disposable and by the scheduled-action closures. The
//! core must stay correct when a pluggable multi-threaded scheduler runs
//! those closures, so the cell is an `Arc<Mutex<_>>` under the hood.

use std::sync::{Arc, Mutex, MutexGuard};

pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  /// Locking only ever fails when a user callback panicked while the lock
  /// was held; propagating that panic is the right outcome.
  #[inline]
  pub fn rc_deref(&self) -> MutexGuard<'_, T> { self.0.lock().unwrap() }

  #[inline]
  pub fn rc_deref_mut(&self) -> MutexGuard<'_, T> { self.0.lock().unwrap() }

  /// Non-blocking variant of [`rc_deref_mut`](Self::rc_deref_mut): `None`
  /// when the cell is locked, including by the calling thread itself.
  #[inline]
  pub fn rc_try_deref_mut(&self) -> Option<MutexGuard<'_, T>> { self.0.try_lock().ok() }

  pub fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: Default> Default for MutArc<T> {
  fn default() -> Self { Self::own(T::default()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shares_one_value() {
    let a = MutArc::own(0);
    let b = a.clone();
    *b.rc_deref_mut() += 5;
    assert_eq!(*a.rc_deref(), 5);
    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&MutArc::own(0)));
  }
}
