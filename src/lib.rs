//! A reactive-streams execution core: the observable/observer push
//! contract, composable cancellation through disposables, pluggable
//! schedulers with a stack-safe current-thread trampoline, sequential
//! composition via `concat`, and a virtual-time harness for deterministic
//! tests of timing-dependent behavior.
//!
//! ```
//! use std::convert::Infallible;
//! use rxcore::prelude::*;
//!
//! let seen = MutArc::own(Vec::new());
//! let sink = seen.clone();
//! concat(vec![
//!   from_iter::<_, Infallible>(vec![1, 2]),
//!   from_iter::<_, Infallible>(vec![3, 4]),
//! ])
//! .subscribe(move |v| sink.rc_deref_mut().push(v));
//! assert_eq!(*seen.rc_deref(), vec![1, 2, 3, 4]);
//! ```

pub mod disposable;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod testing;

pub use prelude::*;
