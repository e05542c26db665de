#![forbid(unsafe_code)]

//! Change-observation primitives.
//!
//! - [`Observable`]: a shared, version-tracked value that delivers every
//!   mutation to its registered callbacks as a [`Change`].
//! - [`ObservationHandle`]: token for one registration; cancels on drop.
//! - [`Delivery`]: what happened during one notification pass.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Each delivery pass iterates a snapshot of the registry taken when the pass
//! starts, so callbacks may register, cancel, or mutate re-entrantly.
//!
//! # Invariants
//!
//! 1. Callbacks are notified in registration order.
//! 2. Every delivered mutation reaches every active callback exactly once.
//! 3. A cancelled callback receives nothing further, and cancelling twice is a
//!    no-op.
//! 4. Under [`NotifyPolicy::Always`] an equal-value `set` still notifies.

pub mod delivery;
pub mod observable;

pub use delivery::Delivery;
pub use observable::{Change, NotifyPolicy, Observable, ObservationHandle};
