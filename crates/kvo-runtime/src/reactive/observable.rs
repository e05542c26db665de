#![forbid(unsafe_code)]

//! Observable value with ordered old/new change callbacks and explicit
//! observation handles.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value of type `T` in shared, reference-counted
//! storage (`Rc<RefCell<..>>`). Every mutation builds a [`Change`] holding the
//! previous and the new value and hands it, synchronously and in registration
//! order, to every active callback before the mutating call returns.
//!
//! Registering a callback yields an [`ObservationHandle`]. Cancelling the
//! handle (explicitly, or by dropping it) takes the callback out of the
//! notification set immediately; the registry entry itself is pruned once no
//! delivery pass is running.
//!
//! # Performance
//!
//! | Operation     | Complexity                     |
//! |---------------|--------------------------------|
//! | `get()`       | O(1) + clone of `T`            |
//! | `set()`       | O(S) where S = observers       |
//! | `observe()`   | O(S) (prunes cancelled slots)  |
//! | `cancel()`    | O(S) outside delivery, O(1) during |
//!
//! # Failure Modes
//!
//! - **Panicking callback**: caught, logged at `error`, recorded in the
//!   returned [`Delivery`]; the remaining callbacks still run.
//! - **Mutation from inside `with` / `update` closures**: panics (RefCell
//!   borrow rules). Mutation from inside an observation callback is fine and
//!   runs a nested delivery pass.
//! - **Handle outliving the observable**: `cancel()` becomes a no-op and
//!   `is_active()` reports `false`.

use std::cell::{Cell, RefCell};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};

use tracing::{debug, error, trace};

use super::delivery::Delivery;
use crate::error::KvoError;

/// An old/new value pair handed to callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change<T> {
    /// Value immediately before the mutation.
    pub old: T,
    /// Value after the mutation.
    pub new: T,
}

/// Whether a mutation that leaves the value equal still notifies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotifyPolicy {
    /// Every mutation notifies, even `set(current)`.
    #[default]
    Always,
    /// Mutations that leave the value equal (by `PartialEq`) are no-ops.
    OnChange,
}

type Callback<T> = Rc<dyn Fn(&Change<T>)>;

struct Slot<T> {
    id: u64,
    /// Shared with the handle. Cleared on cancel.
    active: Rc<Cell<bool>>,
    callback: Callback<T>,
}

struct ObservableInner<T> {
    value: T,
    version: u64,
    policy: NotifyPolicy,
    next_id: u64,
    slots: Vec<Rc<Slot<T>>>,
    /// Number of delivery passes currently on the stack.
    depth: usize,
}

impl<T> ObservableInner<T> {
    fn prune(&mut self) {
        if self.depth == 0 {
            self.slots.retain(|slot| slot.active.get());
        }
    }
}

/// Type-erased back-reference from a handle to its registry.
trait Registry {
    fn prune(&self);
}

impl<T> Registry for RefCell<ObservableInner<T>> {
    fn prune(&self) {
        // A borrow is held while a `with`/`update` closure runs; the slot is
        // already inactive and gets pruned on the next pass.
        if let Ok(mut inner) = self.try_borrow_mut() {
            inner.prune();
        }
    }
}

/// A shared value whose mutations are delivered to registered callbacks.
///
/// Cloning an `Observable` creates a new handle to the **same** inner state:
/// both clones see the same value and share callbacks.
///
/// # Invariants
///
/// 1. Each delivered mutation bumps `version` by exactly 1.
/// 2. Every active callback receives exactly one [`Change`] per delivered
///    mutation, before the mutating call returns.
/// 3. Callbacks run in registration order.
/// 4. A cancelled callback is never invoked again, even if cancelled midway
///    through a delivery pass.
/// 5. The registry is never structurally modified while a pass iterates it.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("policy", &inner.policy)
            .field("slot_count", &inner.slots.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable that notifies on every mutation.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::with_policy(value, NotifyPolicy::Always)
    }

    /// Create an observable with an explicit [`NotifyPolicy`].
    #[must_use]
    pub fn with_policy(value: T, policy: NotifyPolicy) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                policy,
                next_id: 1,
                slots: Vec::new(),
                depth: 0,
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// The policy this observable was created with.
    #[must_use]
    pub fn policy(&self) -> NotifyPolicy {
        self.inner.borrow().policy
    }

    /// Replace the value and notify every active callback.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a [`with`](Self::with) or
    /// [`update`](Self::update) closure on the same observable.
    pub fn set(&self, value: T) -> Delivery {
        let change = {
            let mut inner = self.inner.borrow_mut();
            if inner.policy == NotifyPolicy::OnChange && inner.value == value {
                return Delivery::default();
            }
            let old = std::mem::replace(&mut inner.value, value);
            inner.version += 1;
            Change {
                old,
                new: inner.value.clone(),
            }
        };
        self.deliver(change)
    }

    /// Modify the value in place and notify every active callback.
    ///
    /// The `old` side of the [`Change`] is a clone taken before `f` runs.
    ///
    /// # Panics
    ///
    /// Panics if `f` mutates or reads this same observable.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> Delivery {
        let change = {
            let mut inner = self.inner.borrow_mut();
            let old = inner.value.clone();
            f(&mut inner.value);
            if inner.policy == NotifyPolicy::OnChange && inner.value == old {
                return Delivery::default();
            }
            inner.version += 1;
            Change {
                old,
                new: inner.value.clone(),
            }
        };
        self.deliver(change)
    }

    /// Register a callback for every subsequent mutation.
    ///
    /// The callback stays registered until the returned handle is cancelled
    /// or dropped. A callback registered while a delivery pass is running is
    /// not part of that pass.
    pub fn observe(&self, callback: impl Fn(&Change<T>) + 'static) -> ObservationHandle {
        let active = Rc::new(Cell::new(true));
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.prune();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.slots.push(Rc::new(Slot {
                id,
                active: Rc::clone(&active),
                callback: Rc::new(callback),
            }));
            id
        };
        debug!(observation = id, "observation registered");

        let registry: Weak<dyn Registry> = Rc::downgrade(&self.inner) as Weak<dyn Registry>;
        ObservationHandle {
            id,
            active,
            registry,
            detached: false,
        }
    }

    /// Number of delivered mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of callbacks that would receive the next mutation.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.active.get())
            .count()
    }

    fn deliver(&self, change: Change<T>) -> Delivery {
        // Snapshot so cancel/observe during the pass never touch what we iterate.
        let snapshot: Vec<Rc<Slot<T>>> = {
            let mut inner = self.inner.borrow_mut();
            inner.depth += 1;
            inner
                .slots
                .iter()
                .filter(|slot| slot.active.get())
                .cloned()
                .collect()
        };

        let mut delivery = Delivery::default();
        for slot in &snapshot {
            if !slot.active.get() {
                continue;
            }
            trace!(observation = slot.id, "delivering change");
            let callback = &slot.callback;
            match catch_unwind(AssertUnwindSafe(|| callback(&change))) {
                Ok(()) => delivery.delivered += 1,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(
                        observation = slot.id,
                        panic = message.as_str(),
                        "observation callback panicked; continuing delivery"
                    );
                    delivery.failures.push(KvoError::CallbackFailure {
                        observation: slot.id,
                        message,
                    });
                }
            }
        }

        {
            let mut inner = self.inner.borrow_mut();
            inner.depth -= 1;
            inner.prune();
        }
        debug!(
            delivered = delivery.delivered,
            failed = delivery.failures.len(),
            "delivery pass complete"
        );
        delivery
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Token for one registered callback.
///
/// Dropping the handle cancels the registration, so a callback never
/// outlives whoever holds its handle. Use [`detach`](Self::detach) to keep a
/// callback registered for the observable's whole lifetime.
pub struct ObservationHandle {
    id: u64,
    active: Rc<Cell<bool>>,
    registry: Weak<dyn Registry>,
    detached: bool,
}

impl ObservationHandle {
    /// Identity of this registration, unique per observable.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the callback will receive the next mutation.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get() && self.registry.strong_count() > 0
    }

    /// Remove the callback from the notification set.
    ///
    /// Idempotent. Safe to call from inside any callback, including the one
    /// being cancelled: the callback is skipped for the rest of the running
    /// pass and its entry is pruned when the outermost pass finishes.
    pub fn cancel(&self) {
        if !self.active.replace(false) {
            return;
        }
        debug!(observation = self.id, "observation cancelled");
        if let Some(registry) = self.registry.upgrade() {
            registry.prune();
        }
    }

    /// Give up the handle without cancelling the registration.
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for ObservationHandle {
    fn drop(&mut self) {
        if !self.detached {
            self.cancel();
        }
    }
}

impl std::fmt::Debug for ObservationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationHandle")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
