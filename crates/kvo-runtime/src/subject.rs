#![forbid(unsafe_code)]

//! A named subject exposing one observable integer attribute.

use std::rc::Rc;

use tracing::debug;

use crate::error::KvoError;
use crate::reactive::{Change, Delivery, NotifyPolicy, Observable, ObservationHandle};

/// What a subject-level callback receives for each mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectChange<'a> {
    /// Identity of the subject that changed.
    pub name: &'a str,
    /// Value before the mutation.
    pub old: i64,
    /// Value after the mutation.
    pub new: i64,
}

/// A named subject holding one observed `i64` attribute.
///
/// `Subject` is a shared handle: clones refer to the same name, value, and
/// callback set. Observers keep a clone; the subject does not know about any
/// observer type, only about the callbacks registered with [`observe`](Self::observe).
#[derive(Clone)]
pub struct Subject {
    name: Rc<str>,
    value: Observable<i64>,
}

impl Subject {
    /// Create a subject without validating its arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, initial: i64) -> Self {
        Self::with_policy(name, initial, NotifyPolicy::Always)
    }

    /// Create a subject with an explicit [`NotifyPolicy`].
    #[must_use]
    pub fn with_policy(name: impl Into<String>, initial: i64, policy: NotifyPolicy) -> Self {
        let name: Rc<str> = Rc::from(name.into());
        debug!(subject = &*name, initial, ?policy, "subject created");
        Self {
            name,
            value: Observable::with_policy(initial, policy),
        }
    }

    /// Create a subject, rejecting a blank name or a negative value.
    pub fn try_new(name: impl Into<String>, initial: i64) -> Result<Self, KvoError> {
        Self::try_with_policy(name, initial, NotifyPolicy::Always)
    }

    /// Validating counterpart of [`with_policy`](Self::with_policy).
    pub fn try_with_policy(
        name: impl Into<String>,
        initial: i64,
        policy: NotifyPolicy,
    ) -> Result<Self, KvoError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(KvoError::invalid("name", "must not be empty"));
        }
        if initial < 0 {
            return Err(KvoError::invalid(
                "value",
                format!("must be non-negative, got {initial}"),
            ));
        }
        Ok(Self::with_policy(name, initial, policy))
    }

    /// Immutable identity of the subject.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value of the observed attribute.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.value.get()
    }

    /// Number of delivered mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.value.version()
    }

    #[must_use]
    pub fn policy(&self) -> NotifyPolicy {
        self.value.policy()
    }

    /// Assign a new value and notify every registered callback before
    /// returning.
    pub fn set_value(&self, new: i64) -> Delivery {
        debug!(subject = &*self.name, new, "set value");
        self.value.set(new)
    }

    /// Add one to the value.
    ///
    /// Fails without notifying anyone if the value is already `i64::MAX`.
    pub fn increment(&self) -> Result<Delivery, KvoError> {
        let next = self
            .value()
            .checked_add(1)
            .ok_or_else(|| KvoError::invalid("value", "increment would overflow"))?;
        Ok(self.set_value(next))
    }

    /// Register a callback for every subsequent mutation.
    pub fn observe(&self, callback: impl Fn(&SubjectChange<'_>) + 'static) -> ObservationHandle {
        // Capture the name, not `self`: a subject clone inside its own
        // registry would never be freed.
        let name = Rc::clone(&self.name);
        self.value.observe(move |change: &Change<i64>| {
            callback(&SubjectChange {
                name: &name,
                old: change.old,
                new: change.new,
            });
        })
    }

    /// Number of callbacks that would receive the next mutation.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.value.observer_count()
    }
}

impl std::fmt::Debug for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("name", &&*self.name)
            .field("value", &self.value())
            .field("observers", &self.observer_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn construct_has_no_observers() {
        let s = Subject::new("Brucey", 17);
        assert_eq!(s.name(), "Brucey");
        assert_eq!(s.value(), 17);
        assert_eq!(s.observer_count(), 0);
        assert_eq!(s.version(), 0);
    }

    #[test]
    fn new_accepts_anything() {
        let s = Subject::new("", -4);
        assert_eq!(s.value(), -4);
    }

    #[test]
    fn try_new_rejects_blank_name() {
        let err = Subject::try_new("   ", 3).unwrap_err();
        assert!(matches!(err, KvoError::InvalidArgument { field: "name", .. }));
    }

    #[test]
    fn try_new_rejects_negative_value() {
        let err = Subject::try_new("Rex", -1).unwrap_err();
        assert_eq!(
            err,
            KvoError::InvalidArgument {
                field: "value",
                reason: "must be non-negative, got -1".into(),
            }
        );
        assert!(Subject::try_new("Rex", 0).is_ok());
    }

    #[test]
    fn set_value_delivers_name_old_new() {
        let s = Subject::new("Brucey", 17);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_ref = Rc::clone(&seen);
        let _h = s.observe(move |c| seen_ref.borrow_mut().push((c.name.to_string(), c.old, c.new)));

        let d = s.set_value(18);
        assert_eq!(d.delivered(), 1);
        assert_eq!(*seen.borrow(), vec![("Brucey".to_string(), 17, 18)]);
    }

    #[test]
    fn increment_adds_one() {
        let s = Subject::new("Brucey", 17);
        s.increment().unwrap();
        assert_eq!(s.value(), 18);
    }

    #[test]
    fn increment_overflow_is_rejected_without_notifying() {
        let s = Subject::new("Max", i64::MAX);
        let calls = Rc::new(RefCell::new(0));
        let calls_ref = Rc::clone(&calls);
        let _h = s.observe(move |_| *calls_ref.borrow_mut() += 1);

        assert!(s.increment().is_err());
        assert_eq!(s.value(), i64::MAX);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn clones_share_callbacks() {
        let s = Subject::new("Brucey", 1);
        let other = s.clone();
        let _h = s.observe(|_| {});
        assert_eq!(other.observer_count(), 1);
        other.set_value(2);
        assert_eq!(s.value(), 2);
    }

    #[test]
    fn on_change_subject_skips_equal_set() {
        let s = Subject::with_policy("Brucey", 5, NotifyPolicy::OnChange);
        let _h = s.observe(|_| {});
        assert_eq!(s.set_value(5).delivered(), 0);
        assert_eq!(s.set_value(6).delivered(), 1);
    }

    #[test]
    fn debug_lists_name_and_value() {
        let s = Subject::new("Brucey", 17);
        let dbg = format!("{s:?}");
        assert!(dbg.contains("Brucey"));
        assert!(dbg.contains("17"));
    }
}
