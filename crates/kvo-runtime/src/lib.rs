#![forbid(unsafe_code)]

//! Runtime: observable attributes, explicit observation handles, and
//! labelled observers.
//!
//! # Primary responsibilities
//! - **Observable**: a shared value that delivers every mutation, as an
//!   old/new [`Change`], to its registered callbacks in registration order.
//! - **ObservationHandle**: cancels one registration, explicitly or on drop.
//! - **Subject**: a named integer attribute built on `Observable<i64>`.
//! - **Observer**: one parameterized observer type with a label, a message
//!   formatter, and a message sink.
//!
//! # How it fits together
//! A [`Subject`] never knows which observer types exist. Each [`Observer`]
//! registers a closure with [`Subject::observe`] at construction and holds the
//! returned handle; dropping the observer releases the registration.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`). Delivery is
//! synchronous: a mutation returns only after every callback has run.

pub mod error;
pub mod observer;
pub mod reactive;
pub mod subject;

pub use error::KvoError;
pub use observer::{
    Formatter, GROOMER_LABEL, Greeting, MemorySink, MessageSink, Observer, StdoutSink,
    WALKER_LABEL, birthday_greeting, groomer_greeting,
};
pub use reactive::{Change, Delivery, NotifyPolicy, Observable, ObservationHandle};
pub use subject::{Subject, SubjectChange};
