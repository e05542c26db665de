#![forbid(unsafe_code)]

//! The birthday driver: one subject, a walker and a groomer, then mutations.

use kvo_runtime::{Delivery, KvoError, MessageSink, Observer, Subject};
use tracing::{info, warn};

use crate::cli::{Cancel, Opts};

/// Summary of one driver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Value of the subject after the last mutation.
    pub final_value: i64,
    /// Callbacks that completed, summed over every mutation.
    pub delivered: usize,
    /// Callbacks that panicked, in the order they failed.
    pub failures: Vec<KvoError>,
}

/// Run the scenario described by `opts`, emitting greetings into `sink`.
///
/// Errors only on invalid configuration (strict mode) or when an increment
/// would overflow. A panicking observer is reported in
/// [`Outcome::failures`], not as an error.
pub fn run<S>(opts: &Opts, sink: S) -> Result<Outcome, KvoError>
where
    S: MessageSink + Clone + 'static,
{
    let subject = if opts.strict {
        Subject::try_with_policy(opts.name.as_str(), opts.age, opts.notify)?
    } else {
        Subject::with_policy(opts.name.as_str(), opts.age, opts.notify)
    };

    let walker = Observer::walker(&subject, sink.clone());
    let groomer = Observer::groomer(&subject, sink);

    match opts.cancel {
        Cancel::None => {}
        Cancel::Walker => walker.stop_observing(),
        Cancel::Groomer => groomer.stop_observing(),
    }
    info!(
        subject = subject.name(),
        observers = subject.observer_count(),
        birthdays = opts.birthdays,
        "starting birthdays"
    );

    let mut outcome = Outcome {
        final_value: subject.value(),
        delivered: 0,
        failures: Vec::new(),
    };
    for _ in 0..opts.birthdays {
        let delivery: Delivery = match opts.set {
            Some(value) => subject.set_value(value),
            None => subject.increment()?,
        };
        if !delivery.is_clean() {
            warn!(failed = delivery.failures().len(), "some observers failed");
        }
        outcome.delivered += delivery.delivered();
        outcome.failures.extend(delivery.failures().iter().cloned());
    }
    outcome.final_value = subject.value();
    Ok(outcome)
}
