#![forbid(unsafe_code)]

//! Labelled observers that turn subject changes into messages.
//!
//! One [`Observer`] type covers every observer flavour: the label and the
//! [`Formatter`] decide what gets said, the [`MessageSink`] decides where it
//! goes. [`Observer::walker`] and [`Observer::groomer`] are the two stock
//! configurations used by the birthday demo.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::reactive::ObservationHandle;
use crate::subject::{Subject, SubjectChange};

pub const WALKER_LABEL: &str = "dog walker";
pub const GROOMER_LABEL: &str = "dog groomer";

/// Input to a [`Formatter`]: one change as seen by one observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Greeting<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub old: i64,
    pub new: i64,
}

/// Turns a [`Greeting`] into the lines an observer emits.
pub type Formatter = Rc<dyn Fn(&Greeting<'_>) -> Vec<String>>;

/// Default format: `"<name>, happy <new> birthday! From the <label>"`.
#[must_use]
pub fn birthday_greeting(g: &Greeting<'_>) -> Vec<String> {
    vec![
        format!("{} was {} years old", g.name, g.old),
        format!("{}, happy {} birthday! From the {}", g.name, g.new, g.label),
    ]
}

/// Groomer variant of [`birthday_greeting`], without the comma after the name.
#[must_use]
pub fn groomer_greeting(g: &Greeting<'_>) -> Vec<String> {
    vec![
        format!("{} was {} years old", g.name, g.old),
        format!("{} happy {} birthday! From the {}", g.name, g.new, g.label),
    ]
}

/// Destination for observer output.
pub trait MessageSink {
    fn emit(&self, line: &str);
}

impl<S: MessageSink + ?Sized> MessageSink for Rc<S> {
    fn emit(&self, line: &str) {
        (**self).emit(line);
    }
}

/// Writes each line to process stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl MessageSink for StdoutSink {
    fn emit(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(err) = writeln!(out, "{line}") {
            warn!(error = %err, "failed to write observer output");
        }
    }
}

/// Collects lines in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every line emitted so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Drain the buffer.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }
}

impl MessageSink for MemorySink {
    fn emit(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_owned());
    }
}

/// An observer of one [`Subject`], registered from construction until
/// [`stop_observing`](Self::stop_observing) or drop.
pub struct Observer {
    subject: Subject,
    label: Rc<str>,
    handle: ObservationHandle,
}

impl Observer {
    /// Observe `subject` with the default [`birthday_greeting`] format.
    pub fn new(subject: &Subject, label: impl Into<String>, sink: impl MessageSink + 'static) -> Self {
        Self::with_formatter(subject, label, birthday_greeting, sink)
    }

    /// Observe `subject` with a custom message format.
    pub fn with_formatter(
        subject: &Subject,
        label: impl Into<String>,
        formatter: impl Fn(&Greeting<'_>) -> Vec<String> + 'static,
        sink: impl MessageSink + 'static,
    ) -> Self {
        let label: Rc<str> = Rc::from(label.into());
        let formatter: Formatter = Rc::new(formatter);

        let callback_label = Rc::clone(&label);
        let handle = subject.observe(move |change: &SubjectChange<'_>| {
            let greeting = Greeting {
                name: change.name,
                label: &callback_label,
                old: change.old,
                new: change.new,
            };
            for line in formatter(&greeting) {
                sink.emit(&line);
            }
        });
        debug!(
            subject = subject.name(),
            label = &*label,
            observation = handle.id(),
            "observer attached"
        );

        Self {
            subject: subject.clone(),
            label,
            handle,
        }
    }

    /// The stock "dog walker" observer.
    pub fn walker(subject: &Subject, sink: impl MessageSink + 'static) -> Self {
        Self::new(subject, WALKER_LABEL, sink)
    }

    /// The stock "dog groomer" observer.
    pub fn groomer(subject: &Subject, sink: impl MessageSink + 'static) -> Self {
        Self::with_formatter(subject, GROOMER_LABEL, groomer_greeting, sink)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// The handle backing this observer's registration.
    #[must_use]
    pub fn handle(&self) -> &ObservationHandle {
        &self.handle
    }

    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.handle.is_active()
    }

    /// Stop receiving changes. Idempotent.
    pub fn stop_observing(&self) {
        if self.handle.is_active() {
            debug!(label = &*self.label, "observer detached");
        }
        self.handle.cancel();
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("label", &&*self.label)
            .field("subject", &self.subject.name())
            .field("observing", &self.is_observing())
            .finish()
    }
}
