#![forbid(unsafe_code)]

//! Birthday demo for `kvo-runtime`.
//!
//! Builds a subject, attaches the stock walker and groomer observers, and
//! performs the configured mutations. The binary prints greetings to stdout;
//! the library entry point [`scenario::run`] accepts any
//! [`MessageSink`](kvo_runtime::MessageSink) so the same flow is testable.

pub mod cli;
pub mod logging;
pub mod scenario;
