//! Listening passes over the shared frame queue.
//!
//! The orchestrator alternates between two consumers of the same queue:
//! [`await_wake_phrase`] (constrained vocabulary, cheap, runs almost all the
//! time) and [`capture_command`] (open vocabulary, bounded by silence and
//! ceiling timers, runs only after a wake).  At most one of them is ever
//! receiving — the queue has a single consumer at a time by construction.

pub mod capture;
pub mod wake;

pub use capture::capture_command;
pub use wake::await_wake_phrase;
