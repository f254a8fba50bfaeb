//! Background countdown timers.
//!
//! [`CountdownTimers`] runs each countdown as a tokio task and invokes a
//! completion callback (wired to the notifier in `main`) when it fires.
//! Starting a timer under an existing name replaces the old one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Invoked with the timer's name when a countdown completes.
pub type TimerCallback = Arc<dyn Fn(String) + Send + Sync>;

// ---------------------------------------------------------------------------
// TimerService trait
// ---------------------------------------------------------------------------

/// Countdown capability consumed by the TIMER and CANCEL actions.
pub trait TimerService: Send + Sync {
    /// Start (or restart) a named countdown.
    fn start(&self, name: &str, duration: Duration);

    /// Cancel every running countdown; returns how many were cancelled.
    fn cancel_all(&self) -> usize;

    /// Number of currently running countdowns.
    fn active_count(&self) -> usize;
}

// ---------------------------------------------------------------------------
// CountdownTimers
// ---------------------------------------------------------------------------

/// Timer service backed by tokio tasks.  Must be created inside a tokio
/// runtime; `start` spawns onto the current runtime.
pub struct CountdownTimers {
    callback: TimerCallback,
    active: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl CountdownTimers {
    pub fn new(callback: TimerCallback) -> Self {
        Self {
            callback,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl TimerService for CountdownTimers {
    fn start(&self, name: &str, duration: Duration) {
        let mut active = self.active.lock().unwrap();

        // Restarting a name replaces the running countdown.
        if let Some(existing) = active.remove(name) {
            existing.abort();
        }

        let callback = Arc::clone(&self.callback);
        let registry = Arc::clone(&self.active);
        let key = name.to_string();
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            registry.lock().unwrap().remove(&task_key);
            callback(task_key);
        });

        active.insert(key, handle);
    }

    fn cancel_all(&self) -> usize {
        let mut active = self.active.lock().unwrap();
        let count = active.len();
        for (_, handle) in active.drain() {
            handle.abort();
        }
        count
    }

    fn active_count(&self) -> usize {
        self.active.lock().unwrap().len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_timers() -> (CountdownTimers, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        let timers = CountdownTimers::new(Arc::new(move |_name| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));
        (timers, fired)
    }

    #[tokio::test]
    async fn fires_callback_after_duration() {
        let (timers, fired) = counting_timers();
        timers.start("t", Duration::from_millis(20));
        assert_eq!(timers.active_count(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timers.active_count(), 0);
    }

    #[tokio::test]
    async fn cancel_all_returns_count_and_suppresses_callbacks() {
        let (timers, fired) = counting_timers();
        timers.start("a", Duration::from_millis(50));
        timers.start("b", Duration::from_millis(50));

        assert_eq!(timers.cancel_all(), 2);
        assert_eq!(timers.active_count(), 0);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0, "no callback after cancel");
    }

    #[tokio::test]
    async fn cancel_all_with_no_timers_returns_zero() {
        let (timers, _fired) = counting_timers();
        assert_eq!(timers.cancel_all(), 0);
    }

    #[tokio::test]
    async fn restarting_a_name_replaces_the_countdown() {
        let (timers, fired) = counting_timers();
        timers.start("t", Duration::from_millis(30));
        timers.start("t", Duration::from_millis(30));
        assert_eq!(timers.active_count(), 1);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1, "only the restart fires");
    }
}
