//! Bounded rolling history of resolved voice interactions.
//!
//! [`ContextMemory`] keeps the last *N* (command, action) pairs and feeds
//! them back into every intent-classification prompt, giving the language
//! model continuity across commands ("cancel *that*", "change it to …").
//!
//! Strict FIFO ring: insertion order is preserved and the oldest entry is
//! evicted once the capacity is reached.  Reads return an owned snapshot, so
//! no caller ever aliases the internal storage; an `RwLock` guarantees a
//! snapshot never observes a half-applied insert.

use std::collections::VecDeque;
use std::sync::RwLock;

// ---------------------------------------------------------------------------
// ContextEntry
// ---------------------------------------------------------------------------

/// A record of one resolved voice interaction.  Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    /// The original transcribed command, verbatim.
    pub command: String,
    /// Short human-readable description of what was done.
    pub action: String,
}

// ---------------------------------------------------------------------------
// ContextMemory
// ---------------------------------------------------------------------------

/// Fixed-capacity rolling window of [`ContextEntry`] values.
///
/// # Example
/// ```rust
/// use hark::memory::ContextMemory;
///
/// let memory = ContextMemory::new(2);
/// memory.add("note milk", "Saved note: milk");
/// memory.add("timer 60", "Set timer for 60 seconds");
/// memory.add("note bread", "Saved note: bread");
///
/// let history = memory.history();
/// assert_eq!(history.len(), 2);
/// assert_eq!(history[0].command, "timer 60"); // oldest surviving entry first
/// ```
pub struct ContextMemory {
    entries: RwLock<VecDeque<ContextEntry>>,
    capacity: usize,
}

impl ContextMemory {
    /// Create a memory holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ContextMemory capacity must be > 0");
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest when at capacity.
    pub fn add(&self, command: &str, action: &str) {
        let mut entries = self.entries.write().unwrap();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(ContextEntry {
            command: command.to_string(),
            action: action.to_string(),
        });
    }

    /// Return a snapshot of the history, oldest entry first.
    pub fn history(&self) -> Vec<ContextEntry> {
        let entries = self.entries.read().unwrap();
        entries.iter().cloned().collect()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Returns `true` when no interactions have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
