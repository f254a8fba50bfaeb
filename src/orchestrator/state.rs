//! Orchestrator state and the state-change observer.
//!
//! The state is transient and lives only inside the run loop; the outside
//! world (a tray icon, a status LED) observes it exclusively through the
//! [`StateObserver`] callback, which fires synchronously on every transition
//! and must not block.

/// The phases of one command cycle.
///
/// ```text
/// Idle ──wake phrase──▶ Listening ──non-empty transcript──▶ Thinking
///   ▲                        │                                  │
///   └────empty transcript────┴───────────dispatch done──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// Waiting for the wake phrase.
    Idle,
    /// Wake phrase heard; capturing the spoken command.
    Listening,
    /// Classifying and dispatching the command.
    Thinking,
}

impl AgentState {
    /// A short human-readable label for logs and status surfaces.
    pub fn label(&self) -> &'static str {
        match self {
            AgentState::Idle => "Idle",
            AgentState::Listening => "Listening",
            AgentState::Thinking => "Thinking",
        }
    }
}

impl Default for AgentState {
    fn default() -> Self {
        AgentState::Idle
    }
}

/// Synchronous, non-blocking observer invoked on every state transition.
pub type StateObserver = Box<dyn Fn(AgentState) + Send + Sync>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        assert_eq!(AgentState::default(), AgentState::Idle);
    }

    #[test]
    fn labels() {
        assert_eq!(AgentState::Idle.label(), "Idle");
        assert_eq!(AgentState::Listening.label(), "Listening");
        assert_eq!(AgentState::Thinking.label(), "Thinking");
    }
}
