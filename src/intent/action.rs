//! Parsed intent — the structured outcome of one classified command.
//!
//! The model is instructed to answer in the literal form
//! `ACTION: <NAME> | ARG: <VALUE>`.  [`parse_reply`] is deliberately
//! forgiving: malformed output degrades to [`Action::Unknown`] instead of
//! aborting the command cycle, so a misbehaving model can never take the
//! agent down.

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The actions the agent can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Append to (or rewrite the last entry of) the daily note.
    Note,
    /// Start a countdown timer.
    Timer,
    /// Report the current time.
    Time,
    /// Cancel the last note and/or all running timers.
    Cancel,
    /// Read, write, or file away the clipboard.
    Clipboard,
    /// Evaluate an arithmetic expression or percentage.
    Calc,
    /// Capture a screenshot and describe it with a vision model.
    Screen,
    /// Anything the model could not map to a known action.
    Unknown,
}

impl Action {
    /// Map a literal action name from the model reply.  Anything that is not
    /// an exact known name (including the empty string) is `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "NOTE" => Action::Note,
            "TIMER" => Action::Timer,
            "TIME" => Action::Time,
            "CANCEL" => Action::Cancel,
            "CLIPBOARD" => Action::Clipboard,
            "CALC" => Action::Calc,
            "SCREEN" => Action::Screen,
            _ => Action::Unknown,
        }
    }

    /// Canonical name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Note => "NOTE",
            Action::Timer => "TIMER",
            Action::Time => "TIME",
            Action::Cancel => "CANCEL",
            Action::Clipboard => "CLIPBOARD",
            Action::Calc => "CALC",
            Action::Screen => "SCREEN",
            Action::Unknown => "UNKNOWN",
        }
    }
}

// ---------------------------------------------------------------------------
// ParsedIntent
// ---------------------------------------------------------------------------

/// One classified command: the action plus its free-form argument.
/// Lives for a single command cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIntent {
    pub action: Action,
    pub argument: String,
}

/// Parse a raw model reply of the form `ACTION: <NAME> | ARG: <VALUE>`.
///
/// Splits on `|`, then each segment on the **first** `:` so argument values
/// may themselves contain colons (`ARG: UPDATE: buy milk`).  Keys and values
/// are trimmed; when the model repeats a key, the last occurrence wins;
/// segments without a colon are ignored.  A reply with no `ACTION` key at
/// all yields [`Action::Unknown`].
pub fn parse_reply(raw: &str) -> ParsedIntent {
    let mut action_name = "";
    let mut argument = "";

    for segment in raw.split('|') {
        let Some((key, value)) = segment.split_once(':') else {
            continue;
        };
        match key.trim() {
            "ACTION" => action_name = value.trim(),
            "ARG" => argument = value.trim(),
            _ => {}
        }
    }

    ParsedIntent {
        action: Action::from_name(action_name),
        argument: argument.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
