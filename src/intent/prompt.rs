//! Prompt construction for intent classification.
//!
//! [`PromptBuilder`] renders a fixed instruction template: the catalogue of
//! allowed actions, routing rules, worked examples, the rolling context from
//! [`ContextMemory`](crate::memory::ContextMemory), and finally the new
//! transcribed input.  Substitution is plain `str::replace` on `{context}` /
//! `{input}` markers — missing data renders as empty text, and nothing here
//! can fail at runtime.

use crate::memory::ContextEntry;

// ---------------------------------------------------------------------------
// Instruction template
// ---------------------------------------------------------------------------

const INSTRUCTION_TEMPLATE: &str = "\
You are a voice assistant for the desktop.
Your task: analyze the user's input and pick exactly one action.

Available actions:
1. NOTE: Save or update a note in the daily notes file.
2. TIMER: Start a countdown (duration must be given in seconds).
3. TIME: Report the current time.
4. CANCEL: Undo the last action (delete the note or stop timers).
5. CLIPBOARD: Work with the clipboard (read - read it, write - write to it, note - file the clipboard into a note).
6. CALC: Evaluate an arithmetic expression.
7. SCREEN: Analyze the screen (describe - what is on screen, read - read the text, window - the active window).

Reply format: ACTION: [ACTION_NAME] | ARG: [VALUE]

Rules:
- Asked to \"note\" or \"write down\" -> ACTION: NOTE | ARG: [note text]
- Asked to \"fix\" or \"change\" the last entry -> ACTION: NOTE | ARG: UPDATE: [new text]
- Asked for a \"timer\" or \"remind me in\" -> ACTION: TIMER | ARG: [number of seconds]
- Asked \"what time\" -> ACTION: TIME | ARG: none
- Asked to \"cancel\", \"delete\", \"undo\" -> ACTION: CANCEL | ARG: [note/timer/all]
- Asked to \"copy\" some text -> ACTION: CLIPBOARD | ARG: write:[text]
- Asked \"what is in the clipboard\" -> ACTION: CLIPBOARD | ARG: read
- Asked to \"paste the clipboard into a note\" -> ACTION: CLIPBOARD | ARG: note
- Asked to \"calculate\" or \"how much is\" -> ACTION: CALC | ARG: [expression or percent:value]
- Asked \"what is on the screen\" -> ACTION: SCREEN | ARG: describe
- Asked about \"this window\" -> ACTION: SCREEN | ARG: window
- Asked to read text off the screen -> ACTION: SCREEN | ARG: read

Examples:
Input: \"note buy bread\"
Reply: ACTION: NOTE | ARG: Buy bread

Input: \"set a timer for 5 minutes\"
Reply: ACTION: TIMER | ARG: 300

Input: \"what time is it\"
Reply: ACTION: TIME | ARG: none

Input: \"cancel the last note\"
Reply: ACTION: CANCEL | ARG: note

Input: \"copy hello world\"
Reply: ACTION: CLIPBOARD | ARG: write:hello world

Input: \"calculate two plus two\"
Reply: ACTION: CALC | ARG: 2+2

Input: \"how much is 15 percent of 2500\"
Reply: ACTION: CALC | ARG: 15%:2500

Input: \"what is on my screen\"
Reply: ACTION: SCREEN | ARG: describe

Context:
{context}

Input: {input}
Reply:";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Renders the classification prompt from history and new input.
///
/// # Example
/// ```rust
/// use hark::intent::PromptBuilder;
///
/// let prompt = PromptBuilder::new().build(&[], "note buy bread");
/// assert!(prompt.contains("Input: note buy bread"));
/// ```
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Render the full prompt.
    ///
    /// History entries appear as `- Command: {c}, Action: {a}` lines, oldest
    /// first; an empty history renders an empty context block.
    pub fn build(&self, history: &[ContextEntry], input: &str) -> String {
        let mut context = String::new();
        for entry in history {
            context.push_str(&format!(
                "- Command: {}, Action: {}\n",
                entry.command, entry.action
            ));
        }

        INSTRUCTION_TEMPLATE
            .replace("{context}", &context)
            .replace("{input}", input)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(command: &str, action: &str) -> ContextEntry {
        ContextEntry {
            command: command.into(),
            action: action.into(),
        }
    }

    #[test]
    fn embeds_the_input() {
        let prompt = PromptBuilder::new().build(&[], "note buy bread");
        assert!(prompt.contains("Input: note buy bread"));
        assert!(prompt.ends_with("Reply:"));
    }

    #[test]
    fn enumerates_all_actions() {
        let prompt = PromptBuilder::new().build(&[], "test");
        for name in ["NOTE", "TIMER", "TIME", "CANCEL", "CLIPBOARD", "CALC", "SCREEN"] {
            assert!(prompt.contains(name), "prompt must mention {name}");
        }
    }

    #[test]
    fn formats_history_lines() {
        let history = vec![
            entry("note milk", "Saved note: milk"),
            entry("timer 60", "Set timer for 60 seconds"),
        ];
        let prompt = PromptBuilder::new().build(&history, "cancel it");

        assert!(prompt.contains("- Command: note milk, Action: Saved note: milk\n"));
        assert!(prompt.contains("- Command: timer 60, Action: Set timer for 60 seconds\n"));
        // Oldest entry first.
        let first = prompt.find("note milk").unwrap();
        let second = prompt.find("timer 60").unwrap();
        assert!(first < second);
    }

    /// An empty history must render an empty context block, not panic or
    /// leave the marker behind.
    #[test]
    fn empty_history_renders_empty_context() {
        let prompt = PromptBuilder::new().build(&[], "test");
        assert!(!prompt.contains("{context}"));
        assert!(prompt.contains("Context:\n\n"));
    }

    #[test]
    fn no_markers_survive_substitution() {
        let history = vec![entry("a", "b")];
        let prompt = PromptBuilder::new().build(&history, "c");
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{input}"));
    }
}
