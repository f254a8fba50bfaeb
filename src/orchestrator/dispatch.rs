//! Action dispatch — the side-effecting half of a command cycle.
//!
//! Each handler owns its argument convention, its failure notifications, and
//! its memory entry.  Memory is written only on success, always keyed by the
//! original transcribed command, and never for TIME — reporting the clock is
//! not context worth carrying forward.

use std::time::Duration;

use crate::intent::{Action, ParsedIntent};
use crate::tools::CalcError;

use super::runner::Orchestrator;

/// Prefix that turns a NOTE argument into a rewrite of the last entry.
const UPDATE_PREFIX: &str = "UPDATE:";

/// Truncate to `max` characters, appending an ellipsis when clipped.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max).collect();
    clipped.push_str("...");
    clipped
}

impl Orchestrator {
    /// Route a parsed intent to its handler.  Unknown actions fall through
    /// to a notification without touching any state.
    pub(crate) async fn dispatch(&self, intent: &ParsedIntent, raw_input: &str) {
        match intent.action {
            Action::Note => self.handle_note(raw_input, &intent.argument).await,
            Action::Timer => self.handle_timer(raw_input, &intent.argument).await,
            Action::Time => self.handle_time().await,
            Action::Cancel => self.handle_cancel(raw_input, &intent.argument).await,
            Action::Clipboard => self.handle_clipboard(raw_input, &intent.argument).await,
            Action::Calc => self.handle_calc(raw_input, &intent.argument).await,
            Action::Screen => self.handle_screen(raw_input, &intent.argument).await,
            Action::Unknown => self.handle_unknown().await,
        }
    }

    // -----------------------------------------------------------------------
    // NOTE
    // -----------------------------------------------------------------------

    async fn handle_note(&self, raw_input: &str, arg: &str) {
        let (is_update, content) = match arg.strip_prefix(UPDATE_PREFIX) {
            Some(rest) => (true, rest.trim()),
            None => (false, arg),
        };

        let result = if is_update {
            self.notes.rewrite_last(content)
        } else {
            self.notes.append_daily(content)
        };

        if let Err(e) = result {
            log::error!("note save error: {e}");
            self.notify("Hark Error", "Failed to save note").await;
            return;
        }

        let description = if is_update {
            "Updated last note"
        } else {
            "Saved note"
        };
        self.memory
            .add(raw_input, &format!("{description}: {content}"));
        self.notify("Hark", "Note saved").await;
        self.speak("Noted");
    }

    // -----------------------------------------------------------------------
    // TIMER
    // -----------------------------------------------------------------------

    async fn handle_timer(&self, raw_input: &str, arg: &str) {
        let Ok(seconds) = arg.trim().parse::<u64>() else {
            log::warn!("invalid timer argument: {arg:?}");
            self.notify("Hark Error", "Invalid time").await;
            return;
        };

        self.timers
            .start("voice timer", Duration::from_secs(seconds));

        self.memory
            .add(raw_input, &format!("Set timer for {seconds} seconds"));
        self.notify("Hark", &format!("Timer started for {seconds} s"))
            .await;
        self.speak("Timer started");
    }

    // -----------------------------------------------------------------------
    // TIME
    // -----------------------------------------------------------------------

    async fn handle_time(&self) {
        let now = self.clock.current_time();
        self.notify("Hark", &now).await;
        self.speak(&format!("It is {now}"));
    }

    // -----------------------------------------------------------------------
    // CANCEL
    // -----------------------------------------------------------------------

    /// Only `note`, `timer`, and `all` are recognized; any other token
    /// cancels nothing.
    async fn handle_cancel(&self, raw_input: &str, arg: &str) {
        let arg = arg.trim().to_lowercase();
        let mut cancelled: Vec<String> = Vec::new();

        if arg == "note" || arg == "all" {
            match self.notes.delete_last() {
                Ok(()) => cancelled.push("note".into()),
                Err(e) => log::debug!("no note to cancel: {e}"),
            }
        }

        if arg == "timer" || arg == "all" {
            let count = self.timers.cancel_all();
            if count > 0 {
                cancelled.push(format!("{count} timer(s)"));
            }
        }

        if cancelled.is_empty() {
            self.notify("Hark", "Nothing to cancel").await;
            self.speak("Nothing to cancel");
            return;
        }

        let message = format!("Cancelled: {}", cancelled.join(", "));
        self.memory.add(raw_input, &message);
        self.notify("Hark", &message).await;
        self.speak("Cancelled");
    }

    // -----------------------------------------------------------------------
    // CLIPBOARD
    // -----------------------------------------------------------------------

    async fn handle_clipboard(&self, raw_input: &str, arg: &str) {
        let Some(clipboard) = &self.clipboard else {
            self.notify("Hark Error", "Clipboard unavailable").await;
            return;
        };

        let arg = arg.trim();

        if arg == "read" {
            let content = match clipboard.read() {
                Ok(content) => content,
                Err(e) => {
                    log::error!("clipboard read error: {e}");
                    self.notify("Hark Error", "Failed to read clipboard").await;
                    return;
                }
            };
            let display = clip(&content, 100);
            self.notify("Clipboard", &display).await;
            self.speak(&format!("Clipboard says: {display}"));
            self.memory.add(raw_input, "Read clipboard");
        } else if arg == "note" {
            let content = match clipboard.read() {
                Ok(content) => content,
                Err(e) => {
                    log::error!("clipboard read error: {e}");
                    self.notify("Hark Error", "Failed to read clipboard").await;
                    return;
                }
            };
            if content.is_empty() {
                self.notify("Hark", "Clipboard is empty").await;
                return;
            }
            if let Err(e) = self.notes.append_daily(&content) {
                log::error!("note save error: {e}");
                self.notify("Hark Error", "Failed to save note").await;
                return;
            }
            self.notify("Hark", "Clipboard saved to note").await;
            self.speak("Saved");
            self.memory.add(raw_input, "Saved clipboard to note");
        } else if let Some(content) = arg.strip_prefix("write:") {
            let content = content.trim();
            if let Err(e) = clipboard.write(content) {
                log::error!("clipboard write error: {e}");
                self.notify("Hark Error", "Failed to write clipboard").await;
                return;
            }
            self.notify("Hark", "Copied to clipboard").await;
            self.speak("Copied");
            self.memory
                .add(raw_input, &format!("Wrote to clipboard: {content}"));
        } else {
            self.notify("Hark", "Unknown clipboard operation").await;
        }
    }

    // -----------------------------------------------------------------------
    // CALC
    // -----------------------------------------------------------------------

    async fn handle_calc(&self, raw_input: &str, arg: &str) {
        let arg = arg.trim();

        // "15%:2500" asks for a percentage; everything else is an expression.
        let result = match arg.split_once("%:") {
            Some((percent, value)) => {
                match (percent.trim().parse::<f64>(), value.trim().parse::<f64>()) {
                    (Ok(p), Ok(v)) => Ok(self.calc.percentage(p, v)),
                    _ => Err(CalcError::Invalid("bad percentage format".into())),
                }
            }
            None => self.calc.evaluate(arg),
        };

        let value = match result {
            Ok(value) => value,
            Err(e) => {
                log::error!("calc error: {e}");
                self.notify("Hark Error", "Calculation error").await;
                self.speak("I cannot calculate that");
                return;
            }
        };

        let formatted = self.calc.format(value);
        self.notify("Result", &formatted).await;
        self.speak(&formatted);
        self.memory
            .add(raw_input, &format!("Calculated: {arg} = {formatted}"));
    }

    // -----------------------------------------------------------------------
    // SCREEN
    // -----------------------------------------------------------------------

    async fn handle_screen(&self, raw_input: &str, arg: &str) {
        let Some(screen) = &self.screen else {
            self.notify("Hark Error", "Screenshots unavailable").await;
            self.speak("Screenshots are unavailable");
            return;
        };
        let Some(vision) = &self.vision else {
            self.notify("Hark Error", "Vision model not configured").await;
            self.speak("The vision model is not configured");
            return;
        };

        let mode = arg.trim().to_lowercase();

        self.notify("Hark", "Taking a screenshot...").await;
        self.speak("One second");

        let shot = if mode == "window" {
            screen.capture_window()
        } else {
            screen.capture()
        };
        let shot = match shot {
            Ok(shot) => shot,
            Err(e) => {
                log::error!("screenshot error: {e}");
                self.notify("Hark Error", "Failed to take a screenshot").await;
                self.speak("I could not take a screenshot");
                return;
            }
        };

        let prompt = match mode.as_str() {
            "read" => {
                "Read all the text you can see in this screenshot. \
                 Output only the text, with no commentary."
            }
            "window" => {
                "Describe the contents of this window. \
                 What program is it? What is on screen?"
            }
            _ => "Describe what you see in this screenshot. Briefly, in two or three sentences.",
        };

        self.notify("Hark", "Analyzing the image...").await;

        let response = vision
            .generate_with_images("", prompt, std::slice::from_ref(&shot.base64))
            .await;

        // The temp file goes away no matter how the analysis went.
        if let Err(e) = screen.cleanup(&shot.path) {
            log::debug!("failed to clean up screenshot: {e}");
        }

        let response = match response {
            Ok(response) => response.trim().to_string(),
            Err(e) => {
                log::error!("vision model error: {e}");
                self.notify("Hark Error", "Analysis failed").await;
                self.speak("I could not analyze the image");
                return;
            }
        };

        let display = clip(&response, 200);
        self.notify("Screen", &display).await;
        self.speak(&clip(&response, 150));
        self.memory
            .add(raw_input, &format!("Screen analysis: {display}"));
    }

    // -----------------------------------------------------------------------
    // UNKNOWN
    // -----------------------------------------------------------------------

    async fn handle_unknown(&self) {
        log::warn!("unrecognized action");
        self.notify("Hark", "I did not understand that").await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
