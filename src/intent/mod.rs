//! Intent parsing — free text in, structured action out.
//!
//! * [`PromptBuilder`] — renders the classification prompt (action catalogue,
//!   worked examples, rolling context, new input).
//! * [`parse_reply`] — parses the model's `ACTION: … | ARG: …` reply.
//! * [`Action`] / [`ParsedIntent`] — the structured result for one cycle.
//!
//! Parsing never fails: malformed model output degrades to
//! [`Action::Unknown`], which the dispatcher turns into a "not understood"
//! notification.

pub mod action;
pub mod prompt;

pub use action::{parse_reply, Action, ParsedIntent};
pub use prompt::PromptBuilder;
