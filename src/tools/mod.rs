//! External tool adapters.
//!
//! One capability trait per collaborator, each with a concrete adapter the
//! orchestrator holds as a trait object (and tests replace with mocks):
//!
//! | trait | concrete | backend |
//! |---|---|---|
//! | [`Notifier`] | [`DesktopNotifier`] | `notify-send` |
//! | [`NoteStore`] | [`DailyNotes`] | Markdown vault |
//! | [`TimerService`] | [`CountdownTimers`] | tokio tasks |
//! | [`Clock`] | [`SystemClock`] | chrono |
//! | [`ClipboardService`] | [`SystemClipboard`] | arboard |
//! | [`Calculator`] | [`ExprCalculator`] | built-in parser |
//! | [`ScreenCapture`] | [`ScreenshotTool`] | gnome-screenshot / scrot / … |
//! | [`SpeechOutput`] | [`CommandSpeaker`] | espeak-ng / piper |

pub mod calc;
pub mod clipboard;
pub mod clock;
pub mod notes;
pub mod notify;
pub mod screen;
pub mod speech;
pub mod timer;

pub use calc::{CalcError, Calculator, ExprCalculator};
pub use clipboard::{ClipboardError, ClipboardService, SystemClipboard};
pub use clock::{Clock, SystemClock};
pub use notes::{DailyNotes, NoteStore, NotesError};
pub use notify::{DesktopNotifier, Notifier, NotifyError};
pub use screen::{ScreenCapture, ScreenError, Screenshot, ScreenshotTool};
pub use speech::{CommandSpeaker, SpeechOutput};
pub use timer::{CountdownTimers, TimerCallback, TimerService};

/// Locate `binary` on `PATH`.
///
/// The subprocess-backed tools (notifier, TTS, screenshots) use this at
/// startup to decide availability instead of failing on first use.
pub(crate) fn find_in_path(binary: &str) -> Option<std::path::PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}
