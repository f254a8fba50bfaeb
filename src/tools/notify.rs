//! Desktop notifications via `notify-send`.
//!
//! Notifications are the agent's primary feedback channel, but they are
//! never load-bearing: every call site treats a failure as log-and-continue.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// NotifyError
// ---------------------------------------------------------------------------

/// Errors from the notification backend.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to spawn notifier: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("notifier exited with status {0}")]
    CommandFailed(i32),
}

// ---------------------------------------------------------------------------
// Notifier trait
// ---------------------------------------------------------------------------

/// Fire-and-forget user-visible alert.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;
}

// ---------------------------------------------------------------------------
// DesktopNotifier
// ---------------------------------------------------------------------------

/// Sends notifications through the freedesktop `notify-send` utility.
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let status = tokio::process::Command::new("notify-send")
            .arg(title)
            .arg(message)
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(NotifyError::CommandFailed(status.code().unwrap_or(-1)))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
