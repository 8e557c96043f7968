//! Scheduled reminders, delivered back to the chat after a delay.
//!
//! Each reminder is a single tokio task with an explicit handle, so it can be
//! aborted (unlike a detached thread). Reminders are not persisted.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::replies;
use crate::telegram::MessageSender;

/// A scheduled reminder with a cancellation handle.
pub struct Reminder {
    pub chat_id: i64,
    pub task: String,
    handle: JoinHandle<()>,
}

impl Reminder {
    /// Schedule a reminder message to `chat_id` after `delay`.
    pub fn schedule(
        sender: Arc<dyn MessageSender>,
        chat_id: i64,
        delay: Duration,
        task: String,
    ) -> Self {
        let text = replies::reminder_fired(&task);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = sender.send(chat_id, &text).await {
                tracing::warn!(chat_id, "Failed to deliver reminder: {e}");
            }
        });
        Self {
            chat_id,
            task,
            handle,
        }
    }

    /// Abort the pending reminder.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Parse `/remind <minutes> <task>` arguments. Returns `(minutes, task)`.
pub fn parse_remind_args(text: &str) -> Option<(u64, String)> {
    let rest = text.strip_prefix("/remind")?.trim_start();
    let mut parts = rest.splitn(2, char::is_whitespace);
    let minutes: u64 = parts.next()?.parse().ok()?;
    let task = parts.next()?.trim();
    if task.is_empty() {
        return None;
    }
    Some((minutes, task.to_string()))
}
