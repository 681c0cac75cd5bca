//! Per-task logging.

use std::fmt::Display;

use tracing::{debug, error, info, warn};

/// Logger handed to checks and actions.
///
/// Every event carries the monitor's log channel and the task name as
/// fields, and the message is prefixed with `[<task>]`.
#[derive(Debug, Clone)]
pub struct TaskLogger {
    channel: String,
    task: String,
}

impl TaskLogger {
    pub fn new(channel: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            task: task.into(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn debug(&self, msg: impl Display) {
        debug!(channel = %self.channel, task = %self.task, "[{}] {}", self.task, msg);
    }

    pub fn info(&self, msg: impl Display) {
        info!(channel = %self.channel, task = %self.task, "[{}] {}", self.task, msg);
    }

    pub fn warn(&self, msg: impl Display) {
        warn!(channel = %self.channel, task = %self.task, "[{}] {}", self.task, msg);
    }

    pub fn error(&self, msg: impl Display) {
        error!(channel = %self.channel, task = %self.task, "[{}] {}", self.task, msg);
    }
}
