//! Per-task runtime state and the failure/recovery state machine.

use std::time::Duration;

use tokio::time::Instant;

/// What a failed check did to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Still under the threshold.
    Counted { failures: u32 },
    /// Threshold reached on a healthy task. The failure action fires.
    BecameUnhealthy { failures: u32 },
    /// Already unhealthy; no new action until a success re-arms it.
    StillUnhealthy { failures: u32 },
}

impl FailureOutcome {
    /// Consecutive failures after this one was counted.
    pub fn failures(self) -> u32 {
        match self {
            Self::Counted { failures }
            | Self::BecameUnhealthy { failures }
            | Self::StillUnhealthy { failures } => failures,
        }
    }
}

/// Mutable state for one task, owned by the monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskState {
    /// `None` until the first check, so the first pass always checks.
    last_check_time: Option<Instant>,
    consecutive_failures: u32,
    is_unhealthy: bool,
}

impl TaskState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_check_time(&self) -> Option<Instant> {
        self.last_check_time
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn is_unhealthy(&self) -> bool {
        self.is_unhealthy
    }

    /// Whether at least `interval` has passed since the last check.
    pub fn is_due(&self, now: Instant, interval: Duration) -> bool {
        match self.last_check_time {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= interval,
        }
    }

    /// Claim the current slot, before the check runs.
    pub(crate) fn mark_checked(&mut self, now: Instant) {
        self.last_check_time = Some(now);
    }

    /// Record a passing check. Returns `true` if the task was unhealthy.
    pub(crate) fn record_success(&mut self) -> bool {
        let recovered = self.is_unhealthy;
        self.is_unhealthy = false;
        self.consecutive_failures = 0;
        recovered
    }

    /// Record a failing check against `threshold`.
    pub(crate) fn record_failure(&mut self, threshold: u32) -> FailureOutcome {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let failures = self.consecutive_failures;

        if self.is_unhealthy {
            FailureOutcome::StillUnhealthy { failures }
        } else if failures >= threshold {
            self.is_unhealthy = true;
            FailureOutcome::BecameUnhealthy { failures }
        } else {
            FailureOutcome::Counted { failures }
        }
    }
}
