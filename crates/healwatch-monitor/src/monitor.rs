//! Health monitor — the scheduling loop and failure/recovery dispatch.
//!
//! The `HealthMonitor` walks its task list once per pass, runs every task
//! that is due, and fires a task's failure action on the edge into the
//! unhealthy state.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use healwatch_core::{ConfigResult, HealthwatchConfig, TaskConfig, keys};

use crate::capability::{ActionRegistry, CheckRegistry};
use crate::logger::TaskLogger;
use crate::state::{FailureOutcome, TaskState};

/// Drives health checks and corrective actions for a fixed set of tasks.
///
/// State for every task lives here and is only touched by the loop, so no
/// locking is involved.
pub struct HealthMonitor {
    /// Named, unique tasks in configuration order.
    tasks: Vec<TaskConfig>,
    /// Runtime state: task name → state.
    states: HashMap<String, TaskState>,
    dispatcher: Dispatcher,
    loop_sleep: Duration,
}

/// Registries and logging context, split from the state map so a task's
/// state can be borrowed mutably while checks are dispatched.
struct Dispatcher {
    checks: CheckRegistry,
    actions: ActionRegistry,
    log_channel: String,
}

impl HealthMonitor {
    /// Create a monitor for `tasks`.
    ///
    /// Tasks without a name, or reusing an earlier task's name, are logged
    /// and left out of scheduling.
    pub fn new(
        tasks: Vec<TaskConfig>,
        checks: CheckRegistry,
        actions: ActionRegistry,
        log_channel: impl Into<String>,
        loop_sleep: Duration,
    ) -> Self {
        let log_channel = log_channel.into();
        let mut states = HashMap::new();
        let mut tracked = Vec::with_capacity(tasks.len());

        for task in tasks {
            let Some(name) = task.name.clone().filter(|n| !n.is_empty()) else {
                warn!(channel = %log_channel, "A task is missing a 'name'. It will be skipped.");
                continue;
            };
            if states.contains_key(&name) {
                warn!(
                    channel = %log_channel,
                    task = %name,
                    "Duplicate task name '{name}'. Only the first definition is monitored."
                );
                continue;
            }
            if task.recover_after_successes_threshold.is_some_and(|n| n > 1) {
                warn!(
                    channel = %log_channel,
                    task = %name,
                    "[{name}] recover_after_successes_threshold is ignored; \
                     the task recovers on its first successful check."
                );
            }
            states.insert(name, TaskState::new());
            tracked.push(task);
        }

        Self {
            tasks: tracked,
            states,
            dispatcher: Dispatcher {
                checks,
                actions,
                log_channel,
            },
            loop_sleep,
        }
    }

    /// Create a monitor from a loaded configuration file.
    pub fn from_config(
        config: HealthwatchConfig,
        checks: CheckRegistry,
        actions: ActionRegistry,
    ) -> ConfigResult<Self> {
        let loop_sleep = config.monitor.loop_sleep()?;
        Ok(Self::new(
            config.tasks,
            checks,
            actions,
            config.monitor.log_channel,
            loop_sleep,
        ))
    }

    /// Run the monitoring loop forever.
    ///
    /// Stopping the monitor is up to the host, e.g. by dropping this future.
    pub async fn run(&mut self) {
        info!(
            channel = %self.dispatcher.log_channel,
            tasks = self.tasks.len(),
            "Health Monitor started."
        );
        loop {
            self.run_pass().await;
            tokio::time::sleep(self.loop_sleep).await;
        }
    }

    /// Evaluate every task once, in list order.
    pub async fn run_pass(&mut self) {
        for task in &self.tasks {
            let Some(state) = task.name.as_deref().and_then(|n| self.states.get_mut(n)) else {
                continue;
            };
            self.dispatcher.run_task_check(task, state).await;
        }
    }

    /// Current state for a tracked task.
    pub fn task_state(&self, name: &str) -> Option<&TaskState> {
        self.states.get(name)
    }

    /// Names of the tasks being scheduled, in evaluation order.
    pub fn tracked_tasks(&self) -> Vec<&str> {
        self.tasks.iter().filter_map(|t| t.name.as_deref()).collect()
    }

    /// Pause between passes in [`HealthMonitor::run`].
    pub fn loop_sleep(&self) -> Duration {
        self.loop_sleep
    }

    /// Channel name attached to every task log event.
    pub fn log_channel(&self) -> &str {
        &self.dispatcher.log_channel
    }
}

impl Dispatcher {
    async fn run_task_check(&self, task: &TaskConfig, state: &mut TaskState) {
        if !task.enabled {
            return;
        }

        let now = Instant::now();
        if !state.is_due(now, task.check_interval()) {
            return;
        }
        // Claim the slot up front so a slow or failing check keeps cadence.
        state.mark_checked(now);

        let name = task.name.as_deref().unwrap_or_default();
        let log = TaskLogger::new(&self.log_channel, name);
        log.info("Performing health check...");

        let check_type = task.check_type.as_deref().unwrap_or_default();
        let Some(check) = self.checks.get(check_type) else {
            log.error(format_args!(
                "Unknown check_type: '{check_type}'. Skipping task."
            ));
            return;
        };

        if check.check(&task.check_config, &log).await {
            self.handle_healthy_task(state, &log);
        } else {
            self.handle_unhealthy_task(task, state, &log).await;
        }
    }

    fn handle_healthy_task(&self, state: &mut TaskState, log: &TaskLogger) {
        if state.record_success() {
            log.info("Service has recovered.");
        } else {
            log.debug("Health check passed.");
        }
    }

    async fn handle_unhealthy_task(&self, task: &TaskConfig, state: &mut TaskState, log: &TaskLogger) {
        let threshold = task.consecutive_failures_threshold;
        let outcome = state.record_failure(threshold);
        log.warn(format_args!(
            "Health check failed. Consecutive failures: {}.",
            outcome.failures()
        ));

        match outcome {
            FailureOutcome::Counted { .. } => {}
            FailureOutcome::BecameUnhealthy { failures } => {
                log.error(format_args!(
                    "Reached {failures} consecutive failures (threshold is {threshold}). Triggering: {}.",
                    task.action_on_failure.as_deref().unwrap_or("<none>")
                ));
                self.trigger_failure_action(task, log).await;
            }
            FailureOutcome::StillUnhealthy { .. } => {
                log.warn("Service unhealthy. Waiting for recovery before new actions.");
            }
        }
    }

    async fn trigger_failure_action(&self, task: &TaskConfig, log: &TaskLogger) {
        let action_type = task.action_on_failure.as_deref().unwrap_or_default();
        let Some(action) = self.actions.get(action_type) else {
            log.error(format_args!(
                "Unknown action_on_failure: '{action_type}'. No action taken."
            ));
            return;
        };

        let config = action_config_for(task);
        debug!(
            channel = %self.log_channel,
            task = %log.task(),
            action = %action_type,
            "dispatching failure action"
        );
        action.execute(&config, log).await;
    }
}

/// The action config to hand to the task's failure action.
///
/// For the supervisor restart action, a missing program name defaults to
/// the task's `process_name`.
fn action_config_for(task: &TaskConfig) -> toml::Table {
    let mut config = task.action_config.clone();
    let is_restart = task.action_on_failure.as_deref()
        == Some(keys::ACTION_TYPE_RESTART_SUPERVISOR_PROGRAM);

    if is_restart && !config.contains_key(keys::ACTION_SUPERVISOR_PROGRAM_NAME) {
        if let Some(process_name) = &task.process_name {
            config.insert(
                keys::ACTION_SUPERVISOR_PROGRAM_NAME.to_string(),
                toml::Value::String(process_name.clone()),
            );
        }
    }
    config
}
