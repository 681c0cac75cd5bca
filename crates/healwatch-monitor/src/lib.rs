//! healwatch-monitor — health checking and self-healing for supervised processes.
//!
//! A `HealthMonitor` owns a list of tasks, each pairing a named check with
//! a named corrective action. Checks and actions are resolved through
//! name-keyed registries, so host applications can plug in their own.
//!
//! # Architecture
//!
//! ```text
//! HealthMonitor::run()
//!   └── every loop pass, for each task in list order:
//!       ├── skip if disabled or not yet due
//!       ├── CheckRegistry[check_type].check(check_config) → bool
//!       ├── TaskState::record_success / record_failure
//!       └── on the healthy → unhealthy edge:
//!           ActionRegistry[action_on_failure].execute(action_config)
//! ```
//!
//! # Scheduling
//!
//! The loop is a single sequential scan. Checks and actions are awaited
//! inline, so a slow check delays every task after it in the same pass.
//! This suits a handful of checks with bounded timeouts; it does not
//! isolate tasks from each other.
//!
//! # Self-Healing
//!
//! When a task reaches `consecutive_failures_threshold` failed checks it is
//! marked unhealthy and its action runs once. Further failures only log.
//! The first successful check clears the unhealthy flag and re-arms the
//! action for the next failure episode.

pub mod actions;
pub mod capability;
pub mod checks;
pub mod error;
pub mod logger;
pub mod monitor;
pub mod state;

pub use actions::{RestartSupervisorProgram, restart_program};
pub use capability::{Action, ActionRegistry, Check, CheckRegistry, Registry};
pub use checks::{CommandCheck, HttpGetCheck};
pub use error::{RestartError, RestartResult};
pub use logger::TaskLogger;
pub use monitor::HealthMonitor;
pub use state::{FailureOutcome, TaskState};
