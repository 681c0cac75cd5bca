//! healwatch-core — task configuration for the Healwatch monitor.
//!
//! Defines the per-task descriptors consumed by `healwatch-monitor`, the
//! monitor-wide settings, and loading of both from a TOML file:
//!
//! ```toml
//! [monitor]
//! log_channel = "HealthMonitor"
//! loop_sleep_interval = "1s"
//!
//! [[tasks]]
//! name = "ufmhealthd"
//! enabled = true
//! process_name = "ufmhealthd"
//! check_interval_seconds = 30
//! check_type = "http_get"
//! action_on_failure = "restart_supervisor_program"
//! consecutive_failures_threshold = 3
//!
//! [tasks.check_config]
//! url = "http://127.0.0.1:8080/healthz"
//! ```
//!
//! `check_config` and `action_config` are opaque tables: only the check or
//! action selected by name knows how to read them.

pub mod config;
pub mod error;
pub mod keys;

pub use config::{HealthwatchConfig, MonitorSettings, TaskConfig, parse_duration};
pub use error::{ConfigError, ConfigResult};
