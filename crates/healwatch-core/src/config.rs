//! healwatch.toml configuration parser.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::keys;

/// Top-level configuration file: monitor settings plus the task list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HealthwatchConfig {
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

/// Settings for the monitor loop itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorSettings {
    /// Base log channel; every log line carries it as the `channel` field.
    #[serde(default = "default_log_channel")]
    pub log_channel: String,
    /// Sleep between loop passes (e.g., "1s", "500ms").
    #[serde(default = "default_loop_sleep_interval")]
    pub loop_sleep_interval: String,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            log_channel: default_log_channel(),
            loop_sleep_interval: default_loop_sleep_interval(),
        }
    }
}

impl MonitorSettings {
    /// Parsed `loop_sleep_interval`.
    pub fn loop_sleep(&self) -> ConfigResult<Duration> {
        parse_duration(&self.loop_sleep_interval)
            .ok_or_else(|| ConfigError::InvalidDuration(self.loop_sleep_interval.clone()))
    }
}

/// Static descriptor for one monitored resource.
///
/// A task without a `name` still parses; the monitor logs and skips it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskConfig {
    pub name: Option<String>,
    /// Disabled tasks are never evaluated.
    #[serde(default)]
    pub enabled: bool,
    /// Label used to fill in action config (e.g. the supervisor program).
    pub process_name: Option<String>,
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: f64,
    pub check_type: Option<String>,
    #[serde(default)]
    pub check_config: toml::Table,
    pub action_on_failure: Option<String>,
    #[serde(default)]
    pub action_config: toml::Table,
    /// Consecutive failed checks before the task is declared unhealthy.
    #[serde(default = "default_failure_threshold")]
    pub consecutive_failures_threshold: u32,
    /// Accepted for compatibility; recovery happens on the first success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recover_after_successes_threshold: Option<u32>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            name: None,
            enabled: false,
            process_name: None,
            check_interval_seconds: default_check_interval(),
            check_type: None,
            check_config: toml::Table::new(),
            action_on_failure: None,
            action_config: toml::Table::new(),
            consecutive_failures_threshold: default_failure_threshold(),
            recover_after_successes_threshold: None,
        }
    }
}

impl TaskConfig {
    /// An enabled task with the given name and default settings.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            enabled: true,
            ..Self::default()
        }
    }

    /// The check interval as a `Duration`.
    ///
    /// Negative or non-finite values collapse to zero, which makes the task
    /// due on every pass.
    pub fn check_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.check_interval_seconds).unwrap_or(Duration::ZERO)
    }
}

impl HealthwatchConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Collect non-fatal problems with the configuration.
    ///
    /// Nothing here stops the monitor: unnamed tasks are skipped and
    /// unknown check or action types degrade that task to a logged no-op.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        if self.monitor.loop_sleep().is_err() {
            warnings.push(format!(
                "monitor.loop_sleep_interval {:?} is not a valid duration",
                self.monitor.loop_sleep_interval
            ));
        }

        for (index, task) in self.tasks.iter().enumerate() {
            let Some(name) = task.name.as_deref().filter(|n| !n.is_empty()) else {
                warnings.push(format!("task #{index} has no name and will be skipped"));
                continue;
            };
            if !seen.insert(name) {
                warnings.push(format!("task {name:?} is defined more than once"));
            }
            if !(task.check_interval_seconds > 0.0) {
                warnings.push(format!(
                    "task {name:?}: check_interval_seconds must be positive (got {})",
                    task.check_interval_seconds
                ));
            }
            if task.consecutive_failures_threshold == 0 {
                warnings.push(format!(
                    "task {name:?}: consecutive_failures_threshold of 0 behaves like 1"
                ));
            }
            if task.check_type.is_none() {
                warnings.push(format!("task {name:?}: no check_type configured"));
            }
            if task.action_on_failure.is_none() {
                warnings.push(format!("task {name:?}: no action_on_failure configured"));
            }
            if task.recover_after_successes_threshold.is_some_and(|n| n > 1) {
                warnings.push(format!(
                    "task {name:?}: recover_after_successes_threshold is ignored, \
                     tasks recover on the first successful check"
                ));
            }
        }

        warnings
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
///
/// A plain number is taken as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

fn default_log_channel() -> String {
    keys::DEFAULT_LOG_CHANNEL.to_string()
}

fn default_loop_sleep_interval() -> String {
    keys::DEFAULT_LOOP_SLEEP_INTERVAL.to_string()
}

fn default_check_interval() -> f64 {
    keys::DEFAULT_CHECK_INTERVAL_SECS
}

fn default_failure_threshold() -> u32 {
    keys::DEFAULT_FAILURE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[monitor]
log_channel = "UfmHealth"
loop_sleep_interval = "500ms"

[[tasks]]
name = "ufmhealthd"
enabled = true
process_name = "ufmhealthd"
check_interval_seconds = 10
check_type = "http_get"
action_on_failure = "restart_supervisor_program"
consecutive_failures_threshold = 3

[tasks.check_config]
url = "http://127.0.0.1:8080/healthz"
timeout = 2

[[tasks]]
name = "disk"
check_type = "command"

[tasks.check_config]
command = ["test", "-d", "/var/log"]
"#;

    #[test]
    fn parse_full_config() {
        let config = HealthwatchConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.monitor.log_channel, "UfmHealth");
        assert_eq!(config.monitor.loop_sleep().unwrap(), Duration::from_millis(500));
        assert_eq!(config.tasks.len(), 2);

        let task = &config.tasks[0];
        assert_eq!(task.name.as_deref(), Some("ufmhealthd"));
        assert!(task.enabled);
        assert_eq!(task.check_interval(), Duration::from_secs(10));
        assert_eq!(task.consecutive_failures_threshold, 3);
        assert_eq!(
            task.check_config.get("url").and_then(|v| v.as_str()),
            Some("http://127.0.0.1:8080/healthz")
        );
        assert!(task.action_config.is_empty());
    }

    #[test]
    fn task_defaults_apply() {
        let config = HealthwatchConfig::from_toml_str(SAMPLE).unwrap();
        let task = &config.tasks[1];
        assert!(!task.enabled);
        assert_eq!(task.check_interval_seconds, keys::DEFAULT_CHECK_INTERVAL_SECS);
        assert_eq!(task.consecutive_failures_threshold, 1);
        assert!(task.action_on_failure.is_none());
        assert!(task.process_name.is_none());
    }

    #[test]
    fn empty_config_uses_monitor_defaults() {
        let config = HealthwatchConfig::from_toml_str("").unwrap();
        assert!(config.tasks.is_empty());
        assert_eq!(config.monitor.log_channel, "HealthMonitor");
        assert_eq!(config.monitor.loop_sleep().unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn unnamed_task_parses() {
        let config = HealthwatchConfig::from_toml_str("[[tasks]]\nenabled = true\n").unwrap();
        assert!(config.tasks[0].name.is_none());
        let warnings = config.validate();
        assert!(warnings.iter().any(|w| w.contains("has no name")));
    }

    #[test]
    fn validate_reports_duplicates_and_bad_values() {
        let toml_str = r#"
[monitor]
loop_sleep_interval = "soon"

[[tasks]]
name = "a"
check_interval_seconds = 0
consecutive_failures_threshold = 0
check_type = "command"
action_on_failure = "restart_supervisor_program"
recover_after_successes_threshold = 3

[[tasks]]
name = "a"
check_type = "command"
action_on_failure = "restart_supervisor_program"
"#;
        let config = HealthwatchConfig::from_toml_str(toml_str).unwrap();
        let warnings = config.validate();
        assert!(warnings.iter().any(|w| w.contains("loop_sleep_interval")));
        assert!(warnings.iter().any(|w| w.contains("more than once")));
        assert!(warnings.iter().any(|w| w.contains("must be positive")));
        assert!(warnings.iter().any(|w| w.contains("behaves like 1")));
        assert!(warnings.iter().any(|w| w.contains("recover_after_successes_threshold")));
    }

    #[test]
    fn valid_config_has_no_warnings() {
        let config = HealthwatchConfig::from_toml_str(
            r#"
[[tasks]]
name = "api"
enabled = true
check_type = "http_get"
action_on_failure = "restart_supervisor_program"
"#,
        )
        .unwrap();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn negative_interval_collapses_to_zero() {
        let task = TaskConfig {
            check_interval_seconds: -5.0,
            ..TaskConfig::named("x")
        };
        assert_eq!(task.check_interval(), Duration::ZERO);
    }

    #[test]
    fn fractional_interval() {
        let task = TaskConfig {
            check_interval_seconds: 0.25,
            ..TaskConfig::named("x")
        };
        assert_eq!(task.check_interval(), Duration::from_millis(250));
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = HealthwatchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.tasks.len(), 2);
    }

    #[test]
    fn from_file_missing_is_read_error() {
        let err = HealthwatchConfig::from_file(Path::new("/nonexistent/healwatch.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = HealthwatchConfig::from_toml_str("[[tasks]\nname = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("soon"), None);
    }

    #[test]
    fn parse_duration_minutes_overflow_is_invalid() {
        assert_eq!(parse_duration("307445734561825861m"), None);

        let config = HealthwatchConfig::from_toml_str(
            "[monitor]\nloop_sleep_interval = '307445734561825861m'\n",
        )
        .unwrap();
        assert!(matches!(
            config.monitor.loop_sleep(),
            Err(ConfigError::InvalidDuration(_))
        ));
    }
}
