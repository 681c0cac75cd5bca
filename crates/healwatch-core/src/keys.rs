//! Well-known type names, capability config keys, and defaults.
//!
//! Check and action registries are open, so these only cover the
//! reference implementations shipped with `healwatch-monitor`.

// ── Check & action type names ─────────────────────────────────────

pub const CHECK_TYPE_HTTP_GET: &str = "http_get";
pub const CHECK_TYPE_COMMAND: &str = "command";
pub const ACTION_TYPE_RESTART_SUPERVISOR_PROGRAM: &str = "restart_supervisor_program";

// ── http_get check_config keys ────────────────────────────────────

pub const HTTP_URL: &str = "url";

// ── command check_config keys ─────────────────────────────────────

pub const COMMAND_CMD: &str = "command";

// ── restart_supervisor_program action_config keys ─────────────────

pub const ACTION_SUPERVISOR_PROGRAM_NAME: &str = "supervisor_program_name";

// ── Defaults ──────────────────────────────────────────────────────

pub const DEFAULT_HTTP_TIMEOUT_SECS: f64 = 5.0;
pub const DEFAULT_HTTP_STATUS_CODE_OK: u16 = 200;
pub const MAX_HTTP_REDIRECTS: usize = 30;
pub const DEFAULT_COMMAND_RETURN_CODE_OK: i32 = 0;
pub const DEFAULT_SUPERVISORCTL: &str = "supervisorctl";
pub const DEFAULT_CHECK_INTERVAL_SECS: f64 = 30.0;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 1;
pub const DEFAULT_LOOP_SLEEP_INTERVAL: &str = "1s";
pub const DEFAULT_LOG_CHANNEL: &str = "HealthMonitor";
