//! Reference checks: HTTP GET status and command exit code.
//!
//! Both read their settings from the task's `check_config` table and turn
//! every fault (bad config, connection error, missing binary) into a logged
//! `false`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use healwatch_core::keys;

use crate::capability::{Check, parse_config};
use crate::logger::TaskLogger;

/// `http_get`: healthy iff a GET to `url` answers with `expected_status_code`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpGetCheck;

#[derive(Debug, Deserialize)]
struct HttpGetConfig {
    url: Option<String>,
    #[serde(default = "default_http_timeout")]
    timeout: f64,
    #[serde(default = "default_http_status")]
    expected_status_code: u16,
}

/// `command`: healthy iff `command` exits with `expected_return_code`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandCheck;

#[derive(Debug, Deserialize)]
struct CommandConfig {
    command: Option<Vec<String>>,
    #[serde(default = "default_return_code")]
    expected_return_code: i32,
}

#[async_trait]
impl Check for HttpGetCheck {
    async fn check(&self, config: &toml::Table, log: &TaskLogger) -> bool {
        let config: HttpGetConfig = match parse_config(config) {
            Ok(c) => c,
            Err(e) => {
                log.error(format_args!("HTTP check: invalid check_config: {e}"));
                return false;
            }
        };
        let Some(url) = config.url.filter(|u| !u.is_empty()) else {
            log.error(format_args!(
                "HTTP check: '{}' not provided in config.",
                keys::HTTP_URL
            ));
            return false;
        };
        let timeout = Duration::try_from_secs_f64(config.timeout)
            .unwrap_or(Duration::from_secs_f64(keys::DEFAULT_HTTP_TIMEOUT_SECS));

        match http_get_status(&url, timeout).await {
            Ok(status) if status == config.expected_status_code => {
                log.info(format_args!("HTTP check successful for {url}."));
                true
            }
            Ok(status) => {
                log.warn(format_args!(
                    "HTTP check for {url} failed. Status: {status} (expected {}).",
                    config.expected_status_code
                ));
                false
            }
            Err(reason) => {
                log.error(format_args!("HTTP check for {url} failed: {reason}"));
                false
            }
        }
    }
}

/// Perform a GET against `url` and return the final response status.
///
/// Redirects are followed up to `MAX_HTTP_REDIRECTS` hops. The whole
/// exchange, connect and TLS handshake included, is bounded by `timeout`.
async fn http_get_status(url: &str, timeout: Duration) -> Result<u16, String> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(keys::MAX_HTTP_REDIRECTS))
        .user_agent("healwatch/0.1")
        .build()
        .map_err(|e| format!("failed to build HTTP client: {e}"))?;

    let resp = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            format!("timed out after {timeout:?}")
        } else if e.is_redirect() {
            format!("too many redirects: {e}")
        } else if e.is_builder() {
            format!("invalid url: {e}")
        } else {
            format!("request failed: {e}")
        }
    })?;
    Ok(resp.status().as_u16())
}

#[async_trait]
impl Check for CommandCheck {
    async fn check(&self, config: &toml::Table, log: &TaskLogger) -> bool {
        let config: CommandConfig = match parse_config(config) {
            Ok(c) => c,
            Err(e) => {
                log.error(format_args!(
                    "Command check: '{}' (list of strings) not provided or not a list: {e}",
                    keys::COMMAND_CMD
                ));
                return false;
            }
        };
        let command = match config.command.as_deref() {
            Some(command @ [_, ..]) => command,
            _ => {
                log.error(format_args!(
                    "Command check: '{}' (list of strings) not provided or not a list.",
                    keys::COMMAND_CMD
                ));
                return false;
            }
        };
        let display = command.join(" ");

        let output = match tokio::process::Command::new(&command[0])
            .args(&command[1..])
            .kill_on_drop(true)
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log.error(format_args!(
                    "Command check failed: Command not found - {}.",
                    command[0]
                ));
                return false;
            }
            Err(e) => {
                log.error(format_args!("Command check for {display} failed: {e}"));
                return false;
            }
        };

        // A process killed by a signal has no code and never matches.
        if output.status.code() == Some(config.expected_return_code) {
            log.info(format_args!("Command check successful: {display}."));
            return true;
        }

        log.warn(format_args!(
            "Command check failed: {display}. RC: {} (expected {}).\n--> STDOUT: {}\n--> STDERR: {}",
            output
                .status
                .code()
                .map_or_else(|| "none".to_string(), |c| c.to_string()),
            config.expected_return_code,
            String::from_utf8_lossy(&output.stdout).trim(),
            String::from_utf8_lossy(&output.stderr).trim(),
        ));
        false
    }
}

fn default_http_timeout() -> f64 {
    keys::DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_http_status() -> u16 {
    keys::DEFAULT_HTTP_STATUS_CODE_OK
}

fn default_return_code() -> i32 {
    keys::DEFAULT_COMMAND_RETURN_CODE_OK
}
