//! Reference action: restart a program under Supervisor.

use async_trait::async_trait;
use serde::Deserialize;

use healwatch_core::keys;

use crate::capability::{Action, parse_config};
use crate::error::{RestartError, RestartResult};
use crate::logger::TaskLogger;

/// `restart_supervisor_program`: runs `supervisorctl restart <program>`.
///
/// The monitor fills in `supervisor_program_name` from the task's
/// `process_name` when the action config leaves it out.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestartSupervisorProgram;

#[derive(Debug, Deserialize)]
struct RestartConfig {
    supervisor_program_name: Option<String>,
    #[serde(default = "default_supervisorctl")]
    supervisorctl: String,
}

#[async_trait]
impl Action for RestartSupervisorProgram {
    async fn execute(&self, config: &toml::Table, log: &TaskLogger) {
        let config: RestartConfig = match parse_config(config) {
            Ok(c) => c,
            Err(e) => {
                log.error(format_args!("Restart action: invalid action_config: {e}"));
                return;
            }
        };
        let Some(program) = config.supervisor_program_name.filter(|p| !p.is_empty()) else {
            log.error(format_args!(
                "Restart action: '{}' not provided.",
                keys::ACTION_SUPERVISOR_PROGRAM_NAME
            ));
            return;
        };

        log.info(format_args!(
            "Attempting to restart supervisord program: {program}..."
        ));
        match restart_program(&config.supervisorctl, &program).await {
            Ok(()) => log.info(format_args!(
                "Supervisord program '{program}' restart command issued successfully."
            )),
            Err(e @ RestartError::NotFound(_)) => log.error(e),
            Err(e) => log.error(format_args!(
                "Failed to restart supervisord program '{program}': {e}"
            )),
        }
    }
}

/// Run `<supervisorctl> restart <program>` and wait for it to finish.
pub async fn restart_program(supervisorctl: &str, program: &str) -> RestartResult<()> {
    let output = tokio::process::Command::new(supervisorctl)
        .arg("restart")
        .arg(program)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                RestartError::NotFound(supervisorctl.to_string())
            } else {
                RestartError::Spawn {
                    program: supervisorctl.to_string(),
                    source,
                }
            }
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(RestartError::NonZeroExit {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

fn default_supervisorctl() -> String {
    keys::DEFAULT_SUPERVISORCTL.to_string()
}
