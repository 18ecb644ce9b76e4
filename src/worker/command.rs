// ABOUTME: Command worker executing task actions as shell commands
// ABOUTME: Interprets action_params as a command spec and captures its output

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use super::{Result, Worker, WorkerError};
use crate::engine::ExecutionContext;
use crate::plan::Task;

/// A worker that runs each task's `action_params` as a shell command and
/// returns captured stdout as the task result.
///
/// Parameter shape:
///
/// ```yaml
/// action_verb: run
/// action_params:
///   command: echo
///   args: ["hello"]
///   env:
///     LANG: C
/// ```
///
/// A task without parameters is treated as a described no-op and completes
/// with its own description, so purely narrative plans still run end to end.
pub struct CommandWorker {
    shell: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CommandParams {
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    script: Option<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default)]
    working_dir: Option<String>,
}

impl CommandWorker {
    pub fn new() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
        }
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    fn parse_params(task: &Task) -> Result<Option<CommandParams>> {
        match &task.action_params {
            Some(value) => {
                let params: CommandParams = serde_json::from_value(value.clone()).map_err(|e| {
                    WorkerError::InvalidParameters {
                        task_id: task.id.clone(),
                        message: e.to_string(),
                    }
                })?;
                Ok(Some(params))
            }
            None => Ok(None),
        }
    }
}

impl Default for CommandWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Worker for CommandWorker {
    async fn execute(&self, context: &ExecutionContext, task: &Task) -> Result<String> {
        let Some(params) = Self::parse_params(task)? else {
            debug!(task_id = %task.id, "no action parameters; completing as described no-op");
            return Ok(task.description.clone());
        };

        let mut cmd = match (&params.command, &params.script) {
            (Some(command), _) => {
                info!(task_id = %task.id, %command, "executing command");
                let mut cmd = Command::new(command);
                cmd.args(&params.args);
                cmd
            }
            (None, Some(script)) => {
                info!(task_id = %task.id, shell = %self.shell, "executing script");
                let mut cmd = Command::new(&self.shell);
                cmd.arg("-c").arg(script);
                cmd
            }
            (None, None) => {
                return Err(WorkerError::InvalidParameters {
                    task_id: task.id.clone(),
                    message: "action_params must provide 'command' or 'script'".to_string(),
                });
            }
        };

        cmd.envs(&params.env);
        if let Some(dir) = &params.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = cmd.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            return Err(WorkerError::ExecutionFailed {
                task_id: task.id.clone(),
                message: format!(
                    "exit code {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr
                ),
            });
        }

        context
            .record_artifact(format!("{}_result.txt", task.id), stdout.clone())
            .await;

        Ok(stdout)
    }
}
