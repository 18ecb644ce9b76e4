// ABOUTME: Command implementations for the muster CLI
// ABOUTME: Handles execution of run, validate, and init commands

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::config::Config;
use crate::engine::{ConfirmationGate, EngineError, TaskOutcome, WorkflowRunner};
use crate::plan::{Plan, PlanValidator, Task};
use crate::worker::CommandWorker;

/// Asks on the terminal before each dispatch. Anything other than `y` or
/// `yes` rejects the task.
struct PromptGate;

#[async_trait]
impl ConfirmationGate for PromptGate {
    async fn approve(&self, task: &Task) -> bool {
        let prompt = format!("Execute task '{}' ({})? [y/N] ", task.id, task.description);

        let answer = tokio::task::spawn_blocking(move || {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(prompt.as_bytes());
            let _ = stdout.flush();

            let mut line = String::new();
            match std::io::stdin().read_line(&mut line) {
                Ok(_) => line.trim().to_lowercase(),
                Err(_) => String::new(),
            }
        })
        .await
        .unwrap_or_default();

        matches!(answer.as_str(), "y" | "yes")
    }
}

/// Execute a plan file, streaming task events to stdout.
pub async fn run_plan(
    plan_path: PathBuf,
    confirm: bool,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    info!("Loading plan: {}", plan_path.display());
    let plan = Plan::from_file(&plan_path)?;

    let report = PlanValidator::new().validate(&plan);
    for warning in &report.warnings {
        warn!("{}", warning);
    }
    if !report.is_valid() {
        for error in &report.errors {
            eprintln!("error: {}", error);
        }
        return Err(anyhow::anyhow!("Plan validation failed"));
    }

    let worker = Arc::new(CommandWorker::new().with_shell(config.shell.clone()));
    let mut runner = WorkflowRunner::new(worker).with_poll_interval(config.poll_interval);
    if confirm {
        runner = runner.with_gate(Arc::new(PromptGate));
    }

    // Ctrl-C requests cooperative cancellation; in-flight tasks finish.
    let control = runner.control_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("cancellation requested; waiting for in-flight tasks");
            control.cancel().await;
        }
    });

    println!("Running plan: {}", plan.high_level_goal);

    let run_result = {
        let stream = runner.run(plan);
        tokio::pin!(stream);

        let mut events = Vec::new();
        let mut failed = 0usize;
        let mut run_error = None;

        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    match &event.outcome {
                        TaskOutcome::Completed(result) => {
                            println!("✓ {}: {}", event.task.id, summarize(result));
                        }
                        TaskOutcome::Failed(error) => {
                            failed += 1;
                            println!("✗ {}: {}", event.task.id, summarize(error));
                        }
                    }
                    events.push(event);
                }
                Err(e) => {
                    run_error = Some(e);
                    break;
                }
            }
        }

        (events, failed, run_error)
    };
    let (events, failed, run_error) = run_result;

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&events)?;
        std::fs::write(&path, json)?;
        info!("Events written to: {}", path.display());
    }

    match run_error {
        Some(e @ EngineError::Stuck { .. }) => {
            eprintln!("{}", e);
            Err(e.into())
        }
        Some(e) => Err(e.into()),
        None if failed > 0 => Err(anyhow::anyhow!("{} task(s) failed", failed)),
        None => {
            println!("Plan finished: {} task(s) completed", events.len());
            Ok(())
        }
    }
}

/// Validate a plan file without executing it.
pub async fn validate_plan(plan_path: PathBuf, _config: &Config) -> Result<()> {
    info!("Validating plan: {}", plan_path.display());

    let plan = Plan::from_file(&plan_path)?;
    let report = PlanValidator::new().validate(&plan);

    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    for error in &report.errors {
        println!("error: {}", error);
    }

    if report.is_valid() {
        println!("✓ Plan '{}' is valid", plan.high_level_goal);
        println!("  Tasks: {}", plan.node_count());
        Ok(())
    } else {
        Err(anyhow::anyhow!("Plan validation failed"))
    }
}

/// Write a starter plan file.
pub async fn init_plan(name: String, output_dir: PathBuf, _config: &Config) -> Result<()> {
    let path = output_dir.join(format!("{}.yaml", name));
    if path.exists() {
        return Err(anyhow::anyhow!("File already exists: {}", path.display()));
    }

    let template = format!(
        r#"high_level_goal: {name}
roles:
  - name: shell
    description: Runs commands on the local machine
tasks:
  - id: prepare
    description: Prepare the working area
    agent: shell
    action_verb: run
    action_params:
      command: echo
      args: ["preparing"]
  - id: build
    description: Container phase with two steps
    subtasks:
      - id: step_one
        description: First step
        agent: shell
        action_verb: run
        action_params:
          command: echo
          args: ["step one"]
      - id: step_two
        description: Second step, after step_one
        agent: shell
        deps: [step_one]
        action_verb: run
        action_params:
          command: echo
          args: ["step two"]
  - id: finish
    description: Runs once everything else is done
    agent: shell
    deps: [prepare, build]
    action_verb: run
    action_params:
      command: echo
      args: ["done"]
"#
    );

    std::fs::create_dir_all(&output_dir)?;
    std::fs::write(&path, template)?;
    println!("Created plan: {}", path.display());
    Ok(())
}

fn summarize(text: &str) -> String {
    let flat = text.replace('\n', " ");
    // Cut on a char boundary; a byte slice panics on multi-byte output.
    match flat.char_indices().nth(100) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
