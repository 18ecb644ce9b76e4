// ABOUTME: Concurrent scheduler loop driving a plan to completion
// ABOUTME: Dispatches ready tasks to the worker, waits first-completed, and streams events

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::context::ExecutionContext;
use super::control::{ControlHandle, JobStatus};
use super::error::{EngineError, Result};
use super::gate::ConfirmationGate;
use super::manager::TaskManager;
use super::report::{RunReport, RunStatus, TaskEvent, TaskOutcome};
use crate::plan::{Plan, Task};
use crate::worker::Worker;

const REJECTED_BY_USER: &str = "Rejected by user";

/// Drives one plan to completion against a worker.
///
/// The loop itself is single-threaded and cooperative: scheduling decisions
/// never run concurrently with each other, while dispatched tasks execute as
/// independent operations on the runtime, bounded only by how many are
/// ready at once.
pub struct WorkflowRunner {
    worker: Arc<dyn Worker>,
    gate: Option<Arc<dyn ConfirmationGate>>,
    control: ControlHandle,
    poll_interval: Duration,
}

impl WorkflowRunner {
    pub fn new(worker: Arc<dyn Worker>) -> Self {
        Self {
            worker,
            gate: None,
            control: ControlHandle::new(),
            poll_interval: Duration::from_millis(100),
        }
    }

    /// Install a human-in-the-loop confirmation gate consulted before every
    /// dispatch.
    pub fn with_gate(mut self, gate: Arc<dyn ConfirmationGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// How long the loop sleeps between status polls while paused.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// A cloneable handle for pausing, resuming, or cancelling this run
    /// from outside the loop.
    pub fn control_handle(&self) -> ControlHandle {
        self.control.clone()
    }

    /// Run the plan, yielding one event per dispatched task in completion
    /// order. The stream ends when the forest is complete, the run is
    /// cancelled, or with `EngineError::Stuck` when no progress is possible.
    pub fn run(&self, plan: Plan) -> impl Stream<Item = Result<TaskEvent>> + '_ {
        let context = ExecutionContext::new(plan.high_level_goal.clone());
        self.run_with_context(plan, context)
    }

    /// Like [`run`](Self::run), but with a caller-supplied context so the
    /// artifact store can be shared or inspected after the run.
    pub fn run_with_context(
        &self,
        plan: Plan,
        context: ExecutionContext,
    ) -> impl Stream<Item = Result<TaskEvent>> + '_ {
        try_stream! {
            let mut manager = TaskManager::new(&plan);
            let mut in_flight: JoinSet<(Task, crate::worker::Result<String>)> = JoinSet::new();
            let mut in_flight_ids: HashSet<String> = HashSet::new();

            info!(
                run_id = %context.run_id,
                goal = %context.goal,
                tasks = manager.len(),
                "starting workflow"
            );

            while !manager.is_all_completed() {
                // Pause defers new dispatches; in-flight work keeps running.
                while self.control.status().await == JobStatus::Paused {
                    sleep(self.poll_interval).await;
                }

                if matches!(
                    self.control.status().await,
                    JobStatus::Cancelling | JobStatus::Cancelled
                ) {
                    break;
                }

                let ready = manager.get_ready_tasks();
                for task in ready {
                    if in_flight_ids.contains(&task.id) {
                        continue;
                    }

                    manager.mark_running(&task.id);

                    if let Some(gate) = &self.gate {
                        info!(task_id = %task.id, description = %task.description, "requesting confirmation");
                        if !gate.approve(&task).await {
                            Self::reject(&mut manager, &task.id);
                            continue;
                        }
                    }

                    let worker = Arc::clone(&self.worker);
                    let task_context = context.clone();
                    in_flight_ids.insert(task.id.clone());
                    in_flight.spawn(async move {
                        let result = worker.execute(&task_context, &task).await;
                        (task, result)
                    });
                }

                if in_flight.is_empty() {
                    if manager.is_all_completed() {
                        break;
                    }
                    let counts = manager.counts();
                    error!(
                        pending = counts.pending,
                        failed = counts.failed,
                        "workflow stuck: no running tasks and not all tasks completed"
                    );
                    Err(EngineError::Stuck {
                        pending: counts.pending,
                        failed: counts.failed,
                    })?;
                }

                // Wait for whichever in-flight task finishes first.
                if let Some(joined) = in_flight.join_next().await {
                    let (task, result) = joined?;
                    in_flight_ids.remove(&task.id);
                    yield Self::settle(&mut manager, task, result);
                }
            }

            // Cancellation lets in-flight operations finish but issues no
            // new dispatches; their events are still reported.
            if self.control.status().await == JobStatus::Cancelling {
                while let Some(joined) = in_flight.join_next().await {
                    let (task, result) = joined?;
                    in_flight_ids.remove(&task.id);
                    yield Self::settle(&mut manager, task, result);
                }
                self.control.acknowledge_cancelled().await;
                info!(run_id = %context.run_id, "workflow cancelled");
            } else {
                info!(run_id = %context.run_id, "workflow complete");
            }
        }
    }

    /// Fail a rejected task with the fixed result text. It is never
    /// dispatched and yields no event.
    fn reject(manager: &mut TaskManager, task_id: &str) {
        warn!(task_id = %task_id, "task rejected by user; skipping dispatch");
        manager.mark_failed(task_id, REJECTED_BY_USER.to_string());
    }

    /// Apply one completed operation to the manager and build its event.
    fn settle(
        manager: &mut TaskManager,
        task: Task,
        result: crate::worker::Result<String>,
    ) -> TaskEvent {
        match result {
            Ok(output) => {
                manager.mark_completed(&task.id, output.clone());
                TaskEvent {
                    task,
                    outcome: TaskOutcome::Completed(output),
                }
            }
            Err(err) => {
                let message = err.to_string();
                error!(task_id = %task.id, error = %message, "task execution failed");
                manager.mark_failed(&task.id, message.clone());
                TaskEvent {
                    task,
                    outcome: TaskOutcome::Failed(message),
                }
            }
        }
    }

    /// Drain the event stream into an aggregate report. A stuck workflow
    /// surfaces as `Err(EngineError::Stuck)`, never as a completed report.
    pub async fn run_to_completion(&self, plan: Plan) -> Result<RunReport> {
        let context = ExecutionContext::new(plan.high_level_goal.clone());
        let mut report = RunReport::new(context.run_id.clone(), context.goal.clone());

        {
            let stream = self.run_with_context(plan, context);
            tokio::pin!(stream);
            while let Some(event) = stream.next().await {
                report.record(event?);
            }
        }

        let status = if self.control.status().await == JobStatus::Cancelled {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };
        report.finish(status);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoWorker;

    #[async_trait]
    impl Worker for EchoWorker {
        async fn execute(
            &self,
            _context: &ExecutionContext,
            task: &Task,
        ) -> crate::worker::Result<String> {
            Ok(format!("echo:{}", task.id))
        }
    }

    fn leaf(id: &str, deps: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            description: format!("task {}", id),
            role: String::new(),
            agent: "echo".to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
            subtasks: vec![],
            condition: None,
            action_verb: None,
            action_params: None,
        }
    }

    fn plan(tasks: Vec<Task>) -> Plan {
        Plan {
            high_level_goal: "test".to_string(),
            reasoning: None,
            roles: vec![],
            tasks,
            team: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_linear_chain_runs_in_order() {
        let runner = WorkflowRunner::new(Arc::new(EchoWorker));
        let report = runner
            .run_to_completion(plan(vec![leaf("t1", &[]), leaf("t2", &["t1"])]))
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.completed_tasks, 2);
        assert_eq!(report.failed_tasks, 0);
        let order: Vec<&str> = report.events.iter().map(|e| e.task.id.as_str()).collect();
        assert_eq!(order, vec!["t1", "t2"]);
    }

    #[test]
    fn test_rejection_records_fixed_result_text() {
        use super::super::manager::TaskStatus;

        let mut manager = TaskManager::new(&plan(vec![leaf("t1", &[])]));
        manager.get_ready_tasks();
        manager.mark_running("t1");

        WorkflowRunner::reject(&mut manager, "t1");

        assert_eq!(manager.status_of("t1"), Some(TaskStatus::Failed));
        assert_eq!(manager.result_of("t1"), Some("Rejected by user"));
    }

    #[tokio::test]
    async fn test_stuck_on_unresolvable_dependency() {
        let runner = WorkflowRunner::new(Arc::new(EchoWorker));
        let err = runner
            .run_to_completion(plan(vec![leaf("t1", &["missing"])]))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Stuck { pending: 1, failed: 0 }));
    }
}
