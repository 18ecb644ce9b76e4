// ABOUTME: Event and aggregate result types emitted by a workflow run
// ABOUTME: Defines per-task completion events and the collected run report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::plan::Task;

/// The outcome of one dispatched task, in completion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", content = "result", rename_all = "lowercase")]
pub enum TaskOutcome {
    Completed(String),
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    pub task: Task,
    pub outcome: TaskOutcome,
}

impl TaskEvent {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Completed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Aggregate view of a finished run, collected from the event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub goal: String,
    pub status: RunStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
    pub events: Vec<TaskEvent>,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
}

impl RunReport {
    pub fn new(run_id: String, goal: String) -> Self {
        Self {
            run_id,
            goal,
            status: RunStatus::Running,
            start_time: Utc::now(),
            end_time: None,
            duration: None,
            events: Vec::new(),
            completed_tasks: 0,
            failed_tasks: 0,
        }
    }

    pub fn record(&mut self, event: TaskEvent) {
        match event.outcome {
            TaskOutcome::Completed(_) => self.completed_tasks += 1,
            TaskOutcome::Failed(_) => self.failed_tasks += 1,
        }
        self.events.push(event);
    }

    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        let now = Utc::now();
        self.end_time = Some(now);
        self.duration = Some((now - self.start_time).to_std().unwrap_or(Duration::ZERO));
    }

    pub fn outcome_of(&self, task_id: &str) -> Option<&TaskOutcome> {
        self.events
            .iter()
            .find(|e| e.task.id == task_id)
            .map(|e| &e.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, outcome: TaskOutcome) -> TaskEvent {
        TaskEvent {
            task: Task {
                id: id.to_string(),
                description: String::new(),
                role: String::new(),
                agent: String::new(),
                deps: vec![],
                subtasks: vec![],
                condition: None,
                action_verb: None,
                action_params: None,
            },
            outcome,
        }
    }

    #[test]
    fn test_report_aggregation() {
        let mut report = RunReport::new("run-1".to_string(), "goal".to_string());
        assert_eq!(report.status, RunStatus::Running);

        report.record(event("a", TaskOutcome::Completed("ok".to_string())));
        report.record(event("b", TaskOutcome::Failed("boom".to_string())));
        report.finish(RunStatus::Completed);

        assert_eq!(report.completed_tasks, 1);
        assert_eq!(report.failed_tasks, 1);
        assert_eq!(report.status, RunStatus::Completed);
        assert!(report.duration.is_some());
        assert_eq!(
            report.outcome_of("a"),
            Some(&TaskOutcome::Completed("ok".to_string()))
        );
        assert_eq!(report.outcome_of("missing"), None);
    }
}
