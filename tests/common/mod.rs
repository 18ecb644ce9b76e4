// ABOUTME: Shared helpers for integration tests
// ABOUTME: Provides plan builders, scripted workers, and confirmation gates

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use muster::engine::{ConfirmationGate, ExecutionContext};
use muster::plan::{Plan, Task};
use muster::worker::{Worker, WorkerError};

pub fn leaf(id: &str, deps: &[&str]) -> Task {
    Task {
        id: id.to_string(),
        description: format!("task {}", id),
        role: String::new(),
        agent: "test".to_string(),
        deps: deps.iter().map(|d| d.to_string()).collect(),
        subtasks: vec![],
        condition: None,
        action_verb: None,
        action_params: None,
    }
}

pub fn container(id: &str, deps: &[&str], subtasks: Vec<Task>) -> Task {
    let mut task = leaf(id, deps);
    task.subtasks = subtasks;
    task
}

pub struct PlanBuilder {
    goal: String,
    tasks: Vec<Task>,
}

impl PlanBuilder {
    pub fn new(goal: &str) -> Self {
        Self {
            goal: goal.to_string(),
            tasks: Vec::new(),
        }
    }

    pub fn task(mut self, id: &str, deps: &[&str]) -> Self {
        self.tasks.push(leaf(id, deps));
        self
    }

    pub fn with(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn build(self) -> Plan {
        Plan {
            high_level_goal: self.goal,
            reasoning: None,
            roles: vec![],
            tasks: self.tasks,
            team: None,
            metadata: None,
        }
    }
}

/// A worker scripted per task id: optional delay, optional failure, and a
/// shared log of execution order for assertions.
#[derive(Clone, Default)]
pub struct ScriptedWorker {
    log: Arc<Mutex<Vec<String>>>,
    delays: HashMap<String, Duration>,
    failures: HashSet<String>,
}

impl ScriptedWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, task_id: &str, delay: Duration) -> Self {
        self.delays.insert(task_id.to_string(), delay);
        self
    }

    pub fn with_failure(mut self, task_id: &str) -> Self {
        self.failures.insert(task_id.to_string());
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Worker for ScriptedWorker {
    async fn execute(
        &self,
        _context: &ExecutionContext,
        task: &Task,
    ) -> Result<String, WorkerError> {
        self.log.lock().unwrap().push(task.id.clone());

        if let Some(delay) = self.delays.get(&task.id) {
            sleep(*delay).await;
        }

        if self.failures.contains(&task.id) {
            return Err(WorkerError::ExecutionFailed {
                task_id: task.id.clone(),
                message: "scripted failure".to_string(),
            });
        }

        Ok(format!("r:{}", task.id))
    }
}

/// Rejects a fixed set of task ids and approves everything else.
pub struct RejectingGate {
    rejected: HashSet<String>,
}

impl RejectingGate {
    pub fn new(rejected: &[&str]) -> Self {
        Self {
            rejected: rejected.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ConfirmationGate for RejectingGate {
    async fn approve(&self, task: &Task) -> bool {
        !self.rejected.contains(&task.id)
    }
}
