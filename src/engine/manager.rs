// ABOUTME: Task lifecycle management and dependency resolution
// ABOUTME: Flattens the task forest, tracks per-task state, and computes readiness

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::plan::{Plan, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Ready,
    Running,
    Completed,
    Failed,
    /// Reserved. The engine never assigns this; dependents of a failed task
    /// stay pending and surface through stuck detection instead.
    Blocked,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "PENDING"),
            TaskStatus::Ready => write!(f, "READY"),
            TaskStatus::Running => write!(f, "RUNNING"),
            TaskStatus::Completed => write!(f, "COMPLETED"),
            TaskStatus::Failed => write!(f, "FAILED"),
            TaskStatus::Blocked => write!(f, "BLOCKED"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub ready: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Tracks the lifecycle of every task in a plan, including hierarchical
/// containment: a task with subtasks acts as a gate for its children and is
/// never dispatched itself.
///
/// The manager is owned by exactly one scheduler loop for the duration of a
/// run; all mutation happens from that loop, so no internal locking is
/// needed.
pub struct TaskManager {
    tasks: IndexMap<String, Task>,
    states: IndexMap<String, TaskStatus>,
    dependencies: HashMap<String, Vec<String>>,
    parent_map: HashMap<String, String>,
    children_map: HashMap<String, Vec<String>>,
    results: HashMap<String, String>,
}

impl TaskManager {
    /// Build a manager from a plan, registering every task in the forest
    /// (including nested subtasks) in depth-first order.
    pub fn new(plan: &Plan) -> Self {
        let mut manager = Self {
            tasks: IndexMap::new(),
            states: IndexMap::new(),
            dependencies: HashMap::new(),
            parent_map: HashMap::new(),
            children_map: HashMap::new(),
            results: HashMap::new(),
        };

        manager.flatten(&plan.tasks, None);
        manager
    }

    fn flatten(&mut self, tasks: &[Task], parent_id: Option<&str>) {
        for task in tasks {
            if self.tasks.contains_key(&task.id) {
                warn!(task_id = %task.id, "duplicate task id; last registration wins");
            }

            self.tasks.insert(task.id.clone(), task.clone());
            self.states.insert(task.id.clone(), TaskStatus::Pending);
            self.dependencies.insert(task.id.clone(), task.deps.clone());

            if let Some(parent) = parent_id {
                self.parent_map.insert(task.id.clone(), parent.to_string());
                self.children_map
                    .entry(parent.to_string())
                    .or_default()
                    .push(task.id.clone());
            }

            if !task.subtasks.is_empty() {
                self.flatten(&task.subtasks, Some(&task.id));
            }
        }
    }

    /// Return every task that is eligible for dispatch right now.
    ///
    /// Pending leaves whose dependencies are complete (and whose parent, if
    /// any, is running) transition to READY and are returned. A pending
    /// container meeting the same condition is auto-started to RUNNING in
    /// place and is not returned; its children become visible on a later
    /// call. Tasks left in READY by a previous call are returned again, so
    /// callers must filter out ids they have already dispatched.
    pub fn get_ready_tasks(&mut self) -> Vec<Task> {
        let pending_ids: Vec<String> = self
            .states
            .iter()
            .filter(|(_, state)| **state == TaskStatus::Pending)
            .map(|(id, _)| id.clone())
            .collect();

        let mut ready_tasks = Vec::new();
        for task_id in pending_ids {
            if !self.can_start(&task_id) {
                continue;
            }

            let task = self.tasks[&task_id].clone();
            if task.is_container() {
                // Containers are auto-started to unlock their children; the
                // children surface on the next readiness poll.
                info!(task_id = %task_id, "auto-starting container task");
                self.mark_running(&task_id);
            } else {
                self.transition_state(&task_id, TaskStatus::Ready);
                ready_tasks.push(task);
            }
        }

        for (task_id, state) in &self.states {
            if *state == TaskStatus::Ready && !ready_tasks.iter().any(|t| &t.id == task_id) {
                ready_tasks.push(self.tasks[task_id].clone());
            }
        }

        ready_tasks
    }

    /// A task can start once all its dependencies are complete and its
    /// parent container (if any) is running.
    fn can_start(&self, task_id: &str) -> bool {
        if !self.dependencies_met(task_id) {
            return false;
        }

        match self.parent_map.get(task_id) {
            Some(parent_id) => self.states.get(parent_id) == Some(&TaskStatus::Running),
            None => true,
        }
    }

    fn dependencies_met(&self, task_id: &str) -> bool {
        self.dependencies
            .get(task_id)
            .map(|deps| {
                deps.iter()
                    .all(|dep| self.states.get(dep) == Some(&TaskStatus::Completed))
            })
            .unwrap_or(true)
    }

    pub fn transition_state(&mut self, task_id: &str, new_state: TaskStatus) {
        let old_state = self.states.get(task_id).copied();
        if old_state != Some(new_state) {
            if let Some(old) = old_state {
                info!(task_id = %task_id, %old, %new_state, "task state transition");
            }
            self.states.insert(task_id.to_string(), new_state);
        }
    }

    pub fn mark_running(&mut self, task_id: &str) {
        self.transition_state(task_id, TaskStatus::Running);
    }

    /// Record a result and complete the task. If this was the last
    /// incomplete child of its parent, the parent completes too, cascading
    /// upward through arbitrarily deep nesting.
    pub fn mark_completed(&mut self, task_id: &str, result: String) {
        self.results.insert(task_id.to_string(), result);
        self.transition_state(task_id, TaskStatus::Completed);

        if let Some(parent_id) = self.parent_map.get(task_id).cloned() {
            let all_done = self
                .children_map
                .get(&parent_id)
                .map(|siblings| {
                    siblings
                        .iter()
                        .all(|sib| self.states.get(sib) == Some(&TaskStatus::Completed))
                })
                .unwrap_or(false);

            if all_done {
                info!(parent_id = %parent_id, "all subtasks completed; completing parent");
                self.mark_completed(&parent_id, "All subtasks completed.".to_string());
            }
        }
    }

    /// Record the error and fail the task. Failure stays local: parents and
    /// dependents are not touched, so anything waiting on this task remains
    /// pending until stuck detection fires.
    pub fn mark_failed(&mut self, task_id: &str, error: String) {
        self.results.insert(task_id.to_string(), error);
        self.transition_state(task_id, TaskStatus::Failed);
    }

    /// True only when every registered task is COMPLETED; a single failed
    /// task makes this permanently false.
    pub fn is_all_completed(&self) -> bool {
        self.states
            .values()
            .all(|state| *state == TaskStatus::Completed)
    }

    pub fn status_of(&self, task_id: &str) -> Option<TaskStatus> {
        self.states.get(task_id).copied()
    }

    pub fn result_of(&self, task_id: &str) -> Option<&str> {
        self.results.get(task_id).map(String::as_str)
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for state in self.states.values() {
            match state {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Ready => counts.ready += 1,
                TaskStatus::Running => counts.running += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Failed => counts.failed += 1,
                TaskStatus::Blocked => {}
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn parent_of(&self, task_id: &str) -> Option<&str> {
        self.parent_map.get(task_id).map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn children_of(&self, task_id: &str) -> &[String] {
        self.children_map
            .get(task_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Plan, Task};

    fn leaf(id: &str, deps: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            description: format!("task {}", id),
            role: String::new(),
            agent: "w".to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
            subtasks: vec![],
            condition: None,
            action_verb: None,
            action_params: None,
        }
    }

    fn container(id: &str, deps: &[&str], subtasks: Vec<Task>) -> Task {
        let mut task = leaf(id, deps);
        task.subtasks = subtasks;
        task
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

    fn ready_ids(manager: &mut TaskManager) -> Vec<String> {
        manager
            .get_ready_tasks()
            .into_iter()
            .map(|t| t.id)
            .collect()
    }

    #[test]
    fn test_flattening_registers_every_node() {
        let p = plan(vec![
            container(
                "phase",
                &[],
                vec![leaf("c1", &[]), leaf("c2", &["c1"])],
            ),
            leaf("solo", &[]),
        ]);

        let manager = TaskManager::new(&p);
        assert_eq!(manager.len(), 4);
        assert_eq!(manager.parent_of("c1"), Some("phase"));
        assert_eq!(manager.parent_of("c2"), Some("phase"));
        assert_eq!(manager.parent_of("solo"), None);
        assert_eq!(manager.children_of("phase"), &["c1", "c2"]);
    }

    #[test]
    fn test_root_leaf_without_deps_is_immediately_ready() {
        let p = plan(vec![leaf("t1", &[])]);
        let mut manager = TaskManager::new(&p);

        assert_eq!(ready_ids(&mut manager), vec!["t1"]);
        assert_eq!(manager.status_of("t1"), Some(TaskStatus::Ready));
    }

    #[test]
    fn test_ready_is_idempotent_until_dispatched() {
        let p = plan(vec![leaf("t1", &[])]);
        let mut manager = TaskManager::new(&p);

        assert_eq!(ready_ids(&mut manager), vec!["t1"]);
        // Still READY; returned again without duplicates.
        assert_eq!(ready_ids(&mut manager), vec!["t1"]);

        manager.mark_running("t1");
        assert!(ready_ids(&mut manager).is_empty());
    }

    #[test]
    fn test_container_gating_has_one_tick_lag() {
        let p = plan(vec![container("phase", &[], vec![leaf("child", &[])])]);
        let mut manager = TaskManager::new(&p);

        // First call auto-starts the container but surfaces nothing.
        assert!(ready_ids(&mut manager).is_empty());
        assert_eq!(manager.status_of("phase"), Some(TaskStatus::Running));

        // The child becomes visible on the next call.
        assert_eq!(ready_ids(&mut manager), vec!["child"]);
    }

    #[test]
    fn test_dependent_gating() {
        let p = plan(vec![leaf("p", &[]), leaf("d", &["p"])]);
        let mut manager = TaskManager::new(&p);

        assert_eq!(ready_ids(&mut manager), vec!["p"]);
        manager.mark_running("p");
        assert!(ready_ids(&mut manager).is_empty());

        manager.mark_completed("p", "done".to_string());
        assert_eq!(ready_ids(&mut manager), vec!["d"]);
    }

    #[test]
    fn test_unresolvable_dependency_never_becomes_ready() {
        let p = plan(vec![leaf("t1", &["missing"])]);
        let mut manager = TaskManager::new(&p);

        assert!(ready_ids(&mut manager).is_empty());
        assert_eq!(manager.status_of("t1"), Some(TaskStatus::Pending));
        assert!(!manager.is_all_completed());
    }

    #[test]
    fn test_completion_cascades_to_parent() {
        let p = plan(vec![container(
            "phase",
            &[],
            vec![leaf("c1", &[]), leaf("c2", &[])],
        )]);
        let mut manager = TaskManager::new(&p);

        manager.get_ready_tasks(); // auto-start the container
        manager.mark_completed("c1", "r1".to_string());
        assert_eq!(manager.status_of("phase"), Some(TaskStatus::Running));

        manager.mark_completed("c2", "r2".to_string());
        assert_eq!(manager.status_of("phase"), Some(TaskStatus::Completed));
        assert_eq!(manager.result_of("phase"), Some("All subtasks completed."));
        assert!(manager.is_all_completed());
    }

    #[test]
    fn test_completion_cascades_through_deep_nesting() {
        let p = plan(vec![container(
            "outer",
            &[],
            vec![container("inner", &[], vec![leaf("leaf", &[])])],
        )]);
        let mut manager = TaskManager::new(&p);

        manager.get_ready_tasks(); // starts outer
        manager.get_ready_tasks(); // starts inner
        manager.mark_completed("leaf", "done".to_string());

        assert_eq!(manager.status_of("inner"), Some(TaskStatus::Completed));
        assert_eq!(manager.status_of("outer"), Some(TaskStatus::Completed));
        assert!(manager.is_all_completed());
    }

    #[test]
    fn test_failure_stays_local() {
        let p = plan(vec![leaf("a", &[]), leaf("b", &["a"])]);
        let mut manager = TaskManager::new(&p);

        manager.get_ready_tasks();
        manager.mark_running("a");
        manager.mark_failed("a", "boom".to_string());

        assert_eq!(manager.status_of("a"), Some(TaskStatus::Failed));
        assert_eq!(manager.status_of("b"), Some(TaskStatus::Pending));
        assert_eq!(manager.result_of("a"), Some("boom"));
        assert!(ready_ids(&mut manager).is_empty());
        assert!(!manager.is_all_completed());
    }

    #[test]
    fn test_duplicate_id_last_registration_wins() {
        let mut second = leaf("dup", &[]);
        second.description = "shadowing".to_string();
        let p = plan(vec![leaf("dup", &[]), second]);

        let manager = TaskManager::new(&p);
        assert_eq!(manager.len(), 1);
        assert_eq!(
            manager.tasks.get("dup").map(|t| t.description.as_str()),
            Some("shadowing")
        );
    }

    #[test]
    fn test_counts() {
        let p = plan(vec![leaf("a", &[]), leaf("b", &["a"]), leaf("c", &["a"])]);
        let mut manager = TaskManager::new(&p);

        manager.get_ready_tasks();
        manager.mark_running("a");
        let counts = manager.counts();
        assert_eq!(counts.running, 1);
        assert_eq!(counts.pending, 2);

        manager.mark_completed("a", "ok".to_string());
        manager.mark_failed("b", "no".to_string());
        let counts = manager.counts();
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.pending, 1);
    }
}
