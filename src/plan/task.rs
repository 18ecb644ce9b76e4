// ABOUTME: Task and plan data structures for the HTN execution engine
// ABOUTME: Defines the task forest, roles, and team metadata carried through a run

use serde::{Deserialize, Serialize};

/// A single node in the task forest. A task with `subtasks` is a container:
/// it gates its children and is never dispatched to a worker itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Task>,
    /// Guard expression carried through verbatim; the engine does not
    /// evaluate it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_verb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_params: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub high_level_goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Upstream planners may attach per-agent prompt overrides. The engine
/// carries these through untouched; applying them is worker-side behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSpec {
    #[serde(default)]
    pub prompts: Vec<PromptOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptOverride {
    pub agent: String,
    pub system_prompt: String,
}

impl Task {
    /// A leaf is dispatchable; a container only gates its children.
    pub fn is_container(&self) -> bool {
        !self.subtasks.is_empty()
    }

    /// Count of this task plus all nested subtasks.
    pub fn node_count(&self) -> usize {
        1 + self.subtasks.iter().map(Task::node_count).sum::<usize>()
    }
}

impl Plan {
    /// Total number of task nodes in the forest, including nested subtasks.
    pub fn node_count(&self) -> usize {
        self.tasks.iter().map(Task::node_count).sum()
    }

    /// Iterate over every task id in the forest, depth first.
    pub fn all_task_ids(&self) -> Vec<String> {
        fn walk(task: &Task, out: &mut Vec<String>) {
            out.push(task.id.clone());
            for sub in &task.subtasks {
                walk(sub, out);
            }
        }

        let mut ids = Vec::with_capacity(self.node_count());
        for task in &self.tasks {
            walk(task, &mut ids);
        }
        ids
    }
}
