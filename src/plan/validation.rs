// ABOUTME: Structural validation for task plans before execution
// ABOUTME: Surfaces duplicate ids, unknown dependencies, and dependency cycles

use petgraph::algo::toposort;
use petgraph::graph::{Graph, NodeIndex};
use std::collections::{HashMap, HashSet};

use super::task::{Plan, Task};

/// Validates a plan against the engine's structural invariants.
///
/// Most findings are warnings rather than errors: a duplicate id is resolved
/// by last-registration-wins, and an unknown or cyclic dependency leaves the
/// dependent permanently pending, which the scheduler reports as a stuck
/// workflow at run time.
pub struct PlanValidator;

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl PlanValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, plan: &Plan) -> ValidationReport {
        let mut report = ValidationReport::default();

        if plan.tasks.is_empty() {
            report.errors.push("plan defines no tasks".to_string());
            return report;
        }

        let mut flat: Vec<&Task> = Vec::new();
        for task in &plan.tasks {
            Self::collect(task, &mut flat);
        }

        let mut seen = HashSet::new();
        for task in &flat {
            if task.id.trim().is_empty() {
                report
                    .errors
                    .push(format!("task '{}' has an empty id", task.description));
            }

            if !seen.insert(task.id.clone()) {
                report.warnings.push(format!(
                    "duplicate task id '{}': the last registration wins",
                    task.id
                ));
            }

            if !task.is_container() && task.agent.trim().is_empty() {
                report.warnings.push(format!(
                    "leaf task '{}' names no agent; the worker decides how to handle it",
                    task.id
                ));
            }
        }

        let known: HashSet<&str> = flat.iter().map(|t| t.id.as_str()).collect();
        for task in &flat {
            for dep in &task.deps {
                if !known.contains(dep.as_str()) {
                    report.warnings.push(format!(
                        "task '{}' depends on unknown task '{}': it will never become ready",
                        task.id, dep
                    ));
                }
            }
        }

        self.check_cycles(&flat, &mut report);

        report
    }

    fn collect<'a>(task: &'a Task, out: &mut Vec<&'a Task>) {
        out.push(task);
        for sub in &task.subtasks {
            Self::collect(sub, out);
        }
    }

    /// Detect dependency cycles with a topological sort over the dep edges.
    /// A cycle never errors out a run; every task on it stays pending and
    /// the scheduler reports the workflow stuck instead.
    fn check_cycles(&self, flat: &[&Task], report: &mut ValidationReport) {
        let mut graph: Graph<String, ()> = Graph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

        for task in flat {
            let idx = graph.add_node(task.id.clone());
            indices.insert(task.id.as_str(), idx);
        }

        for task in flat {
            let to = indices[task.id.as_str()];
            for dep in &task.deps {
                if let Some(&from) = indices.get(dep.as_str()) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        if let Err(cycle) = toposort(&graph, None) {
            report.warnings.push(format!(
                "dependency cycle involving task '{}': the cycle will never unblock",
                graph[cycle.node_id()]
            ));
        }
    }
}

impl Default for PlanValidator {
    fn default() -> Self {
        Self::new()
    }
}
