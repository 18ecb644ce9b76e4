// ABOUTME: Error types for the workflow execution engine
// ABOUTME: Defines terminal run conditions distinct from per-task failures

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// No in-flight work and no newly-ready tasks while the plan is still
    /// incomplete: an unsatisfiable dependency graph, or every remaining
    /// task waits on a failed one.
    #[error("Workflow stuck: {pending} pending and {failed} failed tasks with nothing in flight")]
    Stuck { pending: usize, failed: usize },

    #[error("Plan error: {0}")]
    Plan(#[from] crate::plan::PlanError),

    #[error("Join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
