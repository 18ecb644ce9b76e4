// ABOUTME: Worker collaborator interface for task execution
// ABOUTME: Defines the dispatch boundary between the engine and pluggable task executors

pub mod command;

pub use command::CommandWorker;

use async_trait::async_trait;
use thiserror::Error;

use crate::engine::ExecutionContext;
use crate::plan::Task;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Task {task_id} failed: {message}")]
    ExecutionFailed { task_id: String, message: String },

    #[error("Invalid task parameters for {task_id}: {message}")]
    InvalidParameters { task_id: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WorkerError>;

/// Executes a single dispatched task. The engine invokes `execute` exactly
/// once per dispatch and treats any error as fatal for that task; retries,
/// if wanted, belong inside the worker.
#[async_trait]
pub trait Worker: Send + Sync {
    async fn execute(&self, context: &ExecutionContext, task: &Task) -> Result<String>;
}
