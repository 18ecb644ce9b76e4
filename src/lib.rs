// ABOUTME: Main library module for the muster plan execution engine
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod engine;
pub mod plan;
pub mod worker;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use engine::{
    ControlHandle, EngineError, ExecutionContext, JobStatus, RunReport, RunStatus, TaskEvent,
    TaskManager, TaskOutcome, TaskStatus, WorkflowRunner,
};
pub use plan::{Plan, PlanValidator, Task};
pub use worker::{CommandWorker, Worker, WorkerError};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
