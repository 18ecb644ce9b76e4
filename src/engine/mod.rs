// ABOUTME: Task scheduling and workflow execution engine module
// ABOUTME: Exposes the task manager, scheduler loop, control surface, and run events

pub mod context;
pub mod control;
pub mod error;
pub mod gate;
pub mod manager;
pub mod report;
pub mod runner;

pub use context::ExecutionContext;
pub use control::{ControlHandle, JobStatus};
pub use error::{EngineError, Result};
pub use gate::{AutoApprove, ConfirmationGate};
pub use manager::{StatusCounts, TaskManager, TaskStatus};
pub use report::{RunReport, RunStatus, TaskEvent, TaskOutcome};
pub use runner::WorkflowRunner;
