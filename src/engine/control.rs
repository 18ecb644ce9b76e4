// ABOUTME: External control surface for a running workflow
// ABOUTME: Provides a shared job status that the scheduler polls at its checkpoints

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Paused,
    Cancelling,
    Cancelled,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Running => write!(f, "running"),
            JobStatus::Paused => write!(f, "paused"),
            JobStatus::Cancelling => write!(f, "cancelling"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A cloneable handle for pausing, resuming, and cancelling a run from
/// outside the scheduler loop. The loop only polls the status value at its
/// checkpoints; nothing here preempts in-flight work.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    status: Arc<RwLock<JobStatus>>,
}

impl ControlHandle {
    pub fn new() -> Self {
        Self {
            status: Arc::new(RwLock::new(JobStatus::Running)),
        }
    }

    pub async fn status(&self) -> JobStatus {
        *self.status.read().await
    }

    /// Pause issuing new dispatches. Has no effect unless the job is
    /// currently running.
    pub async fn pause(&self) {
        let mut status = self.status.write().await;
        if *status == JobStatus::Running {
            info!("job paused");
            *status = JobStatus::Paused;
        }
    }

    /// Resume a paused job. Has no effect in any other state.
    pub async fn resume(&self) {
        let mut status = self.status.write().await;
        if *status == JobStatus::Paused {
            info!("job resumed");
            *status = JobStatus::Running;
        }
    }

    /// Request cancellation. The scheduler observes this at its next
    /// checkpoint, stops creating dispatches, drains in-flight work, and
    /// acknowledges with `Cancelled`.
    pub async fn cancel(&self) {
        let mut status = self.status.write().await;
        if matches!(*status, JobStatus::Running | JobStatus::Paused) {
            info!("job cancellation requested");
            *status = JobStatus::Cancelling;
        }
    }

    pub(crate) async fn acknowledge_cancelled(&self) {
        let mut status = self.status.write().await;
        *status = JobStatus::Cancelled;
    }
}

impl Default for ControlHandle {
    fn default() -> Self {
        Self::new()
    }
}
