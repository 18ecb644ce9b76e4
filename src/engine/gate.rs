// ABOUTME: Human-in-the-loop confirmation gate for task dispatch
// ABOUTME: Defines the approval trait invoked between mark_running and worker dispatch

use async_trait::async_trait;

use crate::plan::Task;

/// An asynchronous veto interposed after a task is marked running and
/// before it reaches the worker. Returning `false` fails the task with
/// "Rejected by user" and it is never dispatched.
///
/// A runner without a gate approves everything.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn approve(&self, task: &Task) -> bool;
}

/// Approves every task. Useful as an explicit stand-in where a gate is
/// required structurally but no human is in the loop.
pub struct AutoApprove;

#[async_trait]
impl ConfirmationGate for AutoApprove {
    async fn approve(&self, _task: &Task) -> bool {
        true
    }
}
