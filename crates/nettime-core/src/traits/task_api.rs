//! Async task endpoints trait.

use async_trait::async_trait;

use crate::Result;
use crate::task::{TaskId, TaskStatus};

/// The two calls the [`TaskPoller`](crate::task::TaskPoller) needs from a
/// server connection.
///
/// Both take the connection mutably: a call may trigger a reconnect.
#[async_trait]
pub trait TaskApi: Send {
    /// Ask whether the task has completed.
    async fn task_status(&mut self, task: &TaskId) -> Result<TaskStatus>;

    /// Fetch the result payload of a completed task.
    async fn task_response(&mut self, task: &TaskId) -> Result<serde_json::Value>;
}
