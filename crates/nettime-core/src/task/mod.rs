//! Server-side asynchronous tasks.
//!
//! Long-running queries (day results, access clockings) answer with a task
//! id instead of data. The task is then polled until it reports completion
//! and its result is fetched from a separate endpoint.

mod poller;

pub use poller::{PollConfig, TaskPoller};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle of a server-side task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wrap a task id returned by the server.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response of an endpoint that starts an async job.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStarted {
    /// Handle to poll.
    pub task_id: TaskId,
}

/// Response of the task status endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TaskStatus {
    /// Whether the result is ready.
    #[serde(default)]
    pub completed: bool,
}

/// Lifecycle of an [`AsyncTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// The server accepted the job.
    Submitted,
    /// At least one status call reported the task as running.
    Polling,
    /// The server reported completion; the result is not fetched yet.
    Completed,
    /// The result payload has been fetched.
    ResultFetched,
}

/// Client-side view of one server task.
#[derive(Debug, Clone)]
pub struct AsyncTask {
    id: TaskId,
    state: TaskState,
    polls: u32,
    result: Option<serde_json::Value>,
}

impl AsyncTask {
    /// Track a task the server just accepted.
    pub fn submitted(id: TaskId) -> Self {
        Self {
            id,
            state: TaskState::Submitted,
            polls: 0,
            result: None,
        }
    }

    /// Returns the task id.
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the current state.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Returns true once the server has reported completion.
    pub fn is_completed(&self) -> bool {
        matches!(self.state, TaskState::Completed | TaskState::ResultFetched)
    }

    /// Number of status calls recorded so far.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Returns the result payload, available only in [`TaskState::ResultFetched`].
    pub fn result(&self) -> Option<&serde_json::Value> {
        self.result.as_ref()
    }

    /// Consume the task and return its result payload.
    pub fn into_result(self) -> Option<serde_json::Value> {
        self.result
    }

    /// Record one status answer.
    ///
    /// A completed task stays completed whatever later answers say.
    pub fn record_status(&mut self, status: TaskStatus) {
        self.polls = self.polls.saturating_add(1);
        self.state = match self.state {
            TaskState::Submitted | TaskState::Polling if status.completed => TaskState::Completed,
            TaskState::Submitted | TaskState::Polling => TaskState::Polling,
            done => done,
        };
    }

    /// Attach the fetched result. Only a completed task accepts one.
    ///
    /// Returns false and leaves the task untouched otherwise.
    pub fn record_result(&mut self, result: serde_json::Value) -> bool {
        if self.state != TaskState::Completed {
            return false;
        }
        self.result = Some(result);
        self.state = TaskState::ResultFetched;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_machine_happy_path() {
        let mut task = AsyncTask::submitted(TaskId::new("t-1"));
        assert_eq!(task.state(), TaskState::Submitted);

        task.record_status(TaskStatus { completed: false });
        assert_eq!(task.state(), TaskState::Polling);

        task.record_status(TaskStatus { completed: true });
        assert_eq!(task.state(), TaskState::Completed);
        assert!(task.result().is_none());

        assert!(task.record_result(json!({"rows": 1})));
        assert_eq!(task.state(), TaskState::ResultFetched);
        assert_eq!(task.polls(), 2);
        assert_eq!(task.into_result(), Some(json!({"rows": 1})));
    }

    #[test]
    fn completed_never_returns_to_polling() {
        let mut task = AsyncTask::submitted(TaskId::new("t-2"));
        task.record_status(TaskStatus { completed: true });
        task.record_status(TaskStatus { completed: false });
        assert_eq!(task.state(), TaskState::Completed);
    }

    #[test]
    fn result_rejected_before_completion() {
        let mut task = AsyncTask::submitted(TaskId::new("t-3"));
        assert!(!task.record_result(json!(null)));
        assert_eq!(task.state(), TaskState::Submitted);
        assert!(task.result().is_none());
    }

    #[test]
    fn task_started_reads_camel_case() {
        let started: TaskStarted = serde_json::from_value(json!({"taskId": "abc"})).unwrap();
        assert_eq!(started.task_id.as_str(), "abc");
    }
}
