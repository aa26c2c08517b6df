//! Bounded polling of async tasks.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, instrument, trace};

use crate::Result;
use crate::error::TimeoutError;
use crate::traits::TaskApi;

use super::{AsyncTask, TaskId};

/// Backoff and bounds for [`TaskPoller`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    initial_delay: Duration,
    max_delay: Duration,
    backoff_factor: u32,
    max_polls: u32,
    max_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
            backoff_factor: 2,
            max_polls: 240,
            max_wait: Duration::from_secs(300),
        }
    }
}

impl PollConfig {
    /// Delay before the second status call.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Upper bound for a single delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Multiplier applied to the delay after every unfinished poll. `1` polls
    /// at a fixed interval.
    pub fn with_backoff_factor(mut self, factor: u32) -> Self {
        self.backoff_factor = factor.max(1);
        self
    }

    /// Maximum number of status calls.
    pub fn with_max_polls(mut self, polls: u32) -> Self {
        self.max_polls = polls.max(1);
        self
    }

    /// Maximum time spent polling one task.
    pub fn with_max_wait(mut self, wait: Duration) -> Self {
        self.max_wait = wait;
        self
    }

    /// Returns the maximum number of status calls.
    pub fn max_polls(&self) -> u32 {
        self.max_polls
    }

    /// Returns the maximum time spent polling one task.
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Delay to sleep after the `polls`-th unfinished status answer.
    pub fn delay_after(&self, polls: u32) -> Duration {
        let exponent = polls.saturating_sub(1);
        let factor = self.backoff_factor.saturating_pow(exponent);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Drives an async task from submission to its fetched result.
///
/// State transitions follow [`TaskState`](super::TaskState):
/// `Submitted → Polling → Completed → ResultFetched`.
#[derive(Debug, Clone, Default)]
pub struct TaskPoller {
    config: PollConfig,
}

impl TaskPoller {
    /// Create a poller with the given bounds.
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Returns the poller configuration.
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll `task_id` until it completes, then fetch its result.
    ///
    /// # Errors
    ///
    /// Fails with [`TimeoutError`] once the poll count or wait bound is
    /// exceeded. Errors from the API calls propagate unchanged; the remote
    /// task is left running in both cases.
    #[instrument(skip(self, api), fields(%task_id))]
    pub async fn wait<A>(&self, api: &mut A, task_id: TaskId) -> Result<AsyncTask>
    where
        A: TaskApi + ?Sized,
    {
        let started = Instant::now();
        let mut task = AsyncTask::submitted(task_id);

        loop {
            let status = api.task_status(task.id()).await?;
            task.record_status(status);
            trace!(polls = task.polls(), completed = status.completed, "task status");

            if task.is_completed() {
                break;
            }

            let elapsed = started.elapsed();
            if task.polls() >= self.config.max_polls || elapsed >= self.config.max_wait {
                return Err(TimeoutError {
                    task_id: task.id().to_string(),
                    polls: task.polls(),
                    elapsed,
                }
                .into());
            }

            let remaining = self.config.max_wait.saturating_sub(elapsed);
            sleep(self.config.delay_after(task.polls()).min(remaining)).await;
        }

        debug!(polls = task.polls(), "task completed, fetching result");
        let payload = api.task_response(task.id()).await?;
        task.record_result(payload);

        Ok(task)
    }

    /// Like [`wait`](Self::wait), returning only the result payload.
    pub async fn wait_result<A>(&self, api: &mut A, task_id: TaskId) -> Result<serde_json::Value>
    where
        A: TaskApi + ?Sized,
    {
        let task = self.wait(api, task_id).await?;
        Ok(task.into_result().unwrap_or(serde_json::Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::error::RemoteError;
    use crate::task::{TaskState, TaskStatus};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Replays a fixed sequence of status answers.
    struct ScriptedTasks {
        statuses: VecDeque<bool>,
        status_calls: u32,
        response_calls: u32,
        fail_status: bool,
    }

    impl ScriptedTasks {
        fn new(statuses: &[bool]) -> Self {
            Self {
                statuses: statuses.iter().copied().collect(),
                status_calls: 0,
                response_calls: 0,
                fail_status: false,
            }
        }
    }

    #[async_trait]
    impl TaskApi for ScriptedTasks {
        async fn task_status(&mut self, _task: &TaskId) -> Result<TaskStatus> {
            self.status_calls += 1;
            if self.fail_status {
                return Err(RemoteError::new(500, "status unavailable").into());
            }
            let completed = self.statuses.pop_front().unwrap_or(false);
            Ok(TaskStatus { completed })
        }

        async fn task_response(&mut self, task: &TaskId) -> Result<serde_json::Value> {
            self.response_calls += 1;
            Ok(json!({"task": task.as_str()}))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_completed_then_fetches_once() {
        let mut api = ScriptedTasks::new(&[false, false, true]);
        let poller = TaskPoller::default();

        let task = poller.wait(&mut api, TaskId::new("t-1")).await.unwrap();

        assert_eq!(api.status_calls, 3);
        assert_eq!(api.response_calls, 1);
        assert_eq!(task.state(), TaskState::ResultFetched);
        assert_eq!(task.result(), Some(&json!({"task": "t-1"})));
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_completion_does_not_sleep() {
        let mut api = ScriptedTasks::new(&[true]);
        let started = Instant::now();

        let result = TaskPoller::default()
            .wait_result(&mut api, TaskId::new("fast"))
            .await
            .unwrap();

        assert_eq!(result, json!({"task": "fast"}));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn max_polls_exceeded_times_out_without_fetching() {
        let mut api = ScriptedTasks::new(&[]);
        let poller = TaskPoller::new(PollConfig::default().with_max_polls(4));

        let err = poller.wait(&mut api, TaskId::new("stuck")).await.unwrap_err();

        match err {
            Error::Timeout(timeout) => {
                assert_eq!(timeout.task_id, "stuck");
                assert_eq!(timeout.polls, 4);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(api.status_calls, 4);
        assert_eq!(api.response_calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn max_wait_exceeded_times_out() {
        let mut api = ScriptedTasks::new(&[]);
        let config = PollConfig::default()
            .with_max_polls(u32::MAX)
            .with_initial_delay(Duration::from_secs(1))
            .with_backoff_factor(1)
            .with_max_wait(Duration::from_secs(5));

        let err = TaskPoller::new(config)
            .wait(&mut api, TaskId::new("slow"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout(_)));
        // One call at t=0 and one after each of the five 1s sleeps.
        assert_eq!(api.status_calls, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn status_error_propagates() {
        let mut api = ScriptedTasks::new(&[]);
        api.fail_status = true;

        let err = TaskPoller::default()
            .wait(&mut api, TaskId::new("broken"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Remote(_)));
        assert_eq!(api.status_calls, 1);
        assert_eq!(api.response_calls, 0);
    }

    #[test]
    fn delay_backs_off_up_to_max() {
        let config = PollConfig::default();
        assert_eq!(config.delay_after(1), Duration::from_millis(250));
        assert_eq!(config.delay_after(2), Duration::from_millis(500));
        assert_eq!(config.delay_after(3), Duration::from_secs(1));
        assert_eq!(config.delay_after(4), Duration::from_secs(2));
        assert_eq!(config.delay_after(40), Duration::from_secs(2));
    }
}
