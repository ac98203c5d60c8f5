//! Task polling
//!
//! Drives a submitted task to completion by querying its status at a fixed
//! interval until it reaches a terminal state or the attempt budget runs out.
//!
//! Failed status queries are logged and count as one attempt, the same as a
//! query that reports a non-terminal status. Dropping the returned future
//! stops polling.

use std::time::Duration;

use jimeng_core::domain::task::TaskStatus;
use tracing::{debug, error, info, warn};

use crate::error::{ClientError, Result};
use crate::generation::GenerationClient;

/// Timing of the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total time budget
    pub timeout: Duration,
    /// Sleep before each status query
    pub interval: Duration,
}

impl PollPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Number of status queries the budget allows (`timeout / interval`)
    pub fn max_attempts(&self) -> u32 {
        self.timeout
            .as_nanos()
            .checked_div(self.interval.as_nanos())
            .map_or(0, |n| n.min(u32::MAX as u128) as u32)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            interval: Duration::from_secs(5),
        }
    }
}

/// Result of waiting on a task that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Succeeded { task_id: String, video_url: String },
    /// The budget ran out before the task reached a terminal state
    TimedOut { task_id: String },
}

impl PollOutcome {
    pub fn task_id(&self) -> &str {
        match self {
            Self::Succeeded { task_id, .. } | Self::TimedOut { task_id } => task_id,
        }
    }

    /// The video reference, or an empty string on timeout
    pub fn video_url(&self) -> &str {
        match self {
            Self::Succeeded { video_url, .. } => video_url,
            Self::TimedOut { .. } => "",
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// `(video_url, task_id)` as handed back to the host
    pub fn into_parts(self) -> (String, String) {
        match self {
            Self::Succeeded { task_id, video_url } => (video_url, task_id),
            Self::TimedOut { task_id } => (String::new(), task_id),
        }
    }
}

/// Polls `task_id` until it succeeds, fails, or the policy's budget is spent
///
/// # Returns
/// - `Ok(PollOutcome::Succeeded)` with the video reference
/// - `Ok(PollOutcome::TimedOut)` when no terminal state was seen in time
/// - `Err(ClientError::TaskFailed)` when the task was failed or cancelled
pub async fn wait_for_task<C>(client: &C, task_id: &str, policy: &PollPolicy) -> Result<PollOutcome>
where
    C: GenerationClient + ?Sized,
{
    let max_attempts = policy.max_attempts();
    debug!(
        "Waiting for task {} ({} attempts every {:?})",
        task_id, max_attempts, policy.interval
    );

    for attempt in 1..=max_attempts {
        tokio::time::sleep(policy.interval).await;

        let task = match client.poll(task_id).await {
            Ok(task) => task,
            Err(e) => {
                warn!(
                    "Get task {} failed (attempt {}/{}), retry continue: {}",
                    task_id, attempt, max_attempts, e
                );
                continue;
            }
        };

        match task.status {
            TaskStatus::Succeeded => {
                let Some(video_url) = task.video_url() else {
                    return Err(ClientError::ParseError(format!(
                        "task {} succeeded without a video_url",
                        task_id
                    )));
                };
                info!("Task {} succeeded after {} attempt(s)", task_id, attempt);
                return Ok(PollOutcome::Succeeded {
                    task_id: task_id.to_string(),
                    video_url: video_url.to_string(),
                });
            }
            status if status.is_failure() => {
                match &task.error {
                    Some(cause) => error!(
                        "Task {} {}: {}: {}",
                        task_id, status, cause.code, cause.message
                    ),
                    None => error!("Task {} {}", task_id, status),
                }
                return Err(ClientError::TaskFailed {
                    task_id: task_id.to_string(),
                    status,
                });
            }
            status => {
                debug!("Task {} is {} (attempt {}/{})", task_id, status, attempt, max_attempts);
            }
        }
    }

    warn!(
        "Task {} did not finish within {:?}, giving up",
        task_id, policy.timeout
    );
    Ok(PollOutcome::TimedOut {
        task_id: task_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockArk, ScriptedClient, Step};
    use tokio::time::Instant;

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.max_attempts(), 60);
    }

    #[test]
    fn test_max_attempts_rounds_down() {
        let policy = PollPolicy::new(Duration::from_secs(12), Duration::from_secs(5));
        assert_eq!(policy.max_attempts(), 2);

        let zero = PollPolicy::new(Duration::from_secs(12), Duration::ZERO);
        assert_eq!(zero.max_attempts(), 0);
    }

    #[test]
    fn test_max_attempts_with_sub_millisecond_interval() {
        let policy = PollPolicy::new(Duration::from_millis(10), Duration::from_micros(500));
        assert_eq!(policy.max_attempts(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt() {
        let client = ScriptedClient::new([
            Step::Status(TaskStatus::Pending),
            Step::Status(TaskStatus::Running),
            Step::Status(TaskStatus::Succeeded),
        ]);
        let policy = PollPolicy::default();

        let start = Instant::now();
        let outcome = wait_for_task(&client, "cgt-1", &policy).await.unwrap();

        assert_eq!(client.polls(), 3);
        assert_eq!(start.elapsed(), policy.interval * 3);
        assert_eq!(
            outcome.into_parts(),
            (MockArk::VIDEO_URL.to_string(), "cgt-1".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_with_empty_result() {
        let client = ScriptedClient::new([]);
        let policy = PollPolicy::default();

        let start = Instant::now();
        let outcome = wait_for_task(&client, "cgt-2", &policy).await.unwrap();

        assert!(outcome.is_timed_out());
        assert_eq!(client.polls(), 60);
        assert_eq!(start.elapsed(), policy.timeout);
        assert_eq!(outcome.into_parts(), (String::new(), "cgt-2".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_fault_does_not_abort() {
        let client = ScriptedClient::new([Step::Fault, Step::Status(TaskStatus::Succeeded)]);

        let outcome = wait_for_task(&client, "cgt-3", &PollPolicy::default())
            .await
            .unwrap();

        assert_eq!(client.polls(), 2);
        assert_eq!(outcome.video_url(), MockArk::VIDEO_URL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_faults_use_the_same_budget() {
        let client = ScriptedClient::new(std::iter::repeat_n(Step::Fault, 100));
        let policy = PollPolicy::new(Duration::from_secs(50), Duration::from_secs(5));

        let outcome = wait_for_task(&client, "cgt-4", &policy).await.unwrap();

        assert!(outcome.is_timed_out());
        assert_eq!(client.polls(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_task_is_an_error() {
        let client = ScriptedClient::new([
            Step::Status(TaskStatus::Running),
            Step::Status(TaskStatus::Failed),
        ]);

        let err = wait_for_task(&client, "cgt-5", &PollPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(client.polls(), 2);
        match err {
            ClientError::TaskFailed { task_id, status } => {
                assert_eq!(task_id, "cgt-5");
                assert_eq!(status, TaskStatus::Failed);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_is_an_error() {
        let client = ScriptedClient::new([Step::Status(TaskStatus::Cancelled)]);

        let err = wait_for_task(&client, "cgt-6", &PollPolicy::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("task_id=cgt-6"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeded_without_video_is_an_error() {
        let client = ScriptedClient::new([
            Step::Status(TaskStatus::Running),
            Step::SucceededWithoutVideo,
        ]);

        let err = wait_for_task(&client, "cgt-7", &PollPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(client.polls(), 2);
        assert!(matches!(err, ClientError::ParseError(ref msg) if msg.contains("cgt-7")));
    }

    #[tokio::test]
    async fn test_waits_on_http_service() {
        let mock = MockArk::start().await;
        mock.push_status("cgt-9", TaskStatus::Pending);
        mock.push_status("cgt-9", TaskStatus::Succeeded);
        let client = crate::ArkClient::with_base_url(mock.base_url(), "key");
        let policy = PollPolicy::new(Duration::from_millis(500), Duration::from_millis(10));

        let outcome = wait_for_task(&client, "cgt-9", &policy).await.unwrap();
        assert_eq!(outcome.video_url(), MockArk::VIDEO_URL);
    }
}
