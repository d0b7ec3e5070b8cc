use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::call::{CallError, CallSessionStore, CoachingReport, ReportPoll};

/// Bounded retry policy for report polling
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Fixed delay between attempts
    pub interval: Duration,

    /// Attempts before giving up
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

/// Terminal outcome of one polling run
#[derive(Debug)]
pub enum PollOutcome {
    /// The report is ready
    Ready(Box<CoachingReport>),

    /// The last analysis run failed; a fresh analyze trigger is the
    /// recovery path
    Failed(String),

    /// The poll budget ran out. This is a client-side condition, not a
    /// session fault: the analysis may still finish server-side, so the
    /// caller should re-query (or re-trigger) rather than assume permanent
    /// failure.
    TimedOut,
}

/// Polls a session until its report reaches a terminal state
///
/// While the session is still processing, the poller sleeps and retries on
/// a fixed interval, bounded by the policy's attempt budget. A manual
/// analyze retry resets the budget by starting a fresh polling run.
pub struct ReportPoller {
    store: Arc<CallSessionStore>,
    policy: PollPolicy,
}

impl ReportPoller {
    pub fn new(store: Arc<CallSessionStore>, policy: PollPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn wait_for_report(&self, call_id: Uuid) -> Result<PollOutcome, CallError> {
        for attempt in 1..=self.policy.max_attempts {
            match self.store.report_status(call_id).await? {
                ReportPoll::Ready(report) => return Ok(PollOutcome::Ready(report)),
                ReportPoll::Failed(message) => return Ok(PollOutcome::Failed(message)),
                ReportPoll::Processing => {
                    debug!(
                        "report for call session {call_id} not ready (attempt {attempt}/{})",
                        self.policy.max_attempts
                    );
                    if attempt < self.policy.max_attempts {
                        tokio::time::sleep(self.policy.interval).await;
                    }
                }
            }
        }
        Ok(PollOutcome::TimedOut)
    }
}
