//! Retry policy — turns a series of probes into one session verdict.
//!
//! Attempts run strictly one after another, numbered from 1. A failed
//! attempt with budget left is followed by a fixed pause; the last failed
//! attempt is followed by a Warning notification instead.

use std::time::Duration;

use tracing::{error, info, warn};

use linkwatch_core::{MonitorConfig, NotificationRequest, Notifier, ProbeOutcome};

use crate::checker::Prober;

/// Where a probing session stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// About to run (or running) the given attempt.
    Probing { attempt: u32 },
    /// The target answered on this attempt.
    Succeeded { attempt: u32 },
    /// Every attempt failed. Carries the last cause and its attempt index.
    ExhaustedFailed { cause: String, attempt: u32 },
}

/// Fixed attempt budget with a fixed inter-attempt delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    retry_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. A zero budget is raised to one attempt.
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.max_attempts, config.retry_delay)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Transition out of `Probing { attempt }` given that attempt's outcome.
    pub fn advance(&self, attempt: u32, outcome: ProbeOutcome) -> SessionState {
        match outcome {
            ProbeOutcome::Success => SessionState::Succeeded { attempt },
            ProbeOutcome::Failure { .. } if attempt < self.max_attempts => {
                SessionState::Probing {
                    attempt: attempt + 1,
                }
            }
            ProbeOutcome::Failure { cause, .. } => SessionState::ExhaustedFailed { cause, attempt },
        }
    }

    /// Run one probing session to a terminal state.
    ///
    /// On exhaustion a Warning notification with the last cause is sent
    /// before returning; its delivery result does not affect the verdict.
    pub async fn run(&self, prober: &dyn Prober, notifier: &dyn Notifier) -> SessionState {
        let mut attempt = 1;

        loop {
            let outcome = prober.probe(attempt).await;

            if let ProbeOutcome::Failure { cause, .. } = &outcome {
                error!(
                    target_url = %prober.target(),
                    attempt,
                    max_attempts = self.max_attempts,
                    %cause,
                    "connectivity check failed"
                );
            }

            match self.advance(attempt, outcome) {
                SessionState::Probing { attempt: next } => {
                    info!(
                        delay_secs = self.retry_delay.as_secs_f64(),
                        next_attempt = next,
                        "waiting before retry"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt = next;
                }
                state @ SessionState::Succeeded { .. } => {
                    info!(target_url = %prober.target(), attempt, "successfully connected");
                    return state;
                }
                SessionState::ExhaustedFailed { cause, attempt } => {
                    let message = format!(
                        "Connectivity check failed (attempt {attempt}/{}): {cause}",
                        self.max_attempts
                    );
                    if !notifier.dispatch(&NotificationRequest::warning(message)).await {
                        warn!(channel = notifier.channel(), "exhaustion warning not delivered");
                    }
                    return SessionState::ExhaustedFailed { cause, attempt };
                }
            }
        }
    }
}
