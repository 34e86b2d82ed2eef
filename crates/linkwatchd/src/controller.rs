//! Escalation controller — one probing session, then escalate if needed.
//!
//! ```text
//! RetryPolicy::run
//!   ├─ Succeeded       → ConnectivityOk
//!   └─ ExhaustedFailed → notify(Warning "rebooting") → RebootAction
//!                          ├─ Ok  → RebootedSuccessfully
//!                          └─ Err → notify(Critical) → RebootFailed
//! ```
//!
//! Notification results never influence the outcome. [`guard`] is the top
//! boundary that turns any other error into `UnexpectedError`.

use std::future::Future;

use tracing::{error, info, warn};

use linkwatch_core::{EscalationResult, NotificationRequest, Notifier};
use linkwatch_health::{Prober, RetryPolicy, SessionState};

use crate::reboot::RebootAction;

pub const REBOOT_NOTICE: &str = "System is being rebooted due to connectivity issues";

/// Everything a single watchdog run needs, borrowed for its duration.
pub struct Watchdog<'a> {
    policy: RetryPolicy,
    prober: &'a dyn Prober,
    notifier: &'a dyn Notifier,
    reboot: &'a dyn RebootAction,
}

impl<'a> Watchdog<'a> {
    pub fn new(
        policy: RetryPolicy,
        prober: &'a dyn Prober,
        notifier: &'a dyn Notifier,
        reboot: &'a dyn RebootAction,
    ) -> Self {
        Self {
            policy,
            prober,
            notifier,
            reboot,
        }
    }

    /// Run exactly one probing session and escalate on exhaustion.
    pub async fn run(&self) -> EscalationResult {
        info!(
            target_url = %self.prober.target(),
            max_attempts = self.policy.max_attempts(),
            "starting connectivity check"
        );

        match self.policy.run(self.prober, self.notifier).await {
            SessionState::Succeeded { attempt } => {
                info!(attempt, "connectivity ok");
                EscalationResult::ConnectivityOk
            }
            SessionState::ExhaustedFailed { cause, attempt } => {
                warn!(attempt, %cause, "all connectivity checks failed, escalating");
                self.escalate().await
            }
            // The policy only returns terminal states.
            SessionState::Probing { attempt } => {
                error!(attempt, "probing session ended without a verdict");
                EscalationResult::UnexpectedError
            }
        }
    }

    async fn escalate(&self) -> EscalationResult {
        info!("initiating system reboot");
        // Announce first: a successful reboot may not give us another chance.
        notify(self.notifier, NotificationRequest::warning(REBOOT_NOTICE)).await;

        match self.reboot.reboot().await {
            Ok(()) => {
                info!("reboot command accepted");
                EscalationResult::RebootedSuccessfully
            }
            Err(e) => {
                error!(error = %e, "failed to reboot system");
                let request = NotificationRequest::critical(format!("Failed to reboot system: {e}"));
                notify(self.notifier, request).await;
                EscalationResult::RebootFailed
            }
        }
    }
}

/// Best-effort dispatch. A lost notification is logged and otherwise ignored.
async fn notify(notifier: &dyn Notifier, request: NotificationRequest) -> bool {
    let delivered = notifier.dispatch(&request).await;
    if !delivered {
        warn!(
            channel = notifier.channel(),
            priority = %request.priority,
            "notification not delivered, continuing"
        );
    }
    delivered
}

/// Top-level boundary for a run.
///
/// An error from `run` is logged, reported at Critical priority when a
/// channel is available, and mapped to [`EscalationResult::UnexpectedError`].
pub async fn guard<F>(notifier: Option<&dyn Notifier>, run: F) -> EscalationResult
where
    F: Future<Output = anyhow::Result<EscalationResult>>,
{
    match run.await {
        Ok(result) => {
            info!(%result, exit_code = result.exit_code(), "run finished");
            result
        }
        Err(e) => {
            let detail = format!("{e:#}");
            error!(error = %detail, "watchdog run failed");
            if let Some(notifier) = notifier {
                let request =
                    NotificationRequest::critical(format!("Script execution failed: {detail}"));
                notify(notifier, request).await;
            }
            EscalationResult::UnexpectedError
        }
    }
}
