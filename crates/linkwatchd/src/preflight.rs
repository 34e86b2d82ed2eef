//! `linkwatch check` — verify a deployment before scheduling it.
//!
//! Confirms the selected channel has its credentials and that the target
//! answers one probe. Optionally sends an Info test message. Never reboots.

use tracing::{error, info};

use linkwatch_core::{MonitorConfig, NotificationRequest, Notifier, ProbeOutcome};
use linkwatch_health::Prober;

/// Outcome of each preflight step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightReport {
    /// Credential keys the selected channel lacks.
    pub missing_credentials: Vec<&'static str>,
    /// Probe result, `None` when the probe was skipped.
    pub reachability: Option<ProbeOutcome>,
    /// Test notification result, `None` when not requested.
    pub test_notification: Option<bool>,
}

impl PreflightReport {
    pub fn passed(&self) -> bool {
        self.missing_credentials.is_empty()
            && self
                .reachability
                .as_ref()
                .is_some_and(ProbeOutcome::is_success)
            && self.test_notification.unwrap_or(true)
    }
}

/// Run the checks. A credential problem skips the remaining steps.
pub async fn check(
    config: &MonitorConfig,
    prober: &dyn Prober,
    notifier: Option<&dyn Notifier>,
) -> PreflightReport {
    info!(channel = %config.channel, target_url = %prober.target(), "testing configuration");

    let missing_credentials = config.missing_credentials();
    if !missing_credentials.is_empty() {
        error!(channel = %config.channel, missing = ?missing_credentials, "credentials not configured");
        println!(
            "ERROR: {} credentials not configured: {}",
            config.channel,
            missing_credentials.join(", ")
        );
        return PreflightReport {
            missing_credentials,
            reachability: None,
            test_notification: None,
        };
    }

    let reachability = prober.probe(1).await;
    match &reachability {
        ProbeOutcome::Success => println!("SUCCESS: Connected to {}", prober.target()),
        ProbeOutcome::Failure { cause, .. } => {
            println!("ERROR: Failed to connect to {}: {cause}", prober.target())
        }
    }

    let test_notification = match notifier {
        Some(notifier) => {
            let request = NotificationRequest::info(format!(
                "linkwatch test notification: monitoring {}",
                prober.target()
            ));
            let delivered = notifier.dispatch(&request).await;
            if delivered {
                println!("SUCCESS: Test notification sent via {}", notifier.channel());
            } else {
                println!("ERROR: Test notification via {} failed", notifier.channel());
            }
            Some(delivered)
        }
        None => None,
    };

    PreflightReport {
        missing_credentials,
        reachability: Some(reachability),
        test_notification,
    }
}
