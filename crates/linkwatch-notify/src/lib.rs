//! linkwatch-notify — alert channels for the linkwatch watchdog.
//!
//! Every channel implements [`linkwatch_core::Notifier`]. Exactly one is
//! active per run, picked from [`MonitorConfig::channel`] by
//! [`from_config`]. Adding a channel means adding a variant there; callers
//! only ever see `dyn Notifier`.

use std::time::Duration;

use tracing::{error, info};

use linkwatch_core::{ChannelKind, MonitorConfig, Notifier};

pub mod pushover;
pub mod telegram;

pub use pushover::PushoverNotifier;
pub use telegram::TelegramNotifier;

/// Build the notifier selected by the configuration.
pub fn from_config(config: &MonitorConfig) -> Result<Box<dyn Notifier>, reqwest::Error> {
    let notifier: Box<dyn Notifier> = match config.channel {
        ChannelKind::Pushover => {
            let mut notifier = PushoverNotifier::new(config.pushover.clone(), config.timeout)?;
            if let Some(url) = &config.pushover_api_url {
                notifier = notifier.with_endpoint(url.as_str());
            }
            Box::new(notifier)
        }
        ChannelKind::Telegram => {
            let mut notifier = TelegramNotifier::new(config.telegram.clone(), config.timeout)?;
            if let Some(url) = &config.telegram_api_url {
                notifier = notifier.with_api_base(url.as_str());
            }
            Box::new(notifier)
        }
    };
    info!(channel = notifier.channel(), "notification channel selected");
    Ok(notifier)
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("linkwatch/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// POST a form and report whether the channel accepted it.
///
/// Transport errors, error statuses, and timeouts are logged and turned
/// into `false`.
async fn post_form(
    client: &reqwest::Client,
    channel: &'static str,
    url: &str,
    form: &[(&str, String)],
    timeout: Duration,
) -> bool {
    let send = async {
        client
            .post(url)
            .form(form)
            .send()
            .await?
            .error_for_status()
    };

    match tokio::time::timeout(timeout, send).await {
        Ok(Ok(resp)) => {
            info!(channel, status = %resp.status(), "notification sent");
            true
        }
        Ok(Err(e)) => {
            // Never log the URL: Telegram carries the bot token in the path.
            error!(channel, error = %e.without_url(), "failed to send notification");
            false
        }
        Err(_) => {
            error!(
                channel,
                timeout_secs = timeout.as_secs_f64(),
                "failed to send notification: timed out"
            );
            false
        }
    }
}
