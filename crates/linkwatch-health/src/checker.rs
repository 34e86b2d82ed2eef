//! Single-attempt reachability probe.
//!
//! Performs one HTTP GET against the target, bounded by the per-attempt
//! timeout, and folds every kind of failure into [`ProbeOutcome::Failure`].

use std::error::Error as _;
use std::time::Duration;

use tracing::debug;

use linkwatch_core::{BoxFuture, MonitorConfig, ProbeOutcome};

/// Something that can check the configured target once.
///
/// Implementations must return within their own time bound and never fail:
/// every error becomes a [`ProbeOutcome::Failure`] stamped with `attempt`.
pub trait Prober: Send + Sync {
    /// The endpoint being probed, for log lines and messages.
    fn target(&self) -> &str;

    /// Run the 1-based `attempt` of the current session.
    fn probe(&self, attempt: u32) -> BoxFuture<'_, ProbeOutcome>;
}

/// HTTP(S) GET prober.
pub struct HttpProber {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpProber {
    /// Create a prober for `url` with a per-attempt `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("linkwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &MonitorConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.target_url(), config.timeout)
    }
}

impl Prober for HttpProber {
    fn target(&self) -> &str {
        &self.url
    }

    fn probe(&self, attempt: u32) -> BoxFuture<'_, ProbeOutcome> {
        Box::pin(http_probe(&self.client, &self.url, self.timeout, attempt))
    }
}

/// Perform an HTTP reachability probe against `url`.
///
/// Returns `Success` for any 2xx/3xx final response and a `Failure` for
/// error statuses, transport failures and timeouts.
pub async fn http_probe(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    attempt: u32,
) -> ProbeOutcome {
    let result = tokio::time::timeout(timeout, client.get(url).send()).await;

    let response = match result {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            let reason = describe_error(&e, timeout);
            debug!(%url, attempt, %reason, "probe request failed");
            return ProbeOutcome::failure(attempt, reason);
        }
        Err(_) => {
            debug!(%url, attempt, "probe timed out");
            return ProbeOutcome::failure(
                attempt,
                format!("timed out after {}s", timeout.as_secs_f64()),
            );
        }
    };

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        debug!(%url, attempt, %status, "probe got error status");
        ProbeOutcome::failure(attempt, format!("HTTP {status}"))
    } else {
        debug!(%url, attempt, %status, "probe succeeded");
        ProbeOutcome::Success
    }
}

/// Render a transport error with its innermost cause, which is where the
/// useful part ("Connection refused", "failed to lookup address") lives.
fn describe_error(err: &reqwest::Error, timeout: Duration) -> String {
    if err.is_timeout() {
        return format!("timed out after {}s", timeout.as_secs_f64());
    }

    let mut root = err.source();
    while let Some(next) = root.and_then(|e| e.source()) {
        root = Some(next);
    }

    let kind = if err.is_connect() {
        "connection failed"
    } else if err.is_builder() {
        "invalid target"
    } else if err.is_redirect() {
        "redirect loop"
    } else {
        "request failed"
    };

    match root {
        Some(cause) => format!("{kind}: {cause}"),
        None => format!("{kind}: {err}"),
    }
}
