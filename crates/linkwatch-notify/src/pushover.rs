//! Pushover channel.

use std::time::Duration;

use linkwatch_core::{BoxFuture, NotificationRequest, Notifier, Priority, PushoverCredentials};

/// Pushover message API.
pub const PUSHOVER_ENDPOINT: &str = "https://api.pushover.net/1/messages.json";

/// Emergency messages are re-sent every `retry` seconds until acknowledged
/// or `expire` seconds pass. The API rejects priority 2 without both.
const EMERGENCY_RETRY_SECS: u32 = 60;
const EMERGENCY_EXPIRE_SECS: u32 = 3600;

pub struct PushoverNotifier {
    client: reqwest::Client,
    endpoint: String,
    credentials: PushoverCredentials,
    timeout: Duration,
}

impl PushoverNotifier {
    pub fn new(credentials: PushoverCredentials, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: crate::http_client(timeout)?,
            endpoint: PUSHOVER_ENDPOINT.to_string(),
            credentials,
            timeout,
        })
    }

    /// Point at a different API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn form(&self, request: &NotificationRequest) -> Vec<(&'static str, String)> {
        let priority = pushover_priority(request.priority);
        let mut form = vec![
            ("token", self.credentials.token.clone()),
            ("user", self.credentials.user.clone()),
            ("message", request.message.clone()),
            ("priority", priority.to_string()),
        ];
        if priority == 2 {
            form.push(("retry", EMERGENCY_RETRY_SECS.to_string()));
            form.push(("expire", EMERGENCY_EXPIRE_SECS.to_string()));
        }
        form
    }
}

/// Map onto Pushover's -2..=2 scale.
fn pushover_priority(priority: Priority) -> i8 {
    match priority {
        Priority::Info => 0,
        Priority::Warning => 1,
        Priority::Critical => 2,
    }
}

impl Notifier for PushoverNotifier {
    fn channel(&self) -> &'static str {
        "pushover"
    }

    fn dispatch<'a>(&'a self, request: &'a NotificationRequest) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let form = self.form(request);
            crate::post_form(&self.client, self.channel(), &self.endpoint, &form, self.timeout)
                .await
        })
    }
}
