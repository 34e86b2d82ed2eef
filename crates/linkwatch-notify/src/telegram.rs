//! Telegram bot channel.
//!
//! Messages go out with `parse_mode=HTML`, prefixed with a severity glyph.
//! Message text is escaped so error strings containing `<` or `&` cannot
//! make the Bot API reject the whole message.

use std::time::Duration;

use linkwatch_core::{BoxFuture, NotificationRequest, Notifier, Priority, TelegramCredentials};

/// Telegram Bot API base URL.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    credentials: TelegramCredentials,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(credentials: TelegramCredentials, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: crate::http_client(timeout)?,
            api_base: TELEGRAM_API_BASE.to_string(),
            credentials,
            timeout,
        })
    }

    /// Point at a different Bot API server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.credentials.bot_token
        )
    }
}

fn glyph(priority: Priority) -> &'static str {
    match priority {
        Priority::Info => "ℹ️",
        Priority::Warning | Priority::Critical => "🔴",
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Text body as delivered to the chat.
fn format_text(request: &NotificationRequest) -> String {
    format!("{} {}", glyph(request.priority), escape_html(&request.message))
}

impl Notifier for TelegramNotifier {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    fn dispatch<'a>(&'a self, request: &'a NotificationRequest) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let form = [
                ("chat_id", self.credentials.chat_id.clone()),
                ("text", format_text(request)),
                ("parse_mode", "HTML".to_string()),
            ];
            let url = self.send_message_url();
            crate::post_form(&self.client, self.channel(), &url, &form, self.timeout).await
        })
    }
}
