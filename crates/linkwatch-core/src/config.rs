//! Monitor configuration: built-in defaults, an optional TOML file, and the
//! process environment, in increasing order of precedence.
//!
//! Environment keys are upper-case (`TARGET_URL`); the same keys appear in
//! lower case in the file (`target_url = "..."`). Durations are whole
//! seconds.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::ChannelKind;

pub const DEFAULT_NOTIFICATION_TYPE: &str = "pushover";
pub const DEFAULT_TARGET_URL: &str = "https://example.com";
pub const DEFAULT_TIMEOUT_SECS: i64 = 5;
pub const DEFAULT_MAX_RETRIES: i64 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: i64 = 15;
pub const DEFAULT_REBOOT_COMMAND: &str = "reboot";

/// Keys that select and reach the notification channel.
const CHANNEL_KEYS: [&str; 7] = [
    "NOTIFICATION_TYPE",
    "PUSHOVER_TOKEN",
    "PUSHOVER_USER",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "PUSHOVER_API_URL",
    "TELEGRAM_API_URL",
];

/// The optional file layer. Every key may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub notification_type: Option<String>,
    pub pushover_token: Option<String>,
    pub pushover_user: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub target_url: Option<String>,
    pub timeout: Option<i64>,
    pub max_retries: Option<i64>,
    pub retry_delay: Option<i64>,
    pub log_path: Option<PathBuf>,
    pub reboot_command: Option<String>,
    pub pushover_api_url: Option<String>,
    pub telegram_api_url: Option<String>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Pushover application token and user key.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PushoverCredentials {
    pub token: String,
    pub user: String,
}

/// Telegram bot token and destination chat.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "<unset>" } else { "<redacted>" }
}

impl fmt::Debug for PushoverCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushoverCredentials")
            .field("token", &redact(&self.token))
            .field("user", &redact(&self.user))
            .finish()
    }
}

impl fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("bot_token", &redact(&self.bot_token))
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Immutable watchdog configuration, built once at process start.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// The single active notification channel.
    pub channel: ChannelKind,
    pub pushover: PushoverCredentials,
    pub telegram: TelegramCredentials,
    /// Endpoint probed each attempt. May be a bare host or IP.
    pub target: String,
    /// Bound on every network call (probe and notification).
    pub timeout: Duration,
    /// Probe attempts per run, at least 1.
    pub max_attempts: u32,
    /// Pause between a failed attempt and the next one.
    pub retry_delay: Duration,
    /// Append log output to this file in addition to stdout.
    pub log_path: Option<PathBuf>,
    /// Program and arguments executed to reboot the host.
    pub reboot_command: Vec<String>,
    /// Override for the Pushover message endpoint.
    pub pushover_api_url: Option<String>,
    /// Override for the Telegram Bot API base (self-hosted Bot API servers).
    pub telegram_api_url: Option<String>,
}

impl MonitorConfig {
    /// Load from an optional file, then overlay the process environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let file = match path {
            Some(path) => {
                debug!(path = %path.display(), "reading config file");
                FileConfig::from_file(path)?
            }
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Channel settings only, used to report a configuration that failed to
    /// load. An unreadable file is skipped and every non-channel key keeps
    /// its default.
    pub fn load_channel_only(path: Option<&Path>) -> ConfigResult<Self> {
        let file = path
            .and_then(|path| FileConfig::from_file(path).ok())
            .unwrap_or_default();
        Self::resolve_channel_only(file, |key| std::env::var(key).ok())
    }

    /// Like [`resolve`](Self::resolve), ignoring everything but the channel keys.
    pub fn resolve_channel_only<F>(file: FileConfig, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = FileConfig {
            notification_type: file.notification_type,
            pushover_token: file.pushover_token,
            pushover_user: file.pushover_user,
            telegram_bot_token: file.telegram_bot_token,
            telegram_chat_id: file.telegram_chat_id,
            pushover_api_url: file.pushover_api_url,
            telegram_api_url: file.telegram_api_url,
            ..FileConfig::default()
        };
        Self::resolve(file, |key| {
            if CHANNEL_KEYS.contains(&key) {
                env(key)
            } else {
                None
            }
        })
    }

    /// Layer `env` over `file` over the built-in defaults, then validate.
    pub fn resolve<F>(file: FileConfig, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, file_value: Option<String>| env(key).or(file_value);

        let channel = text("NOTIFICATION_TYPE", file.notification_type)
            .unwrap_or_else(|| DEFAULT_NOTIFICATION_TYPE.to_string())
            .parse::<ChannelKind>()?;

        let timeout = integer(&env, "TIMEOUT", file.timeout, DEFAULT_TIMEOUT_SECS)?;
        let max_retries = integer(&env, "MAX_RETRIES", file.max_retries, DEFAULT_MAX_RETRIES)?;
        let retry_delay =
            integer(&env, "RETRY_DELAY", file.retry_delay, DEFAULT_RETRY_DELAY_SECS)?;

        if timeout <= 0 {
            return Err(ConfigError::Invalid {
                key: "TIMEOUT",
                reason: format!("must be greater than zero, got {timeout}"),
            });
        }
        let max_attempts = u32::try_from(max_retries)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| ConfigError::Invalid {
                key: "MAX_RETRIES",
                reason: format!("must be between 1 and {}, got {max_retries}", u32::MAX),
            })?;
        if retry_delay < 0 {
            return Err(ConfigError::Invalid {
                key: "RETRY_DELAY",
                reason: format!("must not be negative, got {retry_delay}"),
            });
        }

        let target = text("TARGET_URL", file.target_url)
            .unwrap_or_else(|| DEFAULT_TARGET_URL.to_string())
            .trim()
            .to_string();
        if target.is_empty() {
            return Err(ConfigError::Invalid {
                key: "TARGET_URL",
                reason: "must not be empty".to_string(),
            });
        }

        let reboot_command: Vec<String> = text("REBOOT_COMMAND", file.reboot_command)
            .unwrap_or_else(|| DEFAULT_REBOOT_COMMAND.to_string())
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if reboot_command.is_empty() {
            return Err(ConfigError::Invalid {
                key: "REBOOT_COMMAND",
                reason: "must name a program".to_string(),
            });
        }

        let log_path = env("LOG_PATH")
            .map(PathBuf::from)
            .or(file.log_path)
            .filter(|p| !p.as_os_str().is_empty());

        Ok(Self {
            channel,
            pushover: PushoverCredentials {
                token: text("PUSHOVER_TOKEN", file.pushover_token).unwrap_or_default(),
                user: text("PUSHOVER_USER", file.pushover_user).unwrap_or_default(),
            },
            telegram: TelegramCredentials {
                bot_token: text("TELEGRAM_BOT_TOKEN", file.telegram_bot_token)
                    .unwrap_or_default(),
                chat_id: text("TELEGRAM_CHAT_ID", file.telegram_chat_id).unwrap_or_default(),
            },
            target,
            timeout: Duration::from_secs(timeout as u64),
            max_attempts,
            retry_delay: Duration::from_secs(retry_delay as u64),
            log_path,
            reboot_command,
            pushover_api_url: text("PUSHOVER_API_URL", file.pushover_api_url)
                .filter(|url| !url.trim().is_empty()),
            telegram_api_url: text("TELEGRAM_API_URL", file.telegram_api_url)
                .filter(|url| !url.trim().is_empty()),
        })
    }

    /// The URL actually requested. Bare hosts and IPs get an `http://` scheme.
    pub fn target_url(&self) -> String {
        if self.target.contains("://") {
            self.target.clone()
        } else {
            format!("http://{}", self.target)
        }
    }

    /// Names of credential keys the selected channel needs but lacks.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let required: [(&'static str, &str); 2] = match self.channel {
            ChannelKind::Pushover => [
                ("PUSHOVER_TOKEN", &self.pushover.token),
                ("PUSHOVER_USER", &self.pushover.user),
            ],
            ChannelKind::Telegram => [
                ("TELEGRAM_BOT_TOKEN", &self.telegram.bot_token),
                ("TELEGRAM_CHAT_ID", &self.telegram.chat_id),
            ],
        };
        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| key)
            .collect()
    }
}

fn integer<F>(env: &F, key: &'static str, file_value: Option<i64>, default: i64) -> ConfigResult<i64>
where
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::NotAnInteger { key, value: raw }),
        None => Ok(file_value.unwrap_or(default)),
    }
}
