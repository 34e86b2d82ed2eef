//! Shared types used across linkwatch crates.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Severity attached to a notification.
///
/// Only affects presentation on the receiving side; control flow never
/// branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// The closed set of notification channels a configuration can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Pushover,
    Telegram,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pushover => "pushover",
            Self::Telegram => "telegram",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pushover" => Ok(Self::Pushover),
            "telegram" => Ok(Self::Telegram),
            _ => Err(ConfigError::UnknownChannel(s.to_string())),
        }
    }
}

/// A single alert to be dispatched through the configured channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub message: String,
    pub priority: Priority,
}

impl NotificationRequest {
    pub fn new(message: impl Into<String>, priority: Priority) -> Self {
        Self {
            message: message.into(),
            priority,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Priority::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Priority::Warning)
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(message, Priority::Critical)
    }
}

/// Outcome of one numbered attempt within a probing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The target answered with a non-error status.
    Success,
    Failure {
        /// Human-readable reason, e.g. "connection refused".
        cause: String,
        /// 1-based attempt index.
        attempt: u32,
    },
}

impl ProbeOutcome {
    pub fn failure(attempt: u32, cause: impl Into<String>) -> Self {
        Self::Failure {
            cause: cause.into(),
            attempt,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Terminal outcome of one watchdog run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscalationResult {
    /// The target was reachable within the attempt budget.
    ConnectivityOk,
    /// Attempts were exhausted and the reboot command succeeded.
    RebootedSuccessfully,
    /// Attempts were exhausted and the reboot command failed.
    RebootFailed,
    /// The run aborted on an error outside the escalation sequence.
    UnexpectedError,
}

impl EscalationResult {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConnectivityOk | Self::RebootedSuccessfully => 0,
            Self::UnexpectedError => 1,
            Self::RebootFailed => 4,
        }
    }
}

impl fmt::Display for EscalationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectivityOk => write!(f, "connectivity ok"),
            Self::RebootedSuccessfully => write!(f, "rebooted"),
            Self::RebootFailed => write!(f, "reboot failed"),
            Self::UnexpectedError => write!(f, "unexpected error"),
        }
    }
}
