//! linkwatch-core — shared vocabulary for the linkwatch watchdog.
//!
//! Holds the immutable [`MonitorConfig`] built once at startup, the small
//! value types exchanged between the prober, retry policy, and escalation
//! controller, and the [`Notifier`] capability every alert channel
//! implements.

pub mod config;
pub mod error;
pub mod notifier;
pub mod types;

pub use config::{FileConfig, MonitorConfig, PushoverCredentials, TelegramCredentials};
pub use error::{ConfigError, ConfigResult};
pub use notifier::{BoxFuture, Notifier};
pub use types::*;
