//! linkwatch — connectivity watchdog for unattended routers and embedded
//! hosts.
//!
//! One invocation runs one probing session against the configured target.
//! If every attempt fails, the host is rebooted after an alert goes out
//! through the configured channel. Meant to be run from cron:
//!
//! ```text
//! */5 * * * * /usr/bin/linkwatch --config /etc/linkwatch.toml
//! ```
//!
//! Exit status: 0 connectivity ok or reboot issued, 1 unexpected error,
//! 4 reboot command failed.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, warn};

use linkwatch_core::{ConfigError, EscalationResult, MonitorConfig};
use linkwatch_health::{HttpProber, RetryPolicy};

mod controller;
mod logging;
mod preflight;
mod reboot;

use controller::{Watchdog, guard};
use reboot::CommandReboot;

#[derive(Parser)]
#[command(
    name = "linkwatch",
    about = "Connectivity watchdog: alert and reboot on sustained link loss",
    version
)]
struct Cli {
    /// TOML config file. Environment variables override its values.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Probe the target and escalate on failure (default).
    Run,
    /// Validate credentials and probe the target once. Never reboots.
    Check {
        /// Also send an Info test message through the configured channel.
        #[arg(long)]
        notify: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = MonitorConfig::load(cli.config.as_deref());
    logging::init(config.as_ref().ok().and_then(|c| c.log_path.as_deref()));

    let command = cli.command.unwrap_or(Command::Run);
    let config = match (config, &command) {
        (Ok(config), _) => config,
        (Err(e), Command::Run) => {
            return exit(report_invalid_config(cli.config.as_deref(), e).await);
        }
        (Err(e), Command::Check { .. }) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match command {
        Command::Run => exit(run(&config).await),
        Command::Check { notify } => match check(&config, notify).await {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                let detail = format!("{e:#}");
                error!(error = %detail, "preflight check failed");
                ExitCode::FAILURE
            }
        },
    }
}

fn exit(result: EscalationResult) -> ExitCode {
    ExitCode::from(result.exit_code())
}

/// One full watchdog run.
async fn run(config: &MonitorConfig) -> EscalationResult {
    let notifier = match linkwatch_notify::from_config(config) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!(error = %e, "cannot build notification channel");
            return EscalationResult::UnexpectedError;
        }
    };

    guard(Some(notifier.as_ref()), async {
        let prober = HttpProber::from_config(config).context("building HTTP prober")?;
        let reboot = CommandReboot::from_config(config).context("building reboot action")?;
        let watchdog = Watchdog::new(
            RetryPolicy::from_config(config),
            &prober,
            notifier.as_ref(),
            &reboot,
        );
        Ok(watchdog.run().await)
    })
    .await
}

/// Reach for whatever channel the broken configuration still describes and
/// report the failure through it.
async fn report_invalid_config(path: Option<&Path>, err: ConfigError) -> EscalationResult {
    let notifier = match MonitorConfig::load_channel_only(path) {
        Ok(config) => match linkwatch_notify::from_config(&config) {
            Ok(notifier) => Some(notifier),
            Err(e) => {
                warn!(error = %e, "cannot build notification channel");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "no notification channel available");
            None
        }
    };

    guard(notifier.as_deref(), async move {
        Err(anyhow::Error::new(err).context("invalid configuration"))
    })
    .await
}

async fn check(config: &MonitorConfig, send_test: bool) -> anyhow::Result<bool> {
    let prober = HttpProber::from_config(config).context("building HTTP prober")?;
    let notifier = if send_test {
        Some(linkwatch_notify::from_config(config).context("building notification channel")?)
    } else {
        None
    };

    let report = preflight::check(config, &prober, notifier.as_deref()).await;
    Ok(report.passed())
}
