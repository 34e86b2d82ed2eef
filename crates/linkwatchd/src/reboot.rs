//! Reboot action — runs the configured OS reboot command.

use std::process::ExitStatus;

use thiserror::Error;
use tracing::info;

use linkwatch_core::{BoxFuture, MonitorConfig};

pub type RebootResult<T> = Result<T, RebootError>;

#[derive(Debug, Error)]
pub enum RebootError {
    #[error("no reboot command configured")]
    EmptyCommand,

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Exit { program: String, status: ExitStatus },
}

/// The host-level "reboot now" primitive.
///
/// Invoked at most once per run, and only after every probe attempt
/// failed. Success means the command was accepted; the process may not
/// live long after that.
pub trait RebootAction: Send + Sync {
    fn reboot(&self) -> BoxFuture<'_, RebootResult<()>>;
}

/// Reboot by executing an external command, `reboot` by default.
#[derive(Debug, Clone)]
pub struct CommandReboot {
    program: String,
    args: Vec<String>,
}

impl CommandReboot {
    pub fn new(argv: Vec<String>) -> RebootResult<Self> {
        let mut argv = argv.into_iter();
        let program = argv.next().ok_or(RebootError::EmptyCommand)?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    pub fn from_config(config: &MonitorConfig) -> RebootResult<Self> {
        Self::new(config.reboot_command.clone())
    }
}

impl RebootAction for CommandReboot {
    fn reboot(&self) -> BoxFuture<'_, RebootResult<()>> {
        Box::pin(async move {
            info!(program = %self.program, args = ?self.args, "executing reboot command");

            let status = tokio::process::Command::new(&self.program)
                .args(&self.args)
                .status()
                .await
                .map_err(|source| RebootError::Spawn {
                    program: self.program.clone(),
                    source,
                })?;

            if status.success() {
                Ok(())
            } else {
                Err(RebootError::Exit {
                    program: self.program.clone(),
                    status,
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_command_rejected() {
        assert!(matches!(
            CommandReboot::new(Vec::new()),
            Err(RebootError::EmptyCommand)
        ));
    }

    #[test]
    fn splits_program_and_args() {
        let cmd = CommandReboot::new(argv(&["/sbin/reboot", "-f"])).unwrap();
        assert_eq!(cmd.program, "/sbin/reboot");
        assert_eq!(cmd.args, vec!["-f".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success() {
        let cmd = CommandReboot::new(argv(&["true"])).unwrap();
        assert!(cmd.reboot().await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_failure() {
        let cmd = CommandReboot::new(argv(&["sh", "-c", "exit 3"])).unwrap();
        match cmd.reboot().await {
            Err(RebootError::Exit { status, .. }) => assert_eq!(status.code(), Some(3)),
            other => panic!("expected exit failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_failure() {
        let cmd = CommandReboot::new(argv(&["/nonexistent/linkwatch-reboot"])).unwrap();
        let err = cmd.reboot().await.unwrap_err();
        assert!(matches!(err, RebootError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/linkwatch-reboot"));
    }
}
