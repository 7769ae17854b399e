//! Package manager detection and install execution
//!
//! Detection is a string match on `npm_config_user_agent`, set by whichever
//! package manager launched the process (e.g. `npm/7.18.1 node/v16.4.2 ...`).

use crate::logger::Logger;
use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Cnpm,
}

impl PackageManager {
    /// Detect the package manager that launched this process
    pub fn detect() -> Self {
        Self::from_user_agent(std::env::var("npm_config_user_agent").ok().as_deref())
    }

    /// Parse a `npm_config_user_agent` value; unknown agents default to npm
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let Some(user_agent) = user_agent else {
            return Self::Npm;
        };
        match user_agent.split('/').next().unwrap_or_default() {
            "yarn" => Self::Yarn,
            "pnpm" => Self::Pnpm,
            "cnpm" => Self::Cnpm,
            _ => Self::Npm,
        }
    }

    /// Binary name to invoke
    pub fn command(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Cnpm => "cnpm",
        }
    }

    /// Run `<pm> install` in `dir`
    ///
    /// Output streams through the logger at debug level; the exit status
    /// decides between an info and an error log. A missing binary is a hard
    /// error so callers can fall back to printing instructions.
    pub async fn run_install(&self, logger: &dyn Logger, dir: &Path) -> Result<bool> {
        let status = stream_command(logger, dir, self.command(), &["install"])
            .await
            .with_context(|| format!("Failed to run {} install", self.command()))?;

        if status.success() {
            logger.info("Dependencies successfully installed.");
            Ok(true)
        } else {
            logger.error(&format!(
                "{} install failed with {}. Run it manually inside the project directory.",
                self.command(),
                status
            ));
            Ok(false)
        }
    }
}

/// Spawn a command in `dir` and stream its output lines to the debug log
async fn stream_command(
    logger: &dyn Logger,
    dir: &Path,
    program: &str,
    args: &[&str],
) -> Result<ExitStatus> {
    let mut child = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child.stdout.take().context("Failed to capture stdout")?;
    let stderr = child.stderr.take().context("Failed to capture stderr")?;
    let mut stdout_reader = BufReader::new(stdout).lines();
    let mut stderr_reader = BufReader::new(stderr).lines();

    let mut stdout_done = false;
    let mut stderr_done = false;
    while !(stdout_done && stderr_done) {
        tokio::select! {
            line = stdout_reader.next_line(), if !stdout_done => match line {
                Ok(Some(line)) => logger.debug(&line),
                _ => stdout_done = true,
            },
            line = stderr_reader.next_line(), if !stderr_done => match line {
                Ok(Some(line)) => logger.debug(&line),
                _ => stderr_done = true,
            },
        }
    }

    Ok(child.wait().await?)
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_npm() {
        let pm = PackageManager::from_user_agent(Some("npm/7.18.1 node/v16.4.2 darwin x64"));
        assert_eq!(pm, PackageManager::Npm);
    }

    #[test]
    fn test_detects_yarn() {
        let pm = PackageManager::from_user_agent(Some("yarn/1.22.10 npm/? node/v16.4.2 darwin x64"));
        assert_eq!(pm, PackageManager::Yarn);
    }

    #[test]
    fn test_detects_pnpm() {
        let pm = PackageManager::from_user_agent(Some("pnpm/6.14.1 npm/? node/v16.4.2 darwin x64"));
        assert_eq!(pm, PackageManager::Pnpm);
    }

    #[test]
    fn test_detects_cnpm() {
        let pm =
            PackageManager::from_user_agent(Some("cnpm/7.0.0 npminsall/1.0.0 node/v16.4.2 darwin x64"));
        assert_eq!(pm, PackageManager::Cnpm);
    }

    #[test]
    fn test_defaults_to_npm_for_unknown_agent() {
        let pm = PackageManager::from_user_agent(Some("xxxxxxxxxxxxxxxxxx"));
        assert_eq!(pm, PackageManager::Npm);
    }

    #[test]
    fn test_defaults_to_npm_when_unset() {
        assert_eq!(PackageManager::from_user_agent(None), PackageManager::Npm);
    }

    #[tokio::test]
    async fn test_streams_output_to_the_debug_log() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = crate::logger::test_util::MemoryLogger::default();

        let status = stream_command(
            &logger,
            tmp.path(),
            "sh",
            &["-c", "echo from-stdout; echo from-stderr >&2"],
        )
        .await
        .unwrap();

        assert!(status.success());
        let debug = logger.debug_lines();
        assert!(debug.contains(&"from-stdout".to_string()));
        assert!(debug.contains(&"from-stderr".to_string()));
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = crate::logger::test_util::MemoryLogger::default();

        let result = stream_command(&logger, tmp.path(), "definitely-not-a-binary", &[]).await;

        assert!(result.is_err());
    }
}
