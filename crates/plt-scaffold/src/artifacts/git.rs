//! Git repository initialization
//!
//! Shells out to the system `git` binary. Failures are logged and never
//! abort scaffolding: the generated project is complete without a repo.

use crate::logger::Logger;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

/// Branch the first commit lands on
pub const GIT_MAIN_BRANCH: &str = "main";

/// Message of the first commit
pub const GIT_FIRST_COMMIT_MESSAGE: &str = "Platformatic project started!";

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git is not available: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git {args} failed: {stderr}")]
    Command { args: String, stderr: String },
}

async fn git(dir: &Path, args: &[&str]) -> Result<(), GitError> {
    let mut command = Command::new("git");
    command.args(args).current_dir(dir);
    // unit tests run with an isolated identity instead of the user's config
    #[cfg(test)]
    command.env("GIT_CONFIG_GLOBAL", tests::isolated_git_config());
    let output = command.output().await?;
    if !output.status.success() {
        return Err(GitError::Command {
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Initialize a repository on [`GIT_MAIN_BRANCH`] and create the first commit
///
/// A directory that already contains `.git` is left untouched.
pub async fn create_git_repository(logger: &dyn Logger, dir: &Path) {
    if dir.join(".git").exists() {
        logger.info("Git repository already exists.");
        return;
    }

    let result = async {
        git(dir, &["init", "-b", GIT_MAIN_BRANCH]).await?;
        logger.debug("Git repository initialized.");
        git(dir, &["add", "."]).await?;
        git(dir, &["commit", "-n", "-m", GIT_FIRST_COMMIT_MESSAGE]).await?;
        logger.debug("Git commit done.");
        Ok::<(), GitError>(())
    }
    .await;

    match result {
        Ok(()) => logger.info("Git repository initialized."),
        Err(e) => logger.error(&format!("Failed to create the git repository: {}", e)),
    }
}
