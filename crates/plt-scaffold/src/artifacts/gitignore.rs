//! .gitignore generation

use crate::logger::Logger;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

const GITIGNORE: &str = include_str!("../../assets/gitignore");

/// Write the bundled `.gitignore`; an existing file is never overwritten
pub async fn create_gitignore(logger: &dyn Logger, dir: &Path) -> Result<()> {
    let path = dir.join(".gitignore");

    if fs::try_exists(&path).await.unwrap_or(false) {
        logger.warn(&format!(
            "Gitignore file {} found, skipping creation of gitignore file.",
            path.display()
        ));
        return Ok(());
    }

    fs::write(&path, GITIGNORE)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    logger.debug(&format!(
        "Gitignore file {} successfully created.",
        path.display()
    ));

    Ok(())
}
