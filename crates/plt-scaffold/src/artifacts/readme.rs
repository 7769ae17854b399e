//! README generation

use crate::logger::Logger;
use crate::project::ProjectKind;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Write the README bundled for the given project kind
pub async fn create_readme(logger: &dyn Logger, dir: &Path, kind: ProjectKind) -> Result<()> {
    let content = match kind {
        ProjectKind::Db => include_str!("../../assets/readme/db.md"),
        ProjectKind::Service => include_str!("../../assets/readme/service.md"),
        ProjectKind::Composer => include_str!("../../assets/readme/composer.md"),
        ProjectKind::Runtime => include_str!("../../assets/readme/runtime.md"),
    };

    let path = dir.join("README.md");
    fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    logger.debug(&format!("{} successfully created.", path.display()));

    Ok(())
}
