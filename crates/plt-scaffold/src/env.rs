//! Environment file rendering
//!
//! Generated configuration never hardcodes values: it references `{VAR}`
//! placeholders that the framework resolves from `.env` at startup. This
//! module renders the companion `.env` and `.env.sample` files.

use crate::logger::Logger;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

/// Ordered map of environment variables destined for `.env` files
pub type EnvMap = BTreeMap<String, String>;

/// Render a `{NAME}` placeholder for use inside configuration values
pub fn placeholder(name: &str) -> String {
    format!("{{{}}}", name)
}

/// Copy an env map, prefixing every key with `<prefix>_`
///
/// Used in runtime context, where each composed service contributes its
/// variables to the root application under its own namespace.
pub fn prefixed(env: &EnvMap, prefix: &str) -> EnvMap {
    env.iter()
        .map(|(k, v)| (format!("{}_{}", prefix, k), v.clone()))
        .collect()
}

fn render(env: &EnvMap) -> String {
    let mut out = String::new();
    for (key, value) in env {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}

/// Write `.env` and `.env.sample` into `dir`
///
/// The sample map may differ from the live one (e.g. it always carries the
/// default database connection string). An empty map produces an empty file.
pub async fn write_env_files(
    logger: &dyn Logger,
    dir: &Path,
    env: &EnvMap,
    sample: &EnvMap,
) -> Result<()> {
    for (filename, map) in [(".env", env), (".env.sample", sample)] {
        let path = dir.join(filename);
        fs::write(&path, render(map))
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        logger.debug(&format!("{} successfully created.", path.display()));
    }
    Ok(())
}
