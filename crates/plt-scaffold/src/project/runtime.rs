//! Platformatic Runtime generation
//!
//! A runtime is the root of a composed application: it autoloads the
//! services found under its services directory and exposes a single
//! entrypoint. The member services are generated separately, each with a
//! [`RuntimeContext`](super::RuntimeContext), and contribute their
//! prefixed environment variables to [`RuntimeParams::env`].

use super::{write_config, ProjectKind};
use crate::env::{write_env_files, EnvMap};
use crate::logger::Logger;
use crate::versions::PackageVersions;
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct RuntimeParams {
    /// Directory the runtime autoloads services from
    pub services_dir: PathBuf,
    /// Name of the service exposed by the runtime
    pub entrypoint: String,
    /// Merged environment of all member services
    pub env: EnvMap,
    /// Platform version used in the `$schema` URL
    pub version: Option<String>,
}

impl Default for RuntimeParams {
    fn default() -> Self {
        Self {
            services_dir: PathBuf::from(crate::defaults::DEFAULT_SERVICES_DIR),
            entrypoint: String::new(),
            env: EnvMap::new(),
            version: None,
        }
    }
}

/// Generate a runtime project in `dir`
pub async fn create_runtime(
    params: &RuntimeParams,
    logger: &dyn Logger,
    dir: &Path,
) -> Result<EnvMap> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let version = params
        .version
        .clone()
        .unwrap_or_else(|| PackageVersions::default().platformatic);

    // The autoload path must stay portable when the project moves
    let autoload_path = params
        .services_dir
        .strip_prefix(dir)
        .unwrap_or(&params.services_dir);

    let mut config = Map::new();
    config.insert(
        "$schema".to_string(),
        json!(ProjectKind::Runtime.schema_url(&version)),
    );
    config.insert("entrypoint".to_string(), json!(params.entrypoint));
    config.insert("allowCycles".to_string(), json!(false));
    config.insert("hotReload".to_string(), json!(true));
    config.insert(
        "autoload".to_string(),
        json!({
            "path": autoload_path.to_string_lossy(),
            "exclude": ["docs"],
        }),
    );
    write_config(logger, dir, ProjectKind::Runtime, &Value::Object(config)).await?;

    write_env_files(logger, dir, &params.env, &params.env).await?;

    Ok(params.env.clone())
}

/// List the service names under `services_dir`
///
/// A service is any direct subdirectory holding a `platformatic.<kind>.json`
/// configuration. Names come back sorted for stable entrypoint selection.
pub fn discover_services(services_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(services_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| {
            ProjectKind::ALL
                .iter()
                .any(|kind| entry.path().join(kind.config_filename()).exists())
        })
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::test_util::MemoryLogger;
    use jsonschema::JSONSchema;

    const SCHEMA: &str = include_str!("../../schemas/runtime.json");

    fn assert_valid(config: &Value) {
        let schema = serde_json::from_str(SCHEMA).unwrap();
        let compiled = JSONSchema::compile(&schema).unwrap();
        assert!(compiled.is_valid(config), "config does not match the schema");
    }

    #[tokio::test]
    async fn test_creates_runtime() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = MemoryLogger::default();
        let params = RuntimeParams {
            services_dir: tmp.path().join("services"),
            entrypoint: "main".to_string(),
            env: EnvMap::from([
                ("MAIN_PORT".to_string(), "3042".to_string()),
                (
                    "MAIN_PLT_SERVER_HOSTNAME".to_string(),
                    "127.0.0.1".to_string(),
                ),
            ]),
            ..Default::default()
        };

        create_runtime(&params, &logger, tmp.path()).await.unwrap();

        let config: Value = serde_json::from_str(
            &std::fs::read_to_string(tmp.path().join("platformatic.runtime.json")).unwrap(),
        )
        .unwrap();
        assert_valid(&config);
        assert_eq!(config["entrypoint"], "main");
        assert_eq!(config["allowCycles"], false);
        assert_eq!(config["hotReload"], true);
        // absolute services dir is written relative to the project root
        assert_eq!(config["autoload"]["path"], "services");
        assert_eq!(config["autoload"]["exclude"], json!(["docs"]));

        let env = std::fs::read_to_string(tmp.path().join(".env")).unwrap();
        assert!(env.contains("MAIN_PORT=3042"));
        assert!(env.contains("MAIN_PLT_SERVER_HOSTNAME=127.0.0.1"));
        let sample = std::fs::read_to_string(tmp.path().join(".env.sample")).unwrap();
        assert_eq!(env, sample);
    }

    #[tokio::test]
    async fn test_relative_services_dir_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = MemoryLogger::default();
        let params = RuntimeParams {
            services_dir: PathBuf::from("packages"),
            entrypoint: "api".to_string(),
            ..Default::default()
        };

        create_runtime(&params, &logger, tmp.path()).await.unwrap();

        let config: Value = serde_json::from_str(
            &std::fs::read_to_string(tmp.path().join("platformatic.runtime.json")).unwrap(),
        )
        .unwrap();
        assert_valid(&config);
        assert_eq!(config["autoload"]["path"], "packages");
    }

    #[test]
    fn test_discover_services() {
        let tmp = tempfile::tempdir().unwrap();
        let services = tmp.path().join("services");

        std::fs::create_dir_all(services.join("alpha")).unwrap();
        std::fs::write(services.join("alpha/platformatic.service.json"), "{}").unwrap();
        std::fs::create_dir_all(services.join("beta")).unwrap();
        std::fs::write(services.join("beta/platformatic.db.json"), "{}").unwrap();
        // not a service, no configuration inside
        std::fs::create_dir_all(services.join("docs")).unwrap();
        // plain file at the top level is ignored too
        std::fs::write(services.join("README.md"), "").unwrap();

        assert_eq!(discover_services(&services), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_discover_services_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discover_services(&tmp.path().join("nope")).is_empty());
    }
}
