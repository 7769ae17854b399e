//! Platformatic Service generation

use super::{
    plugins_section, server_env, server_section, write_config, write_sample_sources, ProjectKind,
    RuntimeContext,
};
use crate::env::{prefixed, write_env_files, EnvMap};
use crate::logger::Logger;
use crate::versions::PackageVersions;
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone)]
pub struct ServiceParams {
    pub hostname: String,
    pub port: u16,
    pub typescript: bool,
    /// Platform version used in the `$schema` URL
    pub version: Option<String>,
    pub runtime_context: Option<RuntimeContext>,
}

impl Default for ServiceParams {
    fn default() -> Self {
        Self {
            hostname: crate::defaults::DEFAULT_HOSTNAME.to_string(),
            port: crate::defaults::BASE_PORT,
            typescript: false,
            version: None,
            runtime_context: None,
        }
    }
}

/// Generate a service project in `dir`
///
/// Returns the environment map the project contributes: the variables
/// written to its own `.env`, or, in runtime context, the prefixed
/// variables the root application must carry instead.
pub async fn create_service(
    params: &ServiceParams,
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

    let mut config = Map::new();
    config.insert(
        "$schema".to_string(),
        json!(ProjectKind::Service.schema_url(&version)),
    );
    if params.runtime_context.is_none() {
        config.insert("server".to_string(), server_section());
    }
    config.insert("watch".to_string(), json!(true));
    config.insert(
        "plugins".to_string(),
        plugins_section(params.typescript),
    );
    write_config(logger, dir, ProjectKind::Service, &Value::Object(config)).await?;

    let env = server_env(&params.hostname, params.port, params.typescript);
    let env = match &params.runtime_context {
        Some(context) => {
            // hostname and port travel through the runtime, not the local .env
            write_env_files(logger, dir, &EnvMap::new(), &EnvMap::new()).await?;
            prefixed(&env, &context.env_prefix)
        }
        None => {
            write_env_files(logger, dir, &env, &env).await?;
            env
        }
    };

    write_sample_sources(logger, dir, params.typescript, true).await?;

    Ok(env)
}
