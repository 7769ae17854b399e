//! Platformatic Composer generation

use super::{
    plugins_section, server_env, server_section, write_config, write_sample_sources, ProjectKind,
    RuntimeContext,
};
use crate::env::{placeholder, prefixed, write_env_files, EnvMap};
use crate::logger::Logger;
use crate::versions::PackageVersions;
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::path::Path;
use tokio::fs;

/// Variable holding the origin of the standalone example service
const EXAMPLE_ORIGIN_VAR: &str = "PLT_EXAMPLE_ORIGIN";

/// Interval in milliseconds between OpenAPI refreshes of composed services
const REFRESH_TIMEOUT_MS: u32 = 1000;

#[derive(Debug, Clone)]
pub struct ComposerParams {
    pub hostname: String,
    pub port: u16,
    pub typescript: bool,
    /// Sibling services to compose; only meaningful in runtime context
    pub services_to_compose: Vec<String>,
    pub version: Option<String>,
    pub runtime_context: Option<RuntimeContext>,
}

impl Default for ComposerParams {
    fn default() -> Self {
        Self {
            hostname: crate::defaults::DEFAULT_HOSTNAME.to_string(),
            port: crate::defaults::BASE_PORT,
            typescript: false,
            services_to_compose: Vec::new(),
            version: None,
            runtime_context: None,
        }
    }
}

fn composer_section(params: &ComposerParams) -> Value {
    let services: Vec<Value> = if params.runtime_context.is_some() {
        // composed services are addressed by id over the runtime mesh
        params
            .services_to_compose
            .iter()
            .map(|id| {
                json!({
                    "id": id,
                    "openapi": {
                        "url": "/documentation/json",
                        "prefix": format!("/{}", id),
                    },
                })
            })
            .collect()
    } else {
        vec![json!({
            "id": "example",
            "origin": placeholder(EXAMPLE_ORIGIN_VAR),
            "openapi": {
                "url": "/documentation/json",
            },
        })]
    };

    json!({
        "services": services,
        "refreshTimeout": REFRESH_TIMEOUT_MS,
    })
}

/// Generate a composer project in `dir`
pub async fn create_composer(
    params: &ComposerParams,
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
        json!(ProjectKind::Composer.schema_url(&version)),
    );
    if params.runtime_context.is_none() {
        config.insert("server".to_string(), server_section());
    }
    config.insert("composer".to_string(), composer_section(params));
    config.insert(
        "plugins".to_string(),
        plugins_section(params.typescript),
    );
    write_config(logger, dir, ProjectKind::Composer, &Value::Object(config)).await?;

    let mut env = server_env(&params.hostname, params.port, params.typescript);
    let env = match &params.runtime_context {
        Some(context) => {
            write_env_files(logger, dir, &EnvMap::new(), &EnvMap::new()).await?;
            prefixed(&env, &context.env_prefix)
        }
        None => {
            // point the example service somewhere routable by default;
            // saturate so the top port does not wrap to 0
            env.insert(
                EXAMPLE_ORIGIN_VAR.to_string(),
                format!(
                    "http://{}:{}",
                    params.hostname,
                    params.port.saturating_add(1)
                ),
            );
            write_env_files(logger, dir, &env, &env).await?;
            env
        }
    };

    write_sample_sources(logger, dir, params.typescript, false).await?;

    Ok(env)
}
