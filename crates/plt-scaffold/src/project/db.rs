//! Platformatic DB generation

use super::{
    server_env, server_section, write_config, write_sample_sources, ProjectKind, RuntimeContext,
    DATABASE_URL_VAR, TYPESCRIPT_VAR,
};
use crate::defaults::DEFAULT_CONNECTION_STRING;
use crate::env::{placeholder, prefixed, write_env_files, EnvMap};
use crate::logger::Logger;
use crate::versions::PackageVersions;
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::path::Path;
use tokio::fs;

const MIGRATION_DO: &str = include_str!("../../assets/migrations/001.do.sql");
const MIGRATION_UNDO: &str = include_str!("../../assets/migrations/001.undo.sql");

#[derive(Debug, Clone)]
pub struct DbParams {
    pub hostname: String,
    pub port: u16,
    /// Defaults to the SQLite connection string when not set
    pub connection_string: Option<String>,
    /// Migrations directory; `None` or an empty string disables migrations
    pub migrations: Option<String>,
    /// Create the sample plugin and route
    pub plugin: bool,
    pub typescript: bool,
    pub version: Option<String>,
    pub runtime_context: Option<RuntimeContext>,
}

impl Default for DbParams {
    fn default() -> Self {
        Self {
            hostname: crate::defaults::DEFAULT_HOSTNAME.to_string(),
            port: crate::defaults::BASE_PORT,
            connection_string: None,
            migrations: Some("migrations".to_string()),
            plugin: true,
            typescript: false,
            version: None,
            runtime_context: None,
        }
    }
}

impl DbParams {
    fn migrations_dir(&self) -> Option<&str> {
        self.migrations.as_deref().filter(|dir| !dir.is_empty())
    }
}

/// `plugins` section for the DB kind; routes use the object form here,
/// unlike the other kinds
fn plugins_section(typescript: bool) -> Value {
    let mut plugins = json!({
        "paths": [
            { "path": "./plugins", "encapsulate": false },
            { "path": "./routes" },
        ],
    });
    if typescript {
        plugins["typescript"] = json!(placeholder(TYPESCRIPT_VAR));
    }
    plugins
}

/// Generate a DB project in `dir`
///
/// The connection string always stays in the local `.env` (a database is
/// service-local even inside a runtime); `.env.sample` carries the default
/// SQLite string so real credentials never land in version control.
pub async fn create_db(params: &DbParams, logger: &dyn Logger, dir: &Path) -> Result<EnvMap> {
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
        json!(ProjectKind::Db.schema_url(&version)),
    );
    if params.runtime_context.is_none() {
        config.insert("server".to_string(), server_section());
    }
    config.insert(
        "db".to_string(),
        json!({
            "connectionString": placeholder(DATABASE_URL_VAR),
            "graphql": true,
            "openapi": true,
            "schemalock": true,
        }),
    );
    if let Some(migrations_dir) = params.migrations_dir() {
        config.insert("migrations".to_string(), json!({ "dir": migrations_dir }));
    }
    if params.plugin {
        config.insert(
            "plugins".to_string(),
            plugins_section(params.typescript),
        );
    }
    write_config(logger, dir, ProjectKind::Db, &Value::Object(config)).await?;

    let connection_string = params
        .connection_string
        .clone()
        .unwrap_or_else(|| DEFAULT_CONNECTION_STRING.to_string());

    let mut env = EnvMap::from([(DATABASE_URL_VAR.to_string(), connection_string)]);
    let mut sample = EnvMap::from([(
        DATABASE_URL_VAR.to_string(),
        DEFAULT_CONNECTION_STRING.to_string(),
    )]);

    let returned = match &params.runtime_context {
        Some(context) => {
            write_env_files(logger, dir, &env, &sample).await?;
            prefixed(
                &server_env(&params.hostname, params.port, params.typescript),
                &context.env_prefix,
            )
        }
        None => {
            env.extend(server_env(&params.hostname, params.port, params.typescript));
            sample.extend(server_env(&params.hostname, params.port, params.typescript));
            write_env_files(logger, dir, &env, &sample).await?;
            env
        }
    };

    if let Some(migrations_dir) = params.migrations_dir() {
        let migrations_path = dir.join(migrations_dir);
        fs::create_dir_all(&migrations_path)
            .await
            .with_context(|| format!("Failed to create {}", migrations_path.display()))?;
        logger.debug(&format!(
            "Migrations folder {} successfully created.",
            migrations_dir
        ));

        for (filename, content) in [("001.do.sql", MIGRATION_DO), ("001.undo.sql", MIGRATION_UNDO)]
        {
            let path = migrations_path.join(filename);
            fs::write(&path, content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            logger.debug(&format!("Migration file {} successfully created.", filename));
        }
    }

    if params.plugin {
        write_sample_sources(logger, dir, params.typescript, false).await?;
    }

    Ok(returned)
}
