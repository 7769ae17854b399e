//! Project generators for the four application kinds

pub mod composer;
pub mod db;
pub mod runtime;
pub mod service;

pub use composer::{create_composer, ComposerParams};
pub use db::{create_db, DbParams};
pub use runtime::{create_runtime, discover_services, RuntimeParams};
pub use service::{create_service, ServiceParams};

use crate::env::{placeholder, EnvMap};
use crate::logger::Logger;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;

pub(crate) const SERVER_HOSTNAME_VAR: &str = "PLT_SERVER_HOSTNAME";
pub(crate) const SERVER_PORT_VAR: &str = "PORT";
pub(crate) const SERVER_LOGGER_LEVEL_VAR: &str = "PLT_SERVER_LOGGER_LEVEL";
pub(crate) const TYPESCRIPT_VAR: &str = "PLT_TYPESCRIPT";
pub(crate) const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// The four kinds of Platformatic application this tool can scaffold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Db,
    Service,
    Composer,
    Runtime,
}

impl ProjectKind {
    pub const ALL: [ProjectKind; 4] = [
        ProjectKind::Db,
        ProjectKind::Service,
        ProjectKind::Composer,
        ProjectKind::Runtime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Db => "db",
            Self::Service => "service",
            Self::Composer => "composer",
            Self::Runtime => "runtime",
        }
    }

    /// Name shown in the wizard's kind selection
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Db => "DB",
            Self::Service => "Service",
            Self::Composer => "Composer",
            Self::Runtime => "Runtime",
        }
    }

    pub fn config_filename(&self) -> &'static str {
        match self {
            Self::Db => "platformatic.db.json",
            Self::Service => "platformatic.service.json",
            Self::Composer => "platformatic.composer.json",
            Self::Runtime => "platformatic.runtime.json",
        }
    }

    /// npm package implementing this kind
    pub fn npm_package(&self) -> &'static str {
        match self {
            Self::Db => "@platformatic/db",
            Self::Service => "@platformatic/service",
            Self::Composer => "@platformatic/composer",
            Self::Runtime => "@platformatic/runtime",
        }
    }

    /// `$schema` URL written at the top of the configuration
    pub fn schema_url(&self, version: &str) -> String {
        format!("https://platformatic.dev/schemas/v{}/{}", version, self.as_str())
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "db" => Ok(Self::Db),
            "service" => Ok(Self::Service),
            "composer" => Ok(Self::Composer),
            "runtime" => Ok(Self::Runtime),
            other => Err(format!(
                "unknown project kind '{}' (expected db, service, composer or runtime)",
                other
            )),
        }
    }
}

/// Marks a generation as part of a composed runtime application
///
/// Composed services have no `server` section (the runtime exposes only the
/// entrypoint) and hand their environment variables up to the root under a
/// per-service prefix.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Names of all sibling services in the runtime
    pub services_names: Vec<String>,
    /// Prefix applied to this service's environment variables
    pub env_prefix: String,
}

impl RuntimeContext {
    /// Derive an env prefix from a service name (`"my-api"` -> `"MY_API"`)
    pub fn env_prefix_for(name: &str) -> String {
        name.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

/// `server` section with placeholders resolved from `.env`
pub(crate) fn server_section() -> Value {
    json!({
        "hostname": placeholder(SERVER_HOSTNAME_VAR),
        "port": placeholder(SERVER_PORT_VAR),
        "logger": { "level": placeholder(SERVER_LOGGER_LEVEL_VAR) },
    })
}

/// `plugins` section loading `./plugins` unencapsulated plus `./routes`
pub(crate) fn plugins_section(typescript: bool) -> Value {
    let mut plugins = json!({
        "paths": [
            { "path": "./plugins", "encapsulate": false },
            "./routes",
        ],
    });
    if typescript {
        plugins["typescript"] = json!(placeholder(TYPESCRIPT_VAR));
    }
    plugins
}

/// Environment variables backing the `server` section placeholders
pub(crate) fn server_env(hostname: &str, port: u16, typescript: bool) -> EnvMap {
    let mut env = EnvMap::from([
        (SERVER_HOSTNAME_VAR.to_string(), hostname.to_string()),
        (SERVER_PORT_VAR.to_string(), port.to_string()),
        (SERVER_LOGGER_LEVEL_VAR.to_string(), "info".to_string()),
    ]);
    if typescript {
        env.insert(TYPESCRIPT_VAR.to_string(), "true".to_string());
    }
    env
}

/// Serialize a configuration object into `dir`
pub(crate) async fn write_config(
    logger: &dyn Logger,
    dir: &Path,
    kind: ProjectKind,
    config: &Value,
) -> Result<PathBuf> {
    let path = dir.join(kind.config_filename());
    let content = format!("{}\n", serde_json::to_string_pretty(config)?);
    fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    logger.debug(&format!(
        "Configuration file {} successfully created.",
        path.display()
    ));
    Ok(path)
}

const JS_SOURCES: &[(&str, &str)] = &[
    ("plugins/example.js", include_str!("../../assets/plugins/example.js")),
    ("routes/root.js", include_str!("../../assets/routes/root.js")),
];

const TS_SOURCES: &[(&str, &str)] = &[
    ("plugins/example.ts", include_str!("../../assets/plugins/example.ts")),
    ("routes/root.ts", include_str!("../../assets/routes/root.ts")),
    ("tsconfig.json", include_str!("../../assets/tsconfig.json")),
];

const JS_TEST_SOURCES: &[(&str, &str)] = &[
    ("test/helper.js", include_str!("../../assets/test/helper.js")),
    (
        "test/plugins/example.test.js",
        include_str!("../../assets/test/plugins/example.test.js"),
    ),
    (
        "test/routes/root.test.js",
        include_str!("../../assets/test/routes/root.test.js"),
    ),
];

const TS_TEST_SOURCES: &[(&str, &str)] = &[
    ("test/helper.ts", include_str!("../../assets/test/helper.ts")),
    (
        "test/plugins/example.test.ts",
        include_str!("../../assets/test/plugins/example.test.ts"),
    ),
    (
        "test/routes/root.test.ts",
        include_str!("../../assets/test/routes/root.test.ts"),
    ),
];

/// Write the sample plugin/route sources (and optionally their tests)
pub(crate) async fn write_sample_sources(
    logger: &dyn Logger,
    dir: &Path,
    typescript: bool,
    with_tests: bool,
) -> Result<()> {
    let mut sources: Vec<&[(&str, &str)]> = Vec::new();
    if typescript {
        sources.push(TS_SOURCES);
        if with_tests {
            sources.push(TS_TEST_SOURCES);
        }
    } else {
        sources.push(JS_SOURCES);
        if with_tests {
            sources.push(JS_TEST_SOURCES);
        }
    }

    for (relative, content) in sources.into_iter().flatten() {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        logger.debug(&format!("{} successfully created.", path.display()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in ProjectKind::ALL {
            assert_eq!(kind.as_str().parse::<ProjectKind>().unwrap(), kind);
        }
        assert!("frontend".parse::<ProjectKind>().is_err());
    }

    #[test]
    fn test_config_filenames() {
        assert_eq!(ProjectKind::Db.config_filename(), "platformatic.db.json");
        assert_eq!(
            ProjectKind::Runtime.config_filename(),
            "platformatic.runtime.json"
        );
    }

    #[test]
    fn test_schema_url() {
        assert_eq!(
            ProjectKind::Service.schema_url("1.2.3"),
            "https://platformatic.dev/schemas/v1.2.3/service"
        );
    }

    #[test]
    fn test_env_prefix_for() {
        assert_eq!(RuntimeContext::env_prefix_for("my-api"), "MY_API");
        assert_eq!(RuntimeContext::env_prefix_for("media_store"), "MEDIA_STORE");
        assert_eq!(RuntimeContext::env_prefix_for("svc2"), "SVC2");
    }

    #[test]
    fn test_server_section_uses_placeholders() {
        let server = server_section();
        assert_eq!(server["hostname"], "{PLT_SERVER_HOSTNAME}");
        assert_eq!(server["port"], "{PORT}");
        assert_eq!(server["logger"]["level"], "{PLT_SERVER_LOGGER_LEVEL}");
    }

    #[test]
    fn test_plugins_section() {
        let plugins = plugins_section(false);
        assert_eq!(plugins["paths"][0]["path"], "./plugins");
        assert_eq!(plugins["paths"][0]["encapsulate"], false);
        assert_eq!(plugins["paths"][1], "./routes");
        assert!(plugins.get("typescript").is_none());

        let plugins = plugins_section(true);
        assert_eq!(plugins["typescript"], "{PLT_TYPESCRIPT}");
    }
}
