//! package.json generation

use crate::logger::Logger;
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::path::Path;
use tokio::fs;

/// Inputs for [`create_package_json`]
///
/// The extra script/dependency lists are merged on top of the defaults, so
/// each project kind can contribute its own entries (e.g.
/// `@platformatic/db`).
#[derive(Debug, Clone, Default)]
pub struct PackageJsonParams {
    pub platformatic_version: String,
    pub fastify_version: String,
    /// Adds the `build`/`clean` scripts for TypeScript projects
    pub typescript_build: bool,
    pub scripts: Vec<(String, String)>,
    pub dependencies: Vec<(String, String)>,
    pub dev_dependencies: Vec<(String, String)>,
}

pub async fn create_package_json(
    params: &PackageJsonParams,
    logger: &dyn Logger,
    dir: &Path,
) -> Result<()> {
    let mut scripts = Map::new();
    scripts.insert("start".to_string(), json!("platformatic start"));
    if params.typescript_build {
        scripts.insert("clean".to_string(), json!("rm -fr ./dist"));
        scripts.insert("build".to_string(), json!("platformatic compile"));
    }
    for (name, command) in &params.scripts {
        scripts.insert(name.clone(), json!(command));
    }

    let mut dependencies = Map::new();
    dependencies.insert(
        "platformatic".to_string(),
        json!(format!("^{}", params.platformatic_version)),
    );
    for (name, version) in &params.dependencies {
        dependencies.insert(name.clone(), json!(version));
    }

    let mut dev_dependencies = Map::new();
    dev_dependencies.insert(
        "fastify".to_string(),
        json!(format!("^{}", params.fastify_version)),
    );
    for (name, version) in &params.dev_dependencies {
        dev_dependencies.insert(name.clone(), json!(version));
    }

    let package_json: Value = json!({
        "scripts": scripts,
        "dependencies": dependencies,
        "devDependencies": dev_dependencies,
    });

    let path = dir.join("package.json");
    let content = format!("{}\n", serde_json::to_string_pretty(&package_json)?);
    fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    logger.debug(&format!("{} successfully created.", path.display()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::test_util::MemoryLogger;

    async fn generate(params: &PackageJsonParams) -> (Value, Vec<String>) {
        let tmp = tempfile::tempdir().unwrap();
        let logger = MemoryLogger::default();
        create_package_json(params, &logger, tmp.path()).await.unwrap();
        let content = std::fs::read_to_string(tmp.path().join("package.json")).unwrap();
        (serde_json::from_str(&content).unwrap(), logger.debug_lines())
    }

    fn base_params() -> PackageJsonParams {
        PackageJsonParams {
            platformatic_version: "1.2.3".to_string(),
            fastify_version: "4.5.6".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_db_project_package_json() {
        let mut params = base_params();
        params.dependencies = vec![("@platformatic/db".to_string(), "^1.2.3".to_string())];

        let (package_json, debug) = generate(&params).await;
        assert_eq!(package_json["scripts"]["start"], "platformatic start");
        assert!(package_json["scripts"].get("build").is_none());
        assert_eq!(package_json["dependencies"]["platformatic"], "^1.2.3");
        assert_eq!(package_json["dependencies"]["@platformatic/db"], "^1.2.3");
        assert_eq!(package_json["devDependencies"]["fastify"], "^4.5.6");
        assert!(debug[0].ends_with("package.json successfully created."));
    }

    #[tokio::test]
    async fn test_service_project_with_extra_dev_dependencies() {
        let mut params = base_params();
        params.dev_dependencies = vec![("typescript".to_string(), "^5.2.2".to_string())];

        let (package_json, _) = generate(&params).await;
        assert_eq!(package_json["scripts"]["start"], "platformatic start");
        assert_eq!(package_json["dependencies"]["platformatic"], "^1.2.3");
        assert_eq!(package_json["devDependencies"]["fastify"], "^4.5.6");
        assert_eq!(package_json["devDependencies"]["typescript"], "^5.2.2");
    }

    #[tokio::test]
    async fn test_typescript_build_scripts() {
        let mut params = base_params();
        params.typescript_build = true;

        let (package_json, _) = generate(&params).await;
        assert_eq!(package_json["scripts"]["start"], "platformatic start");
        assert_eq!(package_json["scripts"]["clean"], "rm -fr ./dist");
        assert_eq!(package_json["scripts"]["build"], "platformatic compile");
        assert_eq!(package_json["dependencies"]["platformatic"], "^1.2.3");
        assert_eq!(package_json["devDependencies"]["fastify"], "^4.5.6");
    }
}
