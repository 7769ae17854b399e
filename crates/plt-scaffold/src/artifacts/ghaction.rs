//! GitHub Actions deploy workflow generation
//!
//! Two flavours exist: the static workspace workflow deploys `main` on push,
//! the dynamic workspace workflow deploys pull requests to ephemeral
//! workspaces (PR previews). Both are assembled as strings because the job
//! `env:` block needs exact indentation and `${{ secrets.* }}` expressions
//! that a YAML serializer would quote.

use crate::env::EnvMap;
use crate::logger::Logger;
use crate::project::ProjectKind;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Workflow file name for static workspace deployments
pub const STATIC_WORKFLOW_FILE: &str = "platformatic-static-workspace-deploy.yml";

/// Workflow file name for dynamic workspace (PR preview) deployments
pub const DYNAMIC_WORKFLOW_FILE: &str = "platformatic-dynamic-workspace-deploy.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkspaceKind {
    Static,
    Dynamic,
}

impl WorkspaceKind {
    fn filename(self) -> &'static str {
        match self {
            Self::Static => STATIC_WORKFLOW_FILE,
            Self::Dynamic => DYNAMIC_WORKFLOW_FILE,
        }
    }

    fn id_secret(self) -> &'static str {
        match self {
            Self::Static => "PLATFORMATIC_STATIC_WORKSPACE_ID",
            Self::Dynamic => "PLATFORMATIC_DYNAMIC_WORKSPACE_ID",
        }
    }

    fn key_secret(self) -> &'static str {
        match self {
            Self::Static => "PLATFORMATIC_STATIC_WORKSPACE_API_KEY",
            Self::Dynamic => "PLATFORMATIC_DYNAMIC_WORKSPACE_API_KEY",
        }
    }

    fn created_message(self) -> &'static str {
        match self {
            Self::Static => {
                "Github action successfully created, please add the following secrets as repository secrets: "
            }
            Self::Dynamic => {
                "PR Previews are enabled for your app and the Github action was successfully created, please add the following secrets as repository secrets: "
            }
        }
    }
}

/// Variables whose name does not carry the `PLT_` prefix hold credentials
/// (e.g. `DATABASE_URL`) and must come from repository secrets.
fn is_secret(key: &str) -> bool {
    !key.starts_with("PLT_")
}

/// Render the job-level `env:` block, or nothing for an empty map
///
/// Indentation is fixed by the surrounding workflow: the block sits under
/// `jobs.build_and_deploy` (4 spaces), its entries one level deeper.
fn env_block(env: &EnvMap) -> String {
    if env.is_empty() {
        return String::new();
    }
    let mut block = String::from("    env:\n");
    for (key, value) in env {
        if is_secret(key) {
            block.push_str(&format!("      {key}: ${{{{ secrets.{key} }}}}\n"));
        } else {
            block.push_str(&format!("      {key}: {value}\n"));
        }
    }
    block
}

fn build_workflow(
    workspace: WorkspaceKind,
    env: &EnvMap,
    kind: ProjectKind,
    typescript_build: bool,
) -> String {
    let mut workflow = String::from("name: Deploy Platformatic application to the cloud\n");

    match workspace {
        WorkspaceKind::Static => workflow.push_str(
            "on:
  push:
    branches:
      - main
    paths-ignore:
      - 'docs/**'
      - '**.md'
",
        ),
        WorkspaceKind::Dynamic => workflow.push_str(
            "on:
  pull_request:
    paths-ignore:
      - 'docs/**'
      - '**.md'
",
        ),
    }

    workflow.push_str(
        "jobs:
  build_and_deploy:
    permissions:
      contents: read
",
    );
    if workspace == WorkspaceKind::Dynamic {
        workflow.push_str("      pull-requests: write\n");
    }
    workflow.push_str("    runs-on: ubuntu-latest\n");
    workflow.push_str(&env_block(env));

    workflow.push_str(
        "    steps:
      - name: Checkout application project repository
        uses: actions/checkout@v3
      - name: npm install --omit=dev
        run: npm install --omit=dev
",
    );
    if typescript_build {
        workflow.push_str(
            "      - name: Build project
        run: npm run build
",
        );
    }
    workflow.push_str(&format!(
        "      - name: Deploy project
        uses: platformatic/onestep@latest
        with:
          github_token: ${{{{ secrets.GITHUB_TOKEN }}}}
          platformatic_workspace_id: ${{{{ secrets.{id} }}}}
          platformatic_workspace_key: ${{{{ secrets.{key} }}}}
          platformatic_config_path: ./{config}
",
        id = workspace.id_secret(),
        key = workspace.key_secret(),
        config = kind.config_filename(),
    ));

    workflow
}

async fn create_workflow(
    workspace: WorkspaceKind,
    logger: &dyn Logger,
    env: &EnvMap,
    kind: ProjectKind,
    dir: &Path,
    typescript_build: bool,
) -> Result<()> {
    let workflows_dir = dir.join(".github").join("workflows");
    fs::create_dir_all(&workflows_dir)
        .await
        .with_context(|| format!("Failed to create {}", workflows_dir.display()))?;

    let path = workflows_dir.join(workspace.filename());
    fs::write(&path, build_workflow(workspace, env, kind, typescript_build))
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    logger.info(workspace.created_message());

    let mut secrets = format!(
        "\n  {}: your workspace id\n  {}: your workspace API key",
        workspace.id_secret(),
        workspace.key_secret()
    );
    for (secret_key, value) in env.iter().filter(|(k, _)| is_secret(k)) {
        secrets.push_str(&format!("\n  {}: {}", secret_key, value));
    }
    logger.info(&secrets);

    if !dir.join(".git").exists() {
        logger.warn("No git repository found. The Github action won't be triggered.");
    }

    Ok(())
}

/// Create the deploy-on-push workflow
pub async fn create_static_workspace_gh_action(
    logger: &dyn Logger,
    env: &EnvMap,
    kind: ProjectKind,
    dir: &Path,
    typescript_build: bool,
) -> Result<()> {
    create_workflow(WorkspaceKind::Static, logger, env, kind, dir, typescript_build).await
}

/// Create the PR preview workflow
pub async fn create_dynamic_workspace_gh_action(
    logger: &dyn Logger,
    env: &EnvMap,
    kind: ProjectKind,
    dir: &Path,
    typescript_build: bool,
) -> Result<()> {
    create_workflow(WorkspaceKind::Dynamic, logger, env, kind, dir, typescript_build).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::test_util::MemoryLogger;
    use serde_yaml::Value;

    fn test_env() -> EnvMap {
        EnvMap::from([
            ("DATABASE_URL".to_string(), "mydbconnectionstring".to_string()),
            ("PLT_SERVER_LOGGER_LEVEL".to_string(), "info".to_string()),
        ])
    }

    fn job(workflow: &Value) -> Value {
        workflow["jobs"]["build_and_deploy"].clone()
    }

    #[tokio::test]
    async fn test_creates_static_gh_action() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = MemoryLogger::default();

        create_static_workspace_gh_action(&logger, &test_env(), ProjectKind::Db, tmp.path(), false)
            .await
            .unwrap();

        assert_eq!(
            logger.info_lines()[0],
            "Github action successfully created, please add the following secrets as repository secrets: "
        );
        let path = tmp
            .path()
            .join(".github/workflows/platformatic-static-workspace-deploy.yml");
        let raw = std::fs::read_to_string(&path).unwrap();
        let workflow: Value = serde_yaml::from_str(&raw).unwrap();
        let job = job(&workflow);

        let steps = job["steps"].as_sequence().unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0]["name"], "Checkout application project repository");
        assert_eq!(steps[1]["name"], "npm install --omit=dev");
        assert_eq!(steps[2]["name"], "Deploy project");

        assert_eq!(job["env"]["DATABASE_URL"], "${{ secrets.DATABASE_URL }}");
        assert_eq!(job["env"]["PLT_SERVER_LOGGER_LEVEL"], "info");
        assert_eq!(job["permissions"]["contents"], "read");
        assert!(job["permissions"].get("pull-requests").is_none());

        // env indentation: block at job level, entries one level deeper
        assert!(raw.contains("    env:\n      DATABASE_URL: ${{ secrets.DATABASE_URL }}\n      PLT_SERVER_LOGGER_LEVEL: info\n"));
    }

    #[tokio::test]
    async fn test_creates_dynamic_gh_action() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = MemoryLogger::default();

        create_dynamic_workspace_gh_action(&logger, &test_env(), ProjectKind::Db, tmp.path(), false)
            .await
            .unwrap();

        assert_eq!(
            logger.info_lines()[0],
            "PR Previews are enabled for your app and the Github action was successfully created, please add the following secrets as repository secrets: "
        );
        let raw = std::fs::read_to_string(
            tmp.path()
                .join(".github/workflows/platformatic-dynamic-workspace-deploy.yml"),
        )
        .unwrap();
        let workflow: Value = serde_yaml::from_str(&raw).unwrap();
        let job = job(&workflow);

        let steps = job["steps"].as_sequence().unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(job["permissions"]["contents"], "read");
        assert_eq!(job["permissions"]["pull-requests"], "write");
        assert!(workflow["on"].get("pull_request").is_some());
    }

    #[tokio::test]
    async fn test_env_block_is_omitted_for_empty_env() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = MemoryLogger::default();

        create_static_workspace_gh_action(
            &logger,
            &EnvMap::new(),
            ProjectKind::Db,
            tmp.path(),
            false,
        )
        .await
        .unwrap();

        let raw = std::fs::read_to_string(
            tmp.path()
                .join(".github/workflows/platformatic-static-workspace-deploy.yml"),
        )
        .unwrap();
        let workflow: Value = serde_yaml::from_str(&raw).unwrap();
        assert!(job(&workflow).get("env").is_none());
    }

    #[tokio::test]
    async fn test_typescript_adds_build_step() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = MemoryLogger::default();

        create_static_workspace_gh_action(&logger, &test_env(), ProjectKind::Db, tmp.path(), true)
            .await
            .unwrap();

        let raw = std::fs::read_to_string(
            tmp.path()
                .join(".github/workflows/platformatic-static-workspace-deploy.yml"),
        )
        .unwrap();
        let workflow: Value = serde_yaml::from_str(&raw).unwrap();
        let job = job(&workflow);
        let steps = job["steps"].as_sequence().unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[2]["name"], "Build project");
        assert_eq!(steps[3]["name"], "Deploy project");
    }

    #[tokio::test]
    async fn test_secrets_summary_and_git_warning() {
        let tmp = tempfile::tempdir().unwrap();
        let logger = MemoryLogger::default();

        create_static_workspace_gh_action(&logger, &test_env(), ProjectKind::Db, tmp.path(), false)
            .await
            .unwrap();

        let infos = logger.info_lines();
        let secret_lines: Vec<&str> = infos[1].split('\n').collect();
        assert_eq!(
            secret_lines[1].trim(),
            "PLATFORMATIC_STATIC_WORKSPACE_ID: your workspace id"
        );
        assert_eq!(
            secret_lines[2].trim(),
            "PLATFORMATIC_STATIC_WORKSPACE_API_KEY: your workspace API key"
        );
        assert_eq!(secret_lines[3].trim(), "DATABASE_URL: mydbconnectionstring");
        assert_eq!(
            logger.warn_lines()[0],
            "No git repository found. The Github action won't be triggered."
        );
    }

    #[tokio::test]
    async fn test_no_git_warning_when_repository_exists() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join(".git")).unwrap();
        let logger = MemoryLogger::default();

        create_static_workspace_gh_action(&logger, &test_env(), ProjectKind::Db, tmp.path(), false)
            .await
            .unwrap();

        assert!(logger.warn_lines().is_empty());
        assert_eq!(logger.info_lines().len(), 2);
    }
}
