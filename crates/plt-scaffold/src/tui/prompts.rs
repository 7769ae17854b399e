//! The `create-platformatic` wizard flow

use super::ClackLogger;
use crate::artifacts::{
    create_dynamic_workspace_gh_action, create_git_repository, create_gitignore,
    create_package_json, create_readme, create_static_workspace_gh_action, PackageJsonParams,
};
use crate::defaults::{DATABASES, DEFAULT_CONNECTION_STRING, DEFAULT_HOSTNAME, DEFAULT_SERVICES_DIR};
use crate::env::EnvMap;
use crate::logger::Logger;
use crate::pkg_manager::PackageManager;
use crate::project::{
    create_composer, create_db, create_runtime, create_service, discover_services, ComposerParams,
    DbParams, ProjectKind, RuntimeContext, RuntimeParams, ServiceParams,
};
use crate::versions::{check_node_version, PackageVersions, VersionFetcher};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// CLI arguments for the create command
///
/// Every `Option` skips the matching prompt when set; `yes` takes the
/// default answer for whatever is still unset.
#[derive(Debug, Clone, Default)]
pub struct WizardArgs {
    /// Project kind to create
    pub kind: Option<ProjectKind>,

    /// Project directory to create
    pub directory: Option<PathBuf>,

    /// Server hostname written to `.env`
    pub hostname: Option<String>,

    /// Server port written to `.env`
    pub port: Option<u16>,

    /// Use TypeScript for the sample plugin and routes
    pub typescript: Option<bool>,

    /// Run the package manager's install step after generation
    pub install: Option<bool>,

    /// Create the GitHub Actions deploy workflow
    pub github_actions: Option<bool>,

    /// Create the GitHub Actions PR preview workflow
    pub pr_previews: Option<bool>,

    /// Initialize a git repository with a first commit
    pub init_git: Option<bool>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,

    /// Show debug output from the generators
    pub verbose: bool,
}

/// Answers to the questions only one project kind asks
enum KindAnswers {
    Db {
        connection_string: String,
        migrations: bool,
        plugin: bool,
    },
    Service,
    Composer,
    Runtime {
        services_dir: String,
        services_names: Vec<String>,
        entrypoint: String,
    },
}

/// Run the wizard with interactive prompts
pub async fn run(args: WizardArgs) -> Result<()> {
    cliclack::intro("Welcome to Platformatic!")?;

    let logger = ClackLogger {
        verbose: args.verbose,
    };

    check_node_version(&logger);
    let pkg_manager = PackageManager::detect();

    let versions = resolve_versions(&logger).await;

    // All answers are collected before any file is written
    let kind = select_kind(&args)?;
    let project_dir = select_directory(&args, kind)?;
    let kind_answers = select_kind_answers(&args, kind, &project_dir)?;
    let hostname = select_hostname(&args)?;
    let port = match kind {
        // the runtime has no server of its own, member services draw
        // their ports from the default counter
        ProjectKind::Runtime => None,
        _ => Some(select_port(&args)?),
    };
    let typescript = confirm(
        &args,
        args.typescript,
        "Do you want to use TypeScript?",
        true,
    )?;
    let install = confirm(
        &args,
        args.install,
        &format!("Do you want to run {} install?", pkg_manager),
        true,
    )?;
    let github_actions = confirm(
        &args,
        args.github_actions,
        "Do you want to create the github action to deploy this application?",
        true,
    )?;
    let pr_previews = github_actions
        && confirm(
            &args,
            args.pr_previews,
            "Do you want to enable PR Previews in your application?",
            true,
        )?;
    let init_git = confirm(
        &args,
        args.init_git,
        "Do you want to init the git repository?",
        false,
    )?;

    let env = generate_project(
        &logger,
        &project_dir,
        kind_answers,
        &hostname,
        port,
        typescript,
        &versions,
    )
    .await?;

    create_readme(&logger, &project_dir, kind).await?;
    create_gitignore(&logger, &project_dir).await?;
    create_package_json(
        &package_json_params(kind, typescript, &versions),
        &logger,
        &project_dir,
    )
    .await?;

    if github_actions {
        create_static_workspace_gh_action(&logger, &env, kind, &project_dir, typescript).await?;
    }
    if pr_previews {
        create_dynamic_workspace_gh_action(&logger, &env, kind, &project_dir, typescript).await?;
    }

    if init_git {
        create_git_repository(&logger, &project_dir).await;
    }

    let installed = if install {
        let spinner = cliclack::spinner();
        spinner.start(format!("Installing dependencies with {}...", pkg_manager));
        let installed = pkg_manager
            .run_install(&logger, &project_dir)
            .await
            .unwrap_or(false);
        if installed {
            spinner.stop("Dependencies installed");
        } else {
            spinner.stop("Install skipped");
        }
        installed
    } else {
        false
    };

    print_next_steps(&project_dir, pkg_manager, installed)?;

    Ok(())
}

async fn resolve_versions(logger: &ClackLogger) -> PackageVersions {
    let spinner = cliclack::spinner();
    spinner.start("Fetching the latest Platformatic version...");
    let versions = match VersionFetcher::new(crate::USER_AGENT) {
        Ok(fetcher) => fetcher.resolve(logger).await,
        Err(e) => {
            logger.warn(&format!("{:#}", e));
            PackageVersions::default()
        }
    };
    spinner.stop(format!("Using Platformatic v{}", versions.platformatic));
    versions
}

fn select_kind(args: &WizardArgs) -> Result<ProjectKind> {
    if let Some(kind) = args.kind {
        cliclack::log::info(format!("Creating a Platformatic {}.", kind.display_name()))?;
        return Ok(kind);
    }
    if args.yes {
        return Ok(ProjectKind::Service);
    }

    let mut select = cliclack::select("Which kind of project do you want to create?");
    for kind in ProjectKind::ALL {
        select = select.item(kind, kind.display_name(), "");
    }
    Ok(select.interact()?)
}

fn select_directory(args: &WizardArgs, kind: ProjectKind) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let default_name = format!("platformatic-{}", kind);

    let path = if let Some(dir) = &args.directory {
        let p = if dir.is_absolute() {
            dir.clone()
        } else {
            current_dir.join(dir)
        };
        cliclack::log::info(format!("Using directory: {}", p.display()))?;
        p
    } else if args.yes {
        current_dir.join(&default_name)
    } else {
        let input: String = cliclack::input("Where would you like to create your project?")
            .placeholder(&default_name)
            .default_input(&default_name)
            .interact()?;

        let p = PathBuf::from(&input);
        if p.is_absolute() {
            p
        } else {
            current_dir.join(p)
        }
    };

    if let Some(parent) = path.parent() {
        if !parent.exists() && parent != std::path::Path::new("") {
            anyhow::bail!("Parent directory does not exist: {}", parent.display());
        }
    }

    // Generating over existing files needs an explicit go-ahead
    if path.exists() && path.is_dir() {
        if let Ok(entries) = std::fs::read_dir(&path) {
            let count = entries.count();
            if count > 0 {
                cliclack::log::warning(format!("Directory has {} existing items", count))?;

                let confirm = if args.yes {
                    true
                } else {
                    cliclack::confirm("Continue anyway?")
                        .initial_value(true)
                        .interact()?
                };

                if !confirm {
                    anyhow::bail!("Setup cancelled.");
                }
            }
        }
    }

    Ok(path)
}

fn select_kind_answers(
    args: &WizardArgs,
    kind: ProjectKind,
    project_dir: &Path,
) -> Result<KindAnswers> {
    match kind {
        ProjectKind::Db => {
            let connection_string = if args.yes {
                DEFAULT_CONNECTION_STRING.to_string()
            } else {
                let mut select = cliclack::select("What database do you want to use?");
                for (idx, (name, _)) in DATABASES.iter().enumerate() {
                    select = select.item(idx, name, "");
                }
                let idx: usize = select.interact()?;
                DATABASES[idx].1.to_string()
            };
            let migrations = confirm(
                args,
                None,
                "Do you want to create default migrations?",
                true,
            )?;
            let plugin = confirm(args, None, "Do you want to create a plugin?", true)?;
            Ok(KindAnswers::Db {
                connection_string,
                migrations,
                plugin,
            })
        }
        ProjectKind::Service => Ok(KindAnswers::Service),
        ProjectKind::Composer => Ok(KindAnswers::Composer),
        ProjectKind::Runtime => {
            let services_dir: String = if args.yes {
                DEFAULT_SERVICES_DIR.to_string()
            } else {
                cliclack::input("Where would you like to load your services from?")
                    .default_input(DEFAULT_SERVICES_DIR)
                    .interact()?
            };

            // Re-running in an existing project keeps the services already there
            let existing = discover_services(&project_dir.join(&services_dir));
            if !existing.is_empty() {
                cliclack::log::info(format!(
                    "Found {} existing services: {}",
                    existing.len(),
                    existing.join(", ")
                ))?;
            }

            let services_names = select_services_names(args, &existing)?;

            let mut candidates = existing;
            candidates.extend(services_names.iter().cloned());
            let entrypoint = if candidates.len() == 1 || args.yes {
                candidates[0].clone()
            } else {
                let mut select = cliclack::select("Which service should be the entrypoint?");
                for name in &candidates {
                    select = select.item(name.clone(), name, "");
                }
                select.interact()?
            };

            Ok(KindAnswers::Runtime {
                services_dir,
                services_names,
                entrypoint,
            })
        }
    }
}

fn select_hostname(args: &WizardArgs) -> Result<String> {
    if let Some(hostname) = &args.hostname {
        return Ok(hostname.clone());
    }
    if args.yes {
        return Ok(DEFAULT_HOSTNAME.to_string());
    }
    Ok(cliclack::input("What hostname do you want to use?")
        .default_input(DEFAULT_HOSTNAME)
        .interact()?)
}

fn select_port(args: &WizardArgs) -> Result<u16> {
    if let Some(port) = args.port {
        return Ok(port);
    }
    let default = crate::defaults::next_default_port();
    if args.yes {
        return Ok(default);
    }
    let default_input = default.to_string();
    let input: String = cliclack::input("What port do you want to use?")
        .default_input(&default_input)
        .validate(|value: &String| match value.parse::<u16>() {
            Ok(_) => Ok(()),
            Err(_) => Err("Please enter a valid port number"),
        })
        .interact()?;
    Ok(input.parse().unwrap_or(default))
}

fn confirm(args: &WizardArgs, flag: Option<bool>, question: &str, default: bool) -> Result<bool> {
    if let Some(value) = flag {
        return Ok(value);
    }
    if args.yes {
        return Ok(default);
    }
    Ok(cliclack::confirm(question)
        .initial_value(default)
        .interact()?)
}

fn select_services_names(args: &WizardArgs, existing: &[String]) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();

    if args.yes {
        if existing.is_empty() {
            names.push("main".to_string());
        }
        return Ok(names);
    }

    loop {
        let default_name = format!("service-{}", names.len() + 1);
        let name: String = cliclack::input("What is the name of the service?")
            .placeholder(&default_name)
            .default_input(&default_name)
            .validate(|value: &String| {
                if value
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                {
                    Ok(())
                } else {
                    Err("Service names can only contain letters, numbers, '-' and '_'")
                }
            })
            .interact()?;

        if names.contains(&name) || existing.contains(&name) {
            cliclack::log::warning(format!("A service named {} already exists.", name))?;
            continue;
        }
        names.push(name);

        let another: bool = cliclack::confirm("Do you want to create another service?")
            .initial_value(false)
            .interact()?;
        if !another {
            break;
        }
    }

    Ok(names)
}

async fn generate_project(
    logger: &dyn Logger,
    project_dir: &PathBuf,
    answers: KindAnswers,
    hostname: &str,
    port: Option<u16>,
    typescript: bool,
    versions: &PackageVersions,
) -> Result<EnvMap> {
    match answers {
        KindAnswers::Db {
            connection_string,
            migrations,
            plugin,
        } => {
            let params = DbParams {
                hostname: hostname.to_string(),
                port: port.unwrap_or_else(crate::defaults::next_default_port),
                connection_string: Some(connection_string),
                migrations: migrations.then(|| "migrations".to_string()),
                plugin,
                typescript,
                version: Some(versions.platformatic.clone()),
                runtime_context: None,
            };
            create_db(&params, logger, project_dir).await
        }
        KindAnswers::Service => {
            let params = ServiceParams {
                hostname: hostname.to_string(),
                port: port.unwrap_or_else(crate::defaults::next_default_port),
                typescript,
                version: Some(versions.platformatic.clone()),
                runtime_context: None,
            };
            create_service(&params, logger, project_dir).await
        }
        KindAnswers::Composer => {
            let params = ComposerParams {
                hostname: hostname.to_string(),
                port: port.unwrap_or_else(crate::defaults::next_default_port),
                typescript,
                services_to_compose: Vec::new(),
                version: Some(versions.platformatic.clone()),
                runtime_context: None,
            };
            create_composer(&params, logger, project_dir).await
        }
        KindAnswers::Runtime {
            services_dir,
            services_names,
            entrypoint,
        } => {
            // Each service hands its prefixed variables up to the root .env
            let mut env = EnvMap::new();
            for name in &services_names {
                let params = ServiceParams {
                    hostname: hostname.to_string(),
                    port: crate::defaults::next_default_port(),
                    typescript,
                    version: Some(versions.platformatic.clone()),
                    runtime_context: Some(RuntimeContext {
                        services_names: services_names.clone(),
                        env_prefix: RuntimeContext::env_prefix_for(name),
                    }),
                };
                let service_dir = project_dir.join(&services_dir).join(name);
                env.extend(create_service(&params, logger, &service_dir).await?);
            }

            let params = RuntimeParams {
                services_dir: project_dir.join(&services_dir),
                entrypoint,
                env,
                version: Some(versions.platformatic.clone()),
            };
            create_runtime(&params, logger, project_dir).await
        }
    }
}

fn package_json_params(
    kind: ProjectKind,
    typescript: bool,
    versions: &PackageVersions,
) -> PackageJsonParams {
    let mut params = PackageJsonParams {
        platformatic_version: versions.platformatic.clone(),
        fastify_version: versions.fastify.clone(),
        typescript_build: typescript,
        dependencies: vec![(
            kind.npm_package().to_string(),
            format!("^{}", versions.platformatic),
        )],
        ..Default::default()
    };
    if typescript {
        params.dev_dependencies = vec![
            ("typescript".to_string(), "^5.2.2".to_string()),
            ("@types/node".to_string(), "^20.8.0".to_string()),
        ];
    }
    params
}

fn print_next_steps(
    project_dir: &PathBuf,
    pkg_manager: PackageManager,
    installed: bool,
) -> Result<()> {
    let mut steps = vec![format!("cd {}", project_dir.display())];
    if !installed {
        steps.push(format!("{} install", pkg_manager));
    }
    steps.push(format!("{} start", pkg_manager));

    println!();
    println!("  Next steps");
    println!();
    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("All done!")?;

    Ok(())
}
