//! create-platformatic - Scaffold Platformatic applications

use anyhow::Result;
use clap::{Parser, Subcommand};
use plt_scaffold::{ProjectKind, WizardArgs};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "create-platformatic")]
#[command(about = "Scaffold a new Platformatic application")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new Platformatic application
    Create(CliCreateArgs),
}

#[derive(Parser, Debug, Default)]
pub struct CliCreateArgs {
    /// Kind of project to create (db, service, composer or runtime)
    #[arg(short, long)]
    pub kind: Option<ProjectKind>,

    /// Project directory to create
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Server hostname
    #[arg(long)]
    pub hostname: Option<String>,

    /// Server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Use TypeScript for the sample plugin and routes
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub typescript: Option<bool>,

    /// Run the package manager's install step after generation
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub install: Option<bool>,

    /// Create the GitHub Actions deploy workflow
    #[arg(long = "github-actions", num_args = 0..=1, default_missing_value = "true")]
    pub github_actions: Option<bool>,

    /// Create the GitHub Actions PR preview workflow
    #[arg(long = "pr-previews", num_args = 0..=1, default_missing_value = "true")]
    pub pr_previews: Option<bool>,

    /// Initialize a git repository with a first commit
    #[arg(long = "git", num_args = 0..=1, default_missing_value = "true")]
    pub init_git: Option<bool>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,

    /// Show debug output from the generators
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<CliCreateArgs> for WizardArgs {
    fn from(args: CliCreateArgs) -> Self {
        WizardArgs {
            kind: args.kind,
            directory: args.directory,
            hostname: args.hostname,
            port: args.port,
            typescript: args.typescript,
            install: args.install,
            github_actions: args.github_actions,
            pr_previews: args.pr_previews,
            init_git: args.init_git,
            yes: args.yes,
            verbose: args.verbose,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();

    let create_args = match args.command {
        Some(Command::Create(create_args)) => create_args,
        // No subcommand defaults to the interactive wizard
        None => CliCreateArgs::default(),
    };

    let result = plt_scaffold::run(create_args.into()).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
