//! plt-scaffold - Core library for the `create-platformatic` CLI
//!
//! This library generates ready-to-run Platformatic applications: the JSON
//! configuration for each project kind (service, db, composer, runtime),
//! `.env`/`.env.sample` files, sample plugins and routes, migrations, a
//! README, a `.gitignore`, a `package.json` and optional GitHub Actions
//! deploy workflows. It can also initialize a git repository and run the
//! detected package manager's install step.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Generators** - Pure "render data, write files" operations under
//!   [`project`] and [`artifacts`], all logging through the [`Logger`] seam
//! - **Support** - Package manager detection, npm registry version lookups,
//!   wizard defaults
//! - **TUI** - Optional cliclack-based interactive wizard (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based wizard module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use plt_scaffold::project::{create_service, ServiceParams};
//!
//! let params = ServiceParams { port: 3042, ..Default::default() };
//! let env = create_service(&params, &logger, &target_dir).await?;
//! ```

pub mod artifacts;
pub mod defaults;
pub mod env;
pub mod logger;
pub mod pkg_manager;
pub mod project;
pub mod versions;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use env::EnvMap;
pub use logger::Logger;
pub use pkg_manager::PackageManager;
pub use project::{ProjectKind, RuntimeContext};
pub use versions::PackageVersions;

#[cfg(feature = "tui")]
pub use tui::{run, WizardArgs};

/// User agent sent with npm registry requests
pub const USER_AGENT: &str = concat!("create-platformatic/", env!("CARGO_PKG_VERSION"));
