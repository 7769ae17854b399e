//! Project-level artifacts shared by every kind: package.json, .gitignore,
//! README, GitHub Actions workflows and git initialization.

pub mod ghaction;
pub mod git;
pub mod gitignore;
pub mod package_json;
pub mod readme;

pub use ghaction::{create_dynamic_workspace_gh_action, create_static_workspace_gh_action};
pub use git::{create_git_repository, GIT_FIRST_COMMIT_MESSAGE, GIT_MAIN_BRANCH};
pub use gitignore::create_gitignore;
pub use package_json::{create_package_json, PackageJsonParams};
pub use readme::create_readme;
