//! Dependency version resolution
//!
//! Generated `package.json` files pin the latest published `platformatic`
//! and `fastify` versions. The lookups hit the npm registry and fall back
//! to known-good pins when the network is unavailable.

use crate::logger::Logger;
use anyhow::{Context, Result};
use semver::Version;
use serde::Deserialize;
use url::Url;

/// Default npm registry queried for dist-tags
pub const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Environment variable overriding the registry (useful behind mirrors)
pub const NPM_REGISTRY_ENV: &str = "PLT_NPM_REGISTRY";

/// Minimum Node.js version the generated applications support
pub const MINIMUM_NODE_VERSION: &str = "18.0.0";

const FALLBACK_PLATFORMATIC_VERSION: &str = "1.14.0";
const FALLBACK_FASTIFY_VERSION: &str = "4.26.0";

/// Versions baked into a generated `package.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersions {
    pub platformatic: String,
    pub fastify: String,
}

impl Default for PackageVersions {
    fn default() -> Self {
        Self {
            platformatic: FALLBACK_PLATFORMATIC_VERSION.to_string(),
            fastify: FALLBACK_FASTIFY_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DistTag {
    version: String,
}

/// Resolves latest package versions from the npm registry
pub struct VersionFetcher {
    client: reqwest::Client,
    registry: Url,
}

impl VersionFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let registry = std::env::var(NPM_REGISTRY_ENV)
            .unwrap_or_else(|_| NPM_REGISTRY_URL.to_string());
        let registry = Url::parse(&registry)
            .with_context(|| format!("Invalid npm registry URL: {}", registry))?;
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            registry,
        })
    }

    /// Fetch the `latest` dist-tag for a package
    pub async fn latest(&self, package: &str) -> Result<String> {
        let mut url = self.registry.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Registry URL cannot have path segments: {}", self.registry))?
            .pop_if_empty()
            .push(package)
            .push("latest");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to fetch the latest version of {}: HTTP {}",
                package,
                response.status()
            );
        }

        let tag: DistTag = response
            .json()
            .await
            .with_context(|| format!("Failed to parse registry response for {}", package))?;
        Ok(tag.version)
    }

    /// Resolve both versions, falling back to the pinned defaults on failure
    pub async fn resolve(&self, logger: &dyn Logger) -> PackageVersions {
        let mut versions = PackageVersions::default();

        match self.latest("platformatic").await {
            Ok(version) => versions.platformatic = version,
            Err(e) => logger.warn(&format!(
                "{:#}. Using platformatic version {}.",
                e, versions.platformatic
            )),
        }

        match self.latest("fastify").await {
            Ok(version) => versions.fastify = version,
            Err(e) => logger.warn(&format!(
                "{:#}. Using fastify version {}.",
                e, versions.fastify
            )),
        }

        versions
    }
}

/// Advisory check that the local Node.js satisfies the platform minimum
///
/// Never fails the wizard: the project can still be generated and run on
/// another machine.
pub fn check_node_version(logger: &dyn Logger) {
    let output = match std::process::Command::new("node").arg("--version").output() {
        Ok(output) if output.status.success() => output,
        _ => {
            logger.warn("Node.js not found in PATH. You will need it to run the generated application.");
            return;
        }
    };

    let raw = String::from_utf8_lossy(&output.stdout);
    let Ok(found) = Version::parse(raw.trim().trim_start_matches('v')) else {
        return;
    };
    let minimum = Version::parse(MINIMUM_NODE_VERSION).expect("pinned version parses");

    if found < minimum {
        logger.warn(&format!(
            "Node.js v{} detected. Platformatic requires at least v{}.",
            found, MINIMUM_NODE_VERSION
        ));
    }
}
