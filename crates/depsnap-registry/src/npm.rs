//! npm registry oracle over the public registry HTTP API.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;

use depsnap_core::config::RegistryConfig;
use depsnap_util::errors::DepsnapError;

use crate::download::{self, Fetch};
use crate::oracle::{DependencyMap, VersionOracle};

/// Abbreviated packument media type; omits readmes and most metadata.
const ACCEPT_ABBREVIATED: &str = "application/vnd.npm.install-v1+json";
const ACCEPT_JSON: &str = "application/json";

/// Version manifest as served by `GET /{name}/{version}`.
#[derive(Debug, Deserialize)]
struct VersionManifest {
    #[serde(default)]
    dependencies: Option<BTreeMap<String, String>>,
}

/// The slice of a packument (`GET /{name}`) we read.
#[derive(Debug, Deserialize)]
struct Packument {
    #[serde(default)]
    versions: BTreeMap<String, IgnoredAny>,
}

/// A configured npm-compatible registry.
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    client: Client,
    base_url: String,
    token: Option<String>,
    retries: u32,
}

impl NpmRegistry {
    pub fn new(config: &RegistryConfig) -> Result<Self, DepsnapError> {
        let client = download::build_client(Duration::from_secs(config.timeout_secs))?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            retries: config.retries,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the packument for `name`. Scoped names escape their `/`.
    pub fn package_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, escape_name(name))
    }

    /// URL of one version manifest; `None` asks for the `latest` dist-tag.
    pub fn version_url(&self, name: &str, version: Option<&str>) -> String {
        format!(
            "{}/{}",
            self.package_url(name),
            version.unwrap_or("latest")
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        package: &str,
        url: &str,
        accept: &str,
    ) -> Result<T, DepsnapError> {
        let fetch = Fetch {
            client: &self.client,
            url,
            accept,
            token: self.token.as_deref(),
            retries: self.retries,
        };
        let body = fetch
            .bytes(package)
            .await?
            .ok_or_else(|| DepsnapError::oracle(package, format!("not found at {url}")))?;
        serde_json::from_slice(&body)
            .map_err(|e| DepsnapError::oracle(package, format!("Invalid JSON from {url}: {e}")))
    }
}

impl VersionOracle for NpmRegistry {
    async fn direct_dependencies(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<DependencyMap, DepsnapError> {
        let url = self.version_url(name, version);
        let package = match version {
            Some(v) => format!("{name}@{v}"),
            None => name.to_string(),
        };
        tracing::debug!(%url, "fetching version manifest");
        let manifest: VersionManifest = self.get_json(&package, &url, ACCEPT_JSON).await?;
        Ok(manifest.dependencies.unwrap_or_default())
    }

    async fn published_versions(&self, name: &str) -> Result<Vec<String>, DepsnapError> {
        let url = self.package_url(name);
        tracing::debug!(%url, "fetching packument");
        let packument: Packument = self.get_json(name, &url, ACCEPT_ABBREVIATED).await?;
        Ok(packument.versions.into_keys().collect())
    }
}

fn escape_name(name: &str) -> String {
    name.replace('/', "%2f")
}
