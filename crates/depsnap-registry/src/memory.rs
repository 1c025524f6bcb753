//! In-memory registry, loadable from a JSON fixture for offline runs.
//!
//! ```json
//! { "packages": {
//!     "lib-a": { "latest": "1.2.0",
//!                "versions": { "1.0.0": {},
//!                              "1.2.0": { "dependencies": { "lib-b": "^2.0.0" } } } } } }
//! ```
//!
//! `latest` is optional and defaults to the highest release version.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use serde::Deserialize;

use depsnap_util::errors::DepsnapError;

use crate::oracle::{DependencyMap, VersionOracle};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MemoryPackage {
    #[serde(default)]
    pub latest: Option<String>,
    #[serde(default)]
    pub versions: BTreeMap<String, MemoryVersion>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MemoryVersion {
    #[serde(default)]
    pub dependencies: Option<DependencyMap>,
}

impl MemoryPackage {
    /// The version answering name-only queries.
    fn latest_version(&self) -> Option<&str> {
        if let Some(ref latest) = self.latest {
            return Some(latest.as_str());
        }
        let parsed = || {
            self.versions
                .keys()
                .filter_map(|v| semver::Version::parse(v).ok().map(|sv| (sv, v.as_str())))
        };
        parsed()
            .filter(|(sv, _)| sv.pre.is_empty())
            .max_by(|a, b| a.0.cmp(&b.0))
            .or_else(|| parsed().max_by(|a, b| a.0.cmp(&b.0)))
            .map(|(_, v)| v)
    }
}

/// A registry held entirely in memory that counts the queries it answers.
#[derive(Debug, Default, Deserialize)]
pub struct MemoryRegistry {
    #[serde(default)]
    packages: BTreeMap<String, MemoryPackage>,
    #[serde(skip)]
    dependency_calls: Mutex<BTreeMap<String, usize>>,
    #[serde(skip)]
    version_calls: Mutex<BTreeMap<String, usize>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `name@version` declaring `deps`.
    pub fn with_version(mut self, name: &str, version: &str, deps: &[(&str, &str)]) -> Self {
        let dependencies = deps
            .iter()
            .map(|(n, r)| (n.to_string(), r.to_string()))
            .collect();
        self.packages
            .entry(name.to_string())
            .or_default()
            .versions
            .insert(
                version.to_string(),
                MemoryVersion {
                    dependencies: Some(dependencies),
                },
            );
        self
    }

    /// Publish several dependency-free versions of `name` at once.
    pub fn with_versions(mut self, name: &str, versions: &[&str]) -> Self {
        let pkg = self.packages.entry(name.to_string()).or_default();
        for v in versions {
            pkg.versions.entry(v.to_string()).or_default();
        }
        self
    }

    /// Point the `latest` dist-tag of `name` at `version`.
    pub fn with_latest(mut self, name: &str, version: &str) -> Self {
        self.packages.entry(name.to_string()).or_default().latest = Some(version.to_string());
        self
    }

    /// Parse a JSON fixture.
    pub fn from_json(json: &str) -> Result<Self, DepsnapError> {
        serde_json::from_str(json).map_err(|e| DepsnapError::Generic {
            message: format!("Failed to parse registry fixture: {e}"),
        })
    }

    /// Load a JSON fixture file.
    pub fn from_path(path: &Path) -> Result<Self, DepsnapError> {
        let content = std::fs::read_to_string(path).map_err(|e| DepsnapError::Generic {
            message: format!("Failed to read registry fixture {}: {e}", path.display()),
        })?;
        Self::from_json(&content)
    }

    /// How many times `direct_dependencies` was asked about `name`.
    pub fn dependency_calls(&self, name: &str) -> usize {
        count(&self.dependency_calls, name)
    }

    /// Total `direct_dependencies` queries answered.
    pub fn total_dependency_calls(&self) -> usize {
        total(&self.dependency_calls)
    }

    /// How many times `published_versions` was asked about `name`.
    pub fn version_calls(&self, name: &str) -> usize {
        count(&self.version_calls, name)
    }

    fn package(&self, name: &str) -> Result<&MemoryPackage, DepsnapError> {
        self.packages
            .get(name)
            .ok_or_else(|| DepsnapError::oracle(name, "package not found"))
    }

    fn lookup_dependencies(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<DependencyMap, DepsnapError> {
        record(&self.dependency_calls, name);
        let pkg = self.package(name)?;
        let version = match version {
            Some(v) => v,
            None => pkg
                .latest_version()
                .ok_or_else(|| DepsnapError::oracle(name, "no latest version"))?,
        };
        let entry = pkg
            .versions
            .get(version)
            .ok_or_else(|| DepsnapError::oracle(name, format!("version {version} not found")))?;
        Ok(entry.dependencies.clone().unwrap_or_default())
    }

    fn lookup_versions(&self, name: &str) -> Result<Vec<String>, DepsnapError> {
        record(&self.version_calls, name);
        Ok(self.package(name)?.versions.keys().cloned().collect())
    }
}

impl VersionOracle for MemoryRegistry {
    async fn direct_dependencies(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<DependencyMap, DepsnapError> {
        self.lookup_dependencies(name, version)
    }

    async fn published_versions(&self, name: &str) -> Result<Vec<String>, DepsnapError> {
        self.lookup_versions(name)
    }
}

fn record(calls: &Mutex<BTreeMap<String, usize>>, name: &str) {
    if let Ok(mut map) = calls.lock() {
        *map.entry(name.to_string()).or_default() += 1;
    }
}

fn count(calls: &Mutex<BTreeMap<String, usize>>, name: &str) -> usize {
    calls
        .lock()
        .map(|map| map.get(name).copied().unwrap_or(0))
        .unwrap_or(0)
}

fn total(calls: &Mutex<BTreeMap<String, usize>>) -> usize {
    calls.lock().map(|map| map.values().sum()).unwrap_or(0)
}
