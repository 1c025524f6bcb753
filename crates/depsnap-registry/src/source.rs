//! The registry a run queries: the configured npm endpoint or a local fixture.

use std::path::Path;

use depsnap_core::config::RegistryConfig;
use depsnap_util::errors::DepsnapError;

use crate::memory::MemoryRegistry;
use crate::npm::NpmRegistry;
use crate::oracle::{DependencyMap, VersionOracle};

#[derive(Debug)]
pub enum Registry {
    Npm(NpmRegistry),
    Memory(MemoryRegistry),
}

impl Registry {
    /// Load `fixture` when given; otherwise talk to `config.url`.
    pub fn open(config: &RegistryConfig, fixture: Option<&Path>) -> Result<Self, DepsnapError> {
        match fixture {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using registry fixture");
                Ok(Self::Memory(MemoryRegistry::from_path(path)?))
            }
            None => {
                tracing::debug!(url = %config.url, "using npm registry");
                Ok(Self::Npm(NpmRegistry::new(config)?))
            }
        }
    }

    /// Where answers come from, for status output.
    pub fn describe(&self) -> &str {
        match self {
            Self::Npm(reg) => reg.base_url(),
            Self::Memory(_) => "registry fixture",
        }
    }
}

impl VersionOracle for Registry {
    async fn direct_dependencies(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<DependencyMap, DepsnapError> {
        match self {
            Self::Npm(reg) => reg.direct_dependencies(name, version).await,
            Self::Memory(reg) => reg.direct_dependencies(name, version).await,
        }
    }

    async fn published_versions(&self, name: &str) -> Result<Vec<String>, DepsnapError> {
        match self {
            Self::Npm(reg) => reg.published_versions(name).await,
            Self::Memory(reg) => reg.published_versions(name).await,
        }
    }
}
