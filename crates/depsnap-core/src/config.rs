use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use depsnap_util::errors::DepsnapError;

/// Public npm registry.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "depsnap.toml";

/// depsnap settings, loaded once at startup and passed down by reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub resolve: ResolveConfig,
}

/// Where snapshots are written, from `[output]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("testdata")
}

/// Registry endpoint and HTTP policy, from `[registry]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs", rename = "timeout-secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Bearer token for private registries.
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            token: None,
        }
    }
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

/// Resolution settings from `[resolve]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Maximum registry requests in flight.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
        }
    }
}

fn default_jobs() -> usize {
    8
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `./depsnap.toml` and then
    /// `~/.depsnap/config.toml` are tried, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, DepsnapError> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::from_path(&local);
        }
        let global = Self::default_path();
        if global.is_file() {
            return Self::from_path(&global);
        }
        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Read and parse a TOML config file.
    pub fn from_path(path: &Path) -> Result<Self, DepsnapError> {
        let content = std::fs::read_to_string(path).map_err(|e| DepsnapError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        let config = Self::parse_toml(&content).map_err(|e| match e {
            DepsnapError::Config { message } => DepsnapError::Config {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse_toml(content: &str) -> Result<Self, DepsnapError> {
        let config: Self = toml::from_str(content).map_err(|e| DepsnapError::Config {
            message: format!("Failed to parse config: {e}"),
        })?;
        if config.resolve.jobs == 0 {
            return Err(DepsnapError::Config {
                message: "resolve.jobs must be at least 1".to_string(),
            });
        }
        Ok(config)
    }

    /// Returns the default path to the user-level config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the depsnap data directory (`~/.depsnap/`).
pub fn dirs_path() -> PathBuf {
    depsnap_util::fs::home_dir().join(".depsnap")
}
