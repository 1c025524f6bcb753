//! Snapshot records and their on-disk JSON form.
//!
//! A snapshot is `{name, version, dependencies}` where `dependencies` is a
//! flat name → string map: declared ranges, or the concrete versions they
//! resolved to. File names encode which of the four shapes a file holds:
//!
//! | scope   | ranges                 | resolved                      |
//! |---------|------------------------|-------------------------------|
//! | direct  | `name@version.json`    | `name@version-latest.json`    |
//! | closure | `name@version-all.json`| `name@version-latest-all.json`|

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use depsnap_util::errors::DepsnapError;

use crate::package::PackageIdentity;

/// Dependency name → declared version range.
pub type ClosureMap = BTreeMap<String, String>;

/// Dependency name → chosen concrete version.
pub type ResolvedMap = BTreeMap<String, String>;

/// The `dependencies` field of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SnapshotDependencies {
    Ranges(ClosureMap),
    Resolved(ResolvedMap),
}

impl SnapshotDependencies {
    /// The underlying flat map, whichever shape it is.
    pub fn entries(&self) -> &BTreeMap<String, String> {
        match self {
            Self::Ranges(m) | Self::Resolved(m) => m,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// How much of the graph a snapshot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotScope {
    /// Only the root's declared dependencies.
    Direct,
    /// Every transitive dependency reachable from the root.
    #[default]
    Closure,
}

/// Which of the four snapshot shapes to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotMode {
    pub scope: SnapshotScope,
    pub resolve_versions: bool,
}

impl Default for SnapshotMode {
    fn default() -> Self {
        Self {
            scope: SnapshotScope::Closure,
            resolve_versions: true,
        }
    }
}

impl SnapshotMode {
    pub fn new(scope: SnapshotScope, resolve_versions: bool) -> Self {
        Self {
            scope,
            resolve_versions,
        }
    }

    fn suffix(&self) -> &'static str {
        match (self.scope, self.resolve_versions) {
            (SnapshotScope::Direct, false) => "",
            (SnapshotScope::Direct, true) => "-latest",
            (SnapshotScope::Closure, false) => "-all",
            (SnapshotScope::Closure, true) => "-latest-all",
        }
    }

    /// File name for a snapshot of `root` in this mode.
    ///
    /// A scoped name's `/` becomes `+` so the file lands directly in the
    /// output directory.
    pub fn file_name(&self, root: &PackageIdentity) -> String {
        format!(
            "{}@{}{}.json",
            root.name.replace('/', "+"),
            root.version,
            self.suffix()
        )
    }

    /// Recover the root identity and mode from a snapshot file name.
    pub fn from_file_name(file_name: &str) -> Option<(PackageIdentity, Self)> {
        let stem = file_name.strip_suffix(".json")?;
        let candidates = [
            ("-latest-all", SnapshotScope::Closure, true),
            ("-all", SnapshotScope::Closure, false),
            ("-latest", SnapshotScope::Direct, true),
        ];
        let (base, mode) = candidates
            .iter()
            .find_map(|(suffix, scope, resolved)| {
                stem.strip_suffix(suffix)
                    .map(|base| (base, Self::new(*scope, *resolved)))
            })
            .unwrap_or((stem, Self::new(SnapshotScope::Direct, false)));
        let mut id = PackageIdentity::parse(base)?;
        id.name = id.name.replace('+', "/");
        Some((id, mode))
    }
}

impl fmt::Display for SnapshotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match self.scope {
            SnapshotScope::Direct => "direct",
            SnapshotScope::Closure => "closure",
        };
        let deps = if self.resolve_versions {
            "resolved versions"
        } else {
            "declared ranges"
        };
        write!(f, "{scope}, {deps}")
    }
}

/// A root package and its dependency map, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub name: String,
    pub version: String,
    pub dependencies: SnapshotDependencies,
}

/// On-disk shape; the map carries no marker of which kind it is.
#[derive(Deserialize)]
struct SnapshotFile {
    name: String,
    version: String,
    #[serde(default)]
    dependencies: Option<BTreeMap<String, String>>,
}

impl Snapshot {
    pub fn new(root: &PackageIdentity, dependencies: SnapshotDependencies) -> Self {
        Self {
            name: root.name.clone(),
            version: root.version.clone(),
            dependencies,
        }
    }

    pub fn identity(&self) -> PackageIdentity {
        PackageIdentity::new(&self.name, &self.version)
    }

    /// Two-space indented JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> Result<String, DepsnapError> {
        let mut out = serde_json::to_string_pretty(self).map_err(|e| DepsnapError::Snapshot {
            message: format!("Failed to serialize snapshot for {}: {e}", self.identity()),
        })?;
        out.push('\n');
        Ok(out)
    }

    /// Parse a snapshot from JSON. `resolved` says which map shape the file holds.
    pub fn from_json(json: &str, resolved: bool) -> Result<Self, DepsnapError> {
        let file: SnapshotFile =
            serde_json::from_str(json).map_err(|e| DepsnapError::Snapshot {
                message: format!("Failed to parse snapshot: {e}"),
            })?;
        let map = file.dependencies.unwrap_or_default();
        let dependencies = if resolved {
            SnapshotDependencies::Resolved(map)
        } else {
            SnapshotDependencies::Ranges(map)
        };
        Ok(Self {
            name: file.name,
            version: file.version,
            dependencies,
        })
    }

    /// Load a snapshot written by [`Snapshot::write_to`].
    pub fn from_path(path: &Path, resolved: bool) -> Result<Self, DepsnapError> {
        let content = std::fs::read_to_string(path).map_err(|e| DepsnapError::Snapshot {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_json(&content, resolved)
    }

    /// Write this snapshot into `dir` under the file name for `mode`.
    pub fn write_to(&self, dir: &Path, mode: SnapshotMode) -> Result<PathBuf, DepsnapError> {
        let path = dir.join(mode.file_name(&self.identity()));
        let json = self.to_json_pretty()?;
        depsnap_util::fs::write_atomic(&path, json.as_bytes())?;
        Ok(path)
    }
}
