use std::fmt;

use serde::{Deserialize, Serialize};

/// A specific published package version, e.g. `lodash@4.17.21`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageIdentity {
    pub name: String,
    pub version: String,
}

impl PackageIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse `"name@version"` into an identity.
    ///
    /// Scoped names keep their leading `@`: `@types/node@20.1.0` splits at
    /// the last `@`. Returns `None` when either half is empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (name, version) = s.rsplit_once('@')?;
        if name.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self::new(name, version))
    }

    /// `name@version` identifier, used as the traversal's visited key.
    pub fn key(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A package to query during traversal.
///
/// The root carries an exact version. Transitive dependencies are queued by
/// name only, so the registry answers for its `latest` version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
    pub name: String,
    pub version: Option<String>,
}

impl PackageRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Visited-set key: `name@version` for pinned refs, the bare name otherwise.
    pub fn key(&self) -> String {
        match self.version {
            Some(ref v) => format!("{}@{v}", self.name),
            None => self.name.clone(),
        }
    }
}

impl From<&PackageIdentity> for PackageRef {
    fn from(id: &PackageIdentity) -> Self {
        Self {
            name: id.name.clone(),
            version: Some(id.version.clone()),
        }
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
