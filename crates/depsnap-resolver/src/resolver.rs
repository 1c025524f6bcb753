//! Range-to-version resolution against the registry's published versions.

use depsnap_registry::oracle::VersionOracle;
use depsnap_util::errors::DepsnapError;

use crate::range::{parse_version, NpmRange};

/// Resolves a declared range to the highest published version satisfying it.
pub struct RangeResolver<'a, O> {
    oracle: &'a O,
}

impl<'a, O: VersionOracle> RangeResolver<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }

    /// Resolve `range` for `name`.
    ///
    /// The published list is fetched before the range is parsed, so a dead
    /// registry reports as an oracle error even for a bad range. The returned
    /// string is the version exactly as the registry published it.
    pub async fn resolve(&self, name: &str, range: &str) -> Result<String, DepsnapError> {
        let versions = self.oracle.published_versions(name).await?;

        let req = NpmRange::parse(range).map_err(|e| DepsnapError::InvalidRange {
            package: name.to_string(),
            range: range.to_string(),
            message: e.message,
        })?;

        match select_max_satisfying(&req, &versions) {
            Some(v) => {
                tracing::debug!(package = name, range, version = v, "resolved range");
                Ok(v.to_string())
            }
            None => Err(DepsnapError::NoMatchingVersion {
                package: name.to_string(),
                range: range.to_string(),
            }),
        }
    }
}

/// The highest of `versions` satisfying `range` by semver precedence.
///
/// Entries that are not valid semver are skipped.
pub fn select_max_satisfying<'v>(range: &NpmRange, versions: &'v [String]) -> Option<&'v str> {
    versions
        .iter()
        .filter_map(|raw| match parse_version(raw) {
            Some(parsed) => Some((parsed, raw.as_str())),
            None => {
                tracing::debug!(version = %raw, "skipping unparseable published version");
                None
            }
        })
        .filter(|(parsed, _)| range.matches(parsed))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, raw)| raw)
}
