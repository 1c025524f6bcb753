//! The query interface the resolver needs from a package registry.

use std::collections::BTreeMap;
use std::future::Future;

use depsnap_util::errors::DepsnapError;

/// Dependency name → declared range, as published in a package manifest.
pub type DependencyMap = BTreeMap<String, String>;

/// Answers the two questions dependency resolution asks of a registry.
///
/// Implementations apply their own timeout and retry policy. Callers treat
/// any `Err` as final.
pub trait VersionOracle {
    /// Declared direct dependencies of `name` at `version`.
    ///
    /// `None` asks for the registry's `latest` release. A package with no
    /// dependencies answers with an empty map, never an error.
    fn direct_dependencies(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> impl Future<Output = Result<DependencyMap, DepsnapError>> + Send;

    /// Every version string published for `name`, in no particular order.
    fn published_versions(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<String>, DepsnapError>> + Send;
}
