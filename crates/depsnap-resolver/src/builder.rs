//! Snapshot assembly.

use futures_util::{stream, StreamExt, TryStreamExt};

use depsnap_core::package::PackageIdentity;
use depsnap_core::snapshot::{ClosureMap, ResolvedMap, Snapshot, SnapshotDependencies};
use depsnap_registry::oracle::VersionOracle;
use depsnap_util::errors::DepsnapError;

use crate::resolver::RangeResolver;
use crate::DEFAULT_JOBS;

/// Turns a closure into a [`Snapshot`], optionally pinning every range.
pub struct SnapshotBuilder<'a, O> {
    oracle: &'a O,
    jobs: usize,
}

impl<'a, O: VersionOracle> SnapshotBuilder<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self {
            oracle,
            jobs: DEFAULT_JOBS,
        }
    }

    /// Bound the number of concurrent resolutions. Zero is treated as one.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Assemble the snapshot for `root`.
    ///
    /// Without `resolve_versions` the closure is carried through unchanged.
    /// Otherwise each range is resolved; the first failure cancels the
    /// outstanding resolutions and no snapshot is produced.
    pub async fn build(
        &self,
        root: &PackageIdentity,
        closure: ClosureMap,
        resolve_versions: bool,
    ) -> Result<Snapshot, DepsnapError> {
        if !resolve_versions {
            return Ok(Snapshot::new(root, SnapshotDependencies::Ranges(closure)));
        }

        let resolver = RangeResolver::new(self.oracle);
        let resolver = &resolver;
        let resolved: ResolvedMap = stream::iter(closure.iter())
            .map(|(name, range)| async move {
                let version = resolver.resolve(name, range).await?;
                Ok::<_, DepsnapError>((name.clone(), version))
            })
            .buffer_unordered(self.jobs)
            .try_collect()
            .await?;

        tracing::info!(root = %root, resolved = resolved.len(), "resolved dependency versions");
        Ok(Snapshot::new(root, SnapshotDependencies::Resolved(resolved)))
    }
}
