//! Breadth-first discovery of a package's dependency closure.
//!
//! The queue is drained one level at a time. Every unvisited key in a level
//! is queried concurrently (at most `jobs` requests in flight), then the
//! responses are applied in queue order. Applying in order keeps the
//! last-write-wins outcome for conflicting ranges identical to a strictly
//! sequential walk, whatever the concurrency.

use std::collections::VecDeque;

use futures_util::{stream, StreamExt, TryStreamExt};

use depsnap_core::package::{PackageIdentity, PackageRef};
use depsnap_core::snapshot::ClosureMap;
use depsnap_registry::oracle::VersionOracle;
use depsnap_util::errors::DepsnapError;

use crate::visited::VisitedSet;
use crate::DEFAULT_JOBS;

/// Computes the transitive closure (name → declared range) of a root package.
pub struct ClosureTraversal<'a, O> {
    oracle: &'a O,
    jobs: usize,
}

impl<'a, O: VersionOracle> ClosureTraversal<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self {
            oracle,
            jobs: DEFAULT_JOBS,
        }
    }

    /// Bound the number of concurrent registry queries. Zero is treated as one.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Walk the dependency graph from `root`.
    ///
    /// The root is queried at its pinned version; every dependency is queried
    /// by name only and therefore answered at the registry's latest version.
    /// When two packages declare the same dependency, the range seen last in
    /// breadth-first order is kept.
    pub async fn traverse(&self, root: &PackageIdentity) -> Result<ClosureMap, DepsnapError> {
        let mut closure = ClosureMap::new();
        let mut visited = VisitedSet::new();
        let mut queue: VecDeque<PackageRef> = VecDeque::from([PackageRef::from(root)]);

        while !queue.is_empty() {
            let level: Vec<PackageRef> = queue
                .drain(..)
                .filter(|pkg| visited.visit(&pkg.key()))
                .collect();

            let responses: Vec<_> = stream::iter(level.iter().map(|pkg| {
                tracing::debug!(package = %pkg, "querying dependencies");
                self.oracle
                    .direct_dependencies(&pkg.name, pkg.version.as_deref())
            }))
            .buffered(self.jobs)
            .try_collect()
            .await?;

            for (pkg, deps) in level.iter().zip(responses) {
                tracing::debug!(package = %pkg, count = deps.len(), "visited");
                for (dep, range) in deps {
                    if !visited.contains(&dep) {
                        queue.push_back(PackageRef::named(&dep));
                    }
                    closure.insert(dep, range);
                }
            }
        }

        tracing::info!(
            root = %root,
            visited = visited.len(),
            closure = closure.len(),
            "dependency closure complete"
        );
        Ok(closure)
    }

    /// The root's own declared dependencies, without descending further.
    pub async fn traverse_direct(&self, root: &PackageIdentity) -> Result<ClosureMap, DepsnapError> {
        tracing::debug!(package = %root, "querying direct dependencies");
        let deps = self
            .oracle
            .direct_dependencies(&root.name, Some(&root.version))
            .await?;
        tracing::info!(root = %root, direct = deps.len(), "direct dependencies collected");
        Ok(deps)
    }
}
