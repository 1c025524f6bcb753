//! Operation: compute a package's dependency snapshot and save it.

use std::path::{Path, PathBuf};

use depsnap_core::config::Config;
use depsnap_core::package::PackageIdentity;
use depsnap_core::snapshot::{Snapshot, SnapshotMode, SnapshotScope};
use depsnap_registry::oracle::VersionOracle;
use depsnap_registry::source::Registry;
use depsnap_resolver::builder::SnapshotBuilder;
use depsnap_resolver::closure::ClosureTraversal;
use depsnap_util::errors::{DepsnapError, DepsnapResult};
use depsnap_util::progress;

/// Options for `depsnap snapshot`.
#[derive(Debug, Default, Clone)]
pub struct SnapshotOptions {
    pub mode: SnapshotMode,
    /// Also write the raw-range snapshot next to the resolved one.
    pub both: bool,
    /// Print the JSON instead of writing files.
    pub stdout: bool,
    /// Overrides `[output] dir`.
    pub out_dir: Option<PathBuf>,
    pub registry: RegistryOptions,
    /// Overrides `[resolve] jobs`.
    pub jobs: Option<usize>,
}

/// Registry selection shared by every operation.
#[derive(Debug, Default, Clone)]
pub struct RegistryOptions {
    /// Overrides `[registry] url`.
    pub url: Option<String>,
    /// Answer queries from a JSON fixture instead of the network.
    pub fixture: Option<PathBuf>,
}

impl RegistryOptions {
    pub fn open(&self, config: &Config) -> Result<Registry, DepsnapError> {
        let mut registry = config.registry.clone();
        if let Some(ref url) = self.url {
            registry.url = url.clone();
        }
        Registry::open(&registry, self.fixture.as_deref())
    }
}

/// Compute the snapshot(s) for `root` and write them to the output directory.
///
/// Returns the written paths; with `stdout` the JSON is printed and nothing
/// is written.
pub async fn snapshot(
    config: &Config,
    root: &PackageIdentity,
    opts: &SnapshotOptions,
) -> DepsnapResult<Vec<PathBuf>> {
    let registry = opts.registry.open(config)?;
    let jobs = opts.jobs.unwrap_or(config.resolve.jobs);

    progress::status_info("Package Name", &root.name);
    progress::status_info("Package Version", &root.version);
    progress::status(
        "Resolving",
        &format!("{root} ({}) from {}", opts.mode, registry.describe()),
    );

    let sp = progress::spinner(&format!("Resolving dependencies of {root}..."));
    let result = compute(&registry, root, opts.mode, opts.both, jobs).await;
    sp.finish_and_clear();
    let snapshots = result?;

    if opts.stdout {
        for (_, snapshot) in &snapshots {
            print!("{}", snapshot.to_json_pretty()?);
        }
        return Ok(Vec::new());
    }

    let dir = opts.out_dir.as_deref().unwrap_or(&config.output.dir);
    write_all(dir, &snapshots)
}

/// Run the traversal and build one snapshot per requested shape.
///
/// The raw-range snapshot comes first when both are requested; both share a
/// single traversal.
pub async fn compute<O: VersionOracle>(
    oracle: &O,
    root: &PackageIdentity,
    mode: SnapshotMode,
    both: bool,
    jobs: usize,
) -> Result<Vec<(SnapshotMode, Snapshot)>, DepsnapError> {
    let traversal = ClosureTraversal::new(oracle).with_jobs(jobs);
    let closure = match mode.scope {
        SnapshotScope::Direct => traversal.traverse_direct(root).await?,
        SnapshotScope::Closure => traversal.traverse(root).await?,
    };

    let builder = SnapshotBuilder::new(oracle).with_jobs(jobs);
    let mut out = Vec::with_capacity(2);
    if both || !mode.resolve_versions {
        let raw = builder.build(root, closure.clone(), false).await?;
        out.push((SnapshotMode::new(mode.scope, false), raw));
    }
    if mode.resolve_versions {
        let resolved = builder.build(root, closure, true).await?;
        out.push((mode, resolved));
    }
    Ok(out)
}

fn write_all(dir: &Path, snapshots: &[(SnapshotMode, Snapshot)]) -> DepsnapResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(snapshots.len());
    for (mode, snapshot) in snapshots {
        let path = snapshot.write_to(dir, *mode)?;
        progress::status(
            "Saved",
            &format!("{} ({} dependencies)", path.display(), snapshot.dependencies.len()),
        );
        written.push(path);
    }
    Ok(written)
}
