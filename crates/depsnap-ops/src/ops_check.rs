//! Operation: recompute a saved snapshot and report drift.

use std::path::Path;

use depsnap_core::config::Config;
use depsnap_core::snapshot::{Snapshot, SnapshotMode};
use depsnap_resolver::drift::DriftReport;
use depsnap_util::errors::{DepsnapError, DepsnapResult};
use depsnap_util::progress;

use crate::ops_snapshot::{self, RegistryOptions};

/// Options for `depsnap check`.
#[derive(Debug, Default, Clone)]
pub struct CheckOptions {
    /// Mode of the saved file; inferred from its name when absent.
    pub mode: Option<SnapshotMode>,
    pub registry: RegistryOptions,
    pub jobs: Option<usize>,
}

/// Compare the snapshot stored at `path` with a freshly computed one.
///
/// Prints the report and fails with [`DepsnapError::Drift`] when any
/// dependency entry differs.
pub async fn check(config: &Config, path: &Path, opts: &CheckOptions) -> DepsnapResult<DriftReport> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DepsnapError::Snapshot {
            message: format!("Not a snapshot file: {}", path.display()),
        })?;
    let inferred = SnapshotMode::from_file_name(file_name);
    let mode = opts
        .mode
        .or(inferred.as_ref().map(|(_, mode)| *mode))
        .ok_or_else(|| DepsnapError::Snapshot {
            message: format!(
                "Cannot infer snapshot mode from '{file_name}'; expected <name>@<version>[-latest][-all].json"
            ),
        })?;

    let expected = Snapshot::from_path(path, mode.resolve_versions)?;
    let root = expected.identity();
    if let Some((ref named, _)) = inferred {
        if *named != root {
            progress::status_warn(
                "Warning",
                &format!("{file_name} holds a snapshot of {root}, not {named}"),
            );
        }
    }

    let registry = opts.registry.open(config)?;
    let jobs = opts.jobs.unwrap_or(config.resolve.jobs);
    progress::status("Checking", &format!("{root} ({mode})"));

    let sp = progress::spinner(&format!("Recomputing snapshot of {root}..."));
    let result = ops_snapshot::compute(&registry, &root, mode, false, jobs).await;
    sp.finish_and_clear();
    let actual = result?
        .pop()
        .map(|(_, snapshot)| snapshot)
        .ok_or_else(|| DepsnapError::Snapshot {
            message: format!("No snapshot computed for {root}"),
        })?;

    let report = DriftReport::compare(&expected, &actual);
    if report.is_empty() {
        println!("{report}");
        return Ok(report);
    }
    print!("{report}");
    Err(DepsnapError::Drift { count: report.len() }.into())
}
