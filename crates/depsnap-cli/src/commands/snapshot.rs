//! Handler for `depsnap snapshot`.

use std::path::PathBuf;

use miette::Result;

use depsnap_core::config::Config;
use depsnap_core::package::PackageIdentity;
use depsnap_core::snapshot::{SnapshotMode, SnapshotScope};
use depsnap_ops::ops_snapshot::{self, SnapshotOptions};

use crate::cli::RegistryArgs;

pub struct Flags {
    pub direct: bool,
    pub raw: bool,
    pub both: bool,
    pub stdout: bool,
}

pub async fn exec(
    config: &Config,
    name: &str,
    version: &str,
    flags: Flags,
    out: Option<PathBuf>,
    registry: RegistryArgs,
) -> Result<()> {
    let scope = if flags.direct {
        SnapshotScope::Direct
    } else {
        SnapshotScope::Closure
    };
    let (registry, jobs) = registry.split();
    let opts = SnapshotOptions {
        mode: SnapshotMode::new(scope, !flags.raw),
        both: flags.both,
        stdout: flags.stdout,
        out_dir: out,
        registry,
        jobs,
    };

    let root = PackageIdentity::new(name, version);
    ops_snapshot::snapshot(config, &root, &opts).await?;
    Ok(())
}
