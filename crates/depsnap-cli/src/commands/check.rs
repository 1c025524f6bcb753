//! Handler for `depsnap check`.

use std::path::Path;

use miette::Result;

use depsnap_core::config::Config;
use depsnap_core::snapshot::{SnapshotMode, SnapshotScope};
use depsnap_ops::ops_check::{self, CheckOptions};

use crate::cli::RegistryArgs;

pub async fn exec(
    config: &Config,
    file: &Path,
    direct: bool,
    raw: bool,
    registry: RegistryArgs,
) -> Result<()> {
    // Either flag pins the mode; otherwise it comes from the file name.
    let mode = (direct || raw).then(|| {
        let scope = if direct {
            SnapshotScope::Direct
        } else {
            SnapshotScope::Closure
        };
        SnapshotMode::new(scope, !raw)
    });
    let (registry, jobs) = registry.split();
    let opts = CheckOptions {
        mode,
        registry,
        jobs,
    };

    ops_check::check(config, file, &opts).await?;
    Ok(())
}
