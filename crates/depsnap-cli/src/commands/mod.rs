//! Command dispatch and handler modules.

mod check;
mod snapshot;

use miette::Result;

use depsnap_core::config::Config;
use depsnap_ops::ops_snapshot::RegistryOptions;

use crate::cli::{Cli, Command, RegistryArgs};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Snapshot {
            name,
            version,
            direct,
            raw,
            both,
            out,
            stdout,
            registry,
        } => {
            snapshot::exec(
                &config,
                &name,
                &version,
                snapshot::Flags {
                    direct,
                    raw,
                    both,
                    stdout,
                },
                out,
                registry,
            )
            .await
        }
        Command::Check {
            file,
            direct,
            raw,
            registry,
        } => check::exec(&config, &file, direct, raw, registry).await,
    }
}

impl RegistryArgs {
    fn split(self) -> (RegistryOptions, Option<usize>) {
        let opts = RegistryOptions {
            url: self.registry,
            fixture: self.registry_file,
        };
        (opts, self.jobs.map(|j| j as usize))
    }
}
