//! CLI argument definitions for depsnap.
//!
//! Uses `clap` derive macros. Each command corresponds to a handler in the
//! [`super::commands`] module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "depsnap",
    version,
    about = "Deterministic dependency snapshots for npm packages",
    long_about = "depsnap walks the transitive dependencies of a published package version, \
                  resolves every declared range to the highest matching published version, \
                  and saves the result as a JSON snapshot for reproducibility and drift checks."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read configuration from this file instead of depsnap.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute and save the dependency snapshot of a package version
    Snapshot {
        /// Package name, e.g. lodash or @types/node
        name: String,
        /// Published version of the package
        version: String,
        /// Only the package's own dependencies, not the full closure
        #[arg(long)]
        direct: bool,
        /// Keep declared ranges instead of resolving versions
        #[arg(long, conflicts_with = "both")]
        raw: bool,
        /// Write both the raw-range and the resolved snapshot
        #[arg(long)]
        both: bool,
        /// Output directory (defaults to [output] dir)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Print the snapshot JSON instead of writing files
        #[arg(long)]
        stdout: bool,
        #[command(flatten)]
        registry: RegistryArgs,
    },

    /// Recompute a saved snapshot and report any drift
    Check {
        /// Snapshot file written by `depsnap snapshot`
        file: PathBuf,
        /// Treat the file as a direct-scope snapshot
        #[arg(long)]
        direct: bool,
        /// Treat the file as holding declared ranges
        #[arg(long)]
        raw: bool,
        #[command(flatten)]
        registry: RegistryArgs,
    },
}

/// Registry selection shared by commands that query packages.
#[derive(Args, Debug)]
pub struct RegistryArgs {
    /// Registry base URL (defaults to [registry] url)
    #[arg(long, env = "DEPSNAP_REGISTRY", value_name = "URL")]
    pub registry: Option<String>,
    /// Answer queries from a JSON registry fixture; takes precedence over --registry
    #[arg(long, value_name = "PATH")]
    pub registry_file: Option<PathBuf>,
    /// Maximum registry requests in flight (defaults to [resolve] jobs)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub jobs: Option<u64>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn snapshot_defaults() {
        let cli = Cli::try_parse_from(["depsnap", "snapshot", "app", "1.0.0"]).unwrap();
        match cli.command {
            Command::Snapshot {
                name,
                version,
                direct,
                raw,
                both,
                ..
            } => {
                assert_eq!(name, "app");
                assert_eq!(version, "1.0.0");
                assert!(!direct && !raw && !both);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn raw_and_both_conflict() {
        let result = Cli::try_parse_from(["depsnap", "snapshot", "app", "1.0.0", "--raw", "--both"]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_jobs_rejected() {
        let result = Cli::try_parse_from(["depsnap", "snapshot", "app", "1.0.0", "--jobs", "0"]);
        assert!(result.is_err());
    }
}
