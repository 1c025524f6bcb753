use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all depsnap operations.
#[derive(Debug, Error, Diagnostic)]
pub enum DepsnapError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable configuration file.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check your depsnap.toml for syntax errors"))]
    Config { message: String },

    /// The package registry could not answer a query.
    #[error("Registry query for {package} failed: {message}")]
    Oracle { package: String, message: String },

    /// A declared version range is not a valid constraint expression.
    #[error("Invalid version range '{range}' for {package}: {message}")]
    #[diagnostic(help("Only semver ranges (^, ~, comparators, x-ranges, hyphen ranges) can be resolved"))]
    InvalidRange {
        package: String,
        range: String,
        message: String,
    },

    /// A valid range matched none of the published versions.
    #[error("No version found for {package} in range {range}")]
    NoMatchingVersion { package: String, range: String },

    /// Snapshot (de)serialization failed.
    #[error("Snapshot error: {message}")]
    Snapshot { message: String },

    /// A recomputed snapshot differs from the stored one.
    #[error("Snapshot drifted: {count} dependency {}", entries_differ(.count))]
    Drift { count: usize },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

impl DepsnapError {
    /// Build an [`DepsnapError::Oracle`] for `package`.
    pub fn oracle(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Oracle {
            package: package.into(),
            message: message.into(),
        }
    }
}

fn entries_differ(count: &usize) -> &'static str {
    if *count == 1 {
        "entry differs"
    } else {
        "entries differ"
    }
}

/// Convenience alias for `miette::Result<T>`.
pub type DepsnapResult<T> = miette::Result<T>;
