//! Package registry access: the [`oracle::VersionOracle`] interface the
//! resolver queries, an npm registry client, and an in-memory registry.

pub mod download;
pub mod memory;
pub mod npm;
pub mod oracle;
pub mod source;
