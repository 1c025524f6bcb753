//! Core data types for depsnap.
//!
//! This crate defines the values that flow through a snapshot run: package
//! identities, the dependency maps, the snapshot record with its on-disk
//! naming, and configuration.
//!
//! This crate is intentionally free of async code and network I/O.

pub mod config;
pub mod package;
pub mod snapshot;
