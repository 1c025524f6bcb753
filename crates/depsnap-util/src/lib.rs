//! Shared utilities for depsnap.
//!
//! This crate provides cross-cutting concerns used by the other depsnap crates:
//! the unified error type, filesystem helpers, and terminal status output.

pub mod errors;
pub mod fs;
pub mod progress;
