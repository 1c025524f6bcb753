//! Dependency closure traversal, npm range resolution and snapshot assembly.

pub mod builder;
pub mod closure;
pub mod drift;
pub mod range;
pub mod resolver;
pub mod visited;

/// Concurrent registry queries when no job count is configured.
pub const DEFAULT_JOBS: usize = 8;
